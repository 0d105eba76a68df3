//! Downlink delivery latency: target pass end to the next station pass

use crate::stats::SampleStats;
use access_windows::Interval;
use serde::{Deserialize, Serialize};

/// Delivery-latency summary for one (constellation, ship target) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryReport {
    /// Merged target-access intervals considered
    pub pass_count: usize,
    /// Intervals with a subsequent ground-station pass
    pub served: usize,
    /// Latency (seconds) over served intervals
    pub latency: Option<SampleStats>,
}

/// For each merged target-access interval, latency from the interval end to
/// the start of the next ground-station pass. Both inputs must be merged
/// (sorted, disjoint) interval sets.
pub fn delivery_report(target_merged: &[Interval], station_merged: &[Interval]) -> DeliveryReport {
    let mut latencies = Vec::new();
    for access in target_merged {
        if let Some(next) = station_merged.iter().find(|s| s.start >= access.end) {
            latencies.push(next.start - access.end);
        }
    }
    DeliveryReport {
        pass_count: target_merged.len(),
        served: latencies.len(),
        latency: SampleStats::from_samples(&latencies),
    }
}
