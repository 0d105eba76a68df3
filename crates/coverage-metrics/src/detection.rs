//! Detection latency: order timestamp to the next covered instant
//!
//! The sampling policy is configurable; the default single order at the
//! horizon start reproduces the original study. The analytic worst case
//! (max over the lead-in gap and the inter-interval gaps) is reported
//! alongside the sampled distribution.

use crate::stats::SampleStats;
use crate::{MetricsError, Result};
use access_windows::{interval, Horizon, Interval};
use serde::{Deserialize, Serialize};

/// Where the hypothetical tasking orders fall within the horizon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DetectionPolicy {
    /// A single order at the horizon start
    HorizonStart,
    /// Orders on a fixed grid across the horizon
    Periodic { interval_secs: f64 },
}

impl DetectionPolicy {
    /// Order timestamps (Unix seconds) under this policy
    pub fn order_times(&self, horizon: &Horizon) -> Result<Vec<f64>> {
        let bounds = horizon.as_interval();
        match *self {
            DetectionPolicy::HorizonStart => Ok(vec![bounds.start]),
            DetectionPolicy::Periodic { interval_secs } => {
                if interval_secs <= 0.0 {
                    return Err(MetricsError::InvalidOrderInterval(interval_secs));
                }
                let mut times = Vec::new();
                let mut t = bounds.start;
                while t < bounds.end {
                    times.push(t);
                    t += interval_secs;
                }
                Ok(times)
            }
        }
    }
}

/// Sampled detection-latency distribution plus the analytic worst case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionReport {
    pub orders: usize,
    pub served: usize,
    /// Orders with no subsequent access interval
    pub unserved: usize,
    /// Latency (seconds) over served orders
    pub latency: Option<SampleStats>,
    /// Max over the lead-in gap and inter-interval gaps; `None` when no
    /// interval exists
    pub worst_case_secs: Option<f64>,
}

/// Latency from an order time to the next covered instant: zero inside an
/// interval, `None` when no interval starts at or after the order
pub fn latency_to_next(merged: &[Interval], order: f64) -> Option<f64> {
    for iv in merged {
        if order < iv.start {
            return Some(iv.start - order);
        }
        if iv.contains(order) {
            return Some(0.0);
        }
    }
    None
}

/// Analytic worst-case detection latency over the horizon
pub fn worst_case(merged: &[Interval], horizon: &Horizon) -> Option<f64> {
    let first = merged.first()?;
    let lead_in = (first.start - horizon.as_interval().start).max(0.0);
    Some(
        interval::gaps(merged)
            .into_iter()
            .fold(lead_in, f64::max),
    )
}

pub fn detection_report(
    merged: &[Interval],
    horizon: &Horizon,
    policy: &DetectionPolicy,
) -> Result<DetectionReport> {
    let orders = policy.order_times(horizon)?;
    let mut served = Vec::new();
    let mut unserved = 0;
    for &t in &orders {
        match latency_to_next(merged, t) {
            Some(latency) => served.push(latency),
            None => unserved += 1,
        }
    }
    Ok(DetectionReport {
        orders: orders.len(),
        served: served.len(),
        unserved,
        latency: SampleStats::from_samples(&served),
        worst_case_secs: worst_case(merged, horizon),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, min / 60, min % 60, 0).unwrap()
    }

    fn make_horizon(minutes: u32) -> Horizon {
        Horizon::new(ts(0), ts(minutes)).unwrap()
    }

    fn iv(start_min: f64, end_min: f64) -> Interval {
        let base = ts(0).timestamp() as f64;
        Interval::new(base + start_min * 60.0, base + end_min * 60.0)
    }

    #[test]
    fn test_zero_latency_inside_interval() {
        let merged = vec![iv(0.0, 10.0)];
        let order = iv(5.0, 5.0).start;
        assert_eq!(latency_to_next(&merged, order), Some(0.0));
    }

    #[test]
    fn test_latency_to_upcoming_interval() {
        let merged = vec![iv(30.0, 40.0)];
        let order = iv(0.0, 0.0).start;
        assert_eq!(latency_to_next(&merged, order), Some(1800.0));
    }

    #[test]
    fn test_no_interval_after_order() {
        let merged = vec![iv(0.0, 10.0)];
        let order = iv(20.0, 20.0).start;
        assert_eq!(latency_to_next(&merged, order), None);
    }

    #[test]
    fn test_worst_case_is_largest_gap() {
        let horizon = make_horizon(300);
        // Lead-in 20 min, gap 80 min
        let merged = vec![iv(20.0, 120.0), iv(200.0, 260.0)];
        let worst = worst_case(&merged, &horizon).unwrap();
        assert!((worst - 4800.0).abs() < 1e-6);

        // Lead-in dominates
        let merged = vec![iv(100.0, 120.0), iv(150.0, 260.0)];
        let worst = worst_case(&merged, &horizon).unwrap();
        assert!((worst - 6000.0).abs() < 1e-6);

        assert!(worst_case(&[], &horizon).is_none());
    }

    #[test]
    fn test_horizon_start_policy() {
        let horizon = make_horizon(300);
        let merged = vec![iv(20.0, 120.0)];
        let report =
            detection_report(&merged, &horizon, &DetectionPolicy::HorizonStart).unwrap();
        assert_eq!(report.orders, 1);
        assert_eq!(report.served, 1);
        assert_eq!(report.unserved, 0);
        let stats = report.latency.unwrap();
        assert!((stats.mean - 1200.0).abs() < 1e-6);
    }

    #[test]
    fn test_periodic_policy_counts_unserved() {
        let horizon = make_horizon(300);
        let merged = vec![iv(0.0, 120.0)];
        // Orders at 0, 100, 200 minutes; only the last falls after coverage ends
        let policy = DetectionPolicy::Periodic {
            interval_secs: 6000.0,
        };
        let report = detection_report(&merged, &horizon, &policy).unwrap();
        assert_eq!(report.orders, 3);
        assert_eq!(report.served, 2);
        assert_eq!(report.unserved, 1);
    }

    #[test]
    fn test_periodic_policy_rejects_nonpositive_interval() {
        let horizon = make_horizon(60);
        let policy = DetectionPolicy::Periodic { interval_secs: 0.0 };
        assert!(matches!(
            detection_report(&[], &horizon, &policy),
            Err(MetricsError::InvalidOrderInterval(_))
        ));
    }
}
