//! Sensor fusion: combined SAR + Optical coverage and overlap windows

use crate::coverage::coverage_fraction;
use crate::detection::latency_to_next;
use access_windows::{interval, Horizon, Interval};
use serde::{Deserialize, Serialize};

/// Simultaneous SAR + Optical visibility statistics (zeros when either
/// sensor set is empty)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OverlapStats {
    pub count: usize,
    pub total_secs: f64,
    pub mean_secs: f64,
    pub max_secs: f64,
}

impl OverlapStats {
    fn from_intervals(overlaps: &[Interval]) -> Self {
        if overlaps.is_empty() {
            return Self {
                count: 0,
                total_secs: 0.0,
                mean_secs: 0.0,
                max_secs: 0.0,
            };
        }
        let total = interval::total_duration(overlaps);
        let max = overlaps
            .iter()
            .map(Interval::duration)
            .fold(0.0, f64::max);
        Self {
            count: overlaps.len(),
            total_secs: total,
            mean_secs: total / overlaps.len() as f64,
            max_secs: max,
        }
    }
}

/// Per-target fusion summary for one constellation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionReport {
    pub sar_fraction: f64,
    pub optical_fraction: f64,
    /// Union across both sensors
    pub combined_fraction: f64,
    /// Undefined when the single-sensor fraction is zero
    pub gain_vs_sar: Option<f64>,
    pub gain_vs_optical: Option<f64>,
    pub overlap: OverlapStats,
    /// SAR-only detection latency over fused latency, measured from the
    /// horizon start; undefined when either latency is unavailable or the
    /// fused latency is zero
    pub detection_improvement: Option<f64>,
}

/// Compute the fusion summary from merged per-sensor interval sets
pub fn fusion_report(sar: &[Interval], optical: &[Interval], horizon: &Horizon) -> FusionReport {
    let combined = interval::merge(sar.iter().chain(optical.iter()).copied().collect());

    let sar_fraction = coverage_fraction(sar, horizon);
    let optical_fraction = coverage_fraction(optical, horizon);
    let combined_fraction = coverage_fraction(&combined, horizon);

    let gain = |fraction: f64| (fraction > 0.0).then(|| combined_fraction / fraction);

    let start = horizon.as_interval().start;
    let detection_improvement = match (latency_to_next(sar, start), latency_to_next(&combined, start))
    {
        (Some(sar_latency), Some(fused_latency)) if fused_latency > 0.0 => {
            Some(sar_latency / fused_latency)
        }
        _ => None,
    };

    FusionReport {
        sar_fraction,
        optical_fraction,
        combined_fraction,
        gain_vs_sar: gain(sar_fraction),
        gain_vs_optical: gain(optical_fraction),
        overlap: OverlapStats::from_intervals(&interval::intersect(sar, optical)),
        detection_improvement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn make_horizon(minutes: u32) -> Horizon {
        Horizon::new(
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 1, minutes / 60, minutes % 60, 0).unwrap(),
        )
        .unwrap()
    }

    fn iv(start_min: f64, end_min: f64) -> Interval {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap().timestamp() as f64;
        Interval::new(base + start_min * 60.0, base + end_min * 60.0)
    }

    #[test]
    fn test_gain_at_least_one() {
        let horizon = make_horizon(300);
        let sar = vec![iv(0.0, 60.0)];
        let optical = vec![iv(100.0, 160.0)];

        let report = fusion_report(&sar, &optical, &horizon);
        assert!((report.combined_fraction - 0.4).abs() < 1e-9);
        assert!(report.gain_vs_sar.unwrap() >= 1.0);
        assert!(report.gain_vs_optical.unwrap() >= 1.0);
        // Disjoint sensors, no fusion windows
        assert_eq!(report.overlap.count, 0);
        assert_eq!(report.overlap.total_secs, 0.0);
    }

    #[test]
    fn test_gain_undefined_for_empty_sensor() {
        let horizon = make_horizon(300);
        let optical = vec![iv(0.0, 60.0)];

        let report = fusion_report(&[], &optical, &horizon);
        assert!(report.gain_vs_sar.is_none());
        assert_eq!(report.gain_vs_optical, Some(1.0));
        assert_eq!(report.sar_fraction, 0.0);
    }

    #[test]
    fn test_overlap_windows() {
        let horizon = make_horizon(300);
        let sar = vec![iv(0.0, 60.0), iv(100.0, 160.0)];
        let optical = vec![iv(40.0, 120.0)];

        let report = fusion_report(&sar, &optical, &horizon);
        assert_eq!(report.overlap.count, 2);
        assert!((report.overlap.total_secs - 2400.0).abs() < 1e-6);
        assert!((report.overlap.max_secs - 1200.0).abs() < 1e-6);
        assert!((report.overlap.mean_secs - 1200.0).abs() < 1e-6);
    }

    #[test]
    fn test_detection_improvement() {
        let horizon = make_horizon(300);
        // SAR first reaches the target at 60 min, optical at 20 min
        let sar = vec![iv(60.0, 90.0)];
        let optical = vec![iv(20.0, 40.0)];

        let report = fusion_report(&sar, &optical, &horizon);
        assert!((report.detection_improvement.unwrap() - 3.0).abs() < 1e-9);

        // Fused latency zero -> undefined
        let sar = vec![iv(0.0, 30.0)];
        let report = fusion_report(&sar, &optical, &horizon);
        assert!(report.detection_improvement.is_none());
    }
}
