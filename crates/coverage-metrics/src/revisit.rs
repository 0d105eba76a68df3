//! Revisit time: gaps between consecutive merged access intervals

use crate::stats::SampleStats;
use access_windows::{interval, Interval};

/// Gaps (seconds) between the end of one merged interval and the start of
/// the next
pub fn revisit_gaps(merged: &[Interval]) -> Vec<f64> {
    interval::gaps(merged)
}

/// Revisit distribution; `None` when fewer than two merged intervals exist
pub fn revisit_stats(merged: &[Interval]) -> Option<SampleStats> {
    SampleStats::from_samples(&revisit_gaps(merged))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start: f64, end: f64) -> Interval {
        Interval::new(start, end)
    }

    #[test]
    fn test_single_window_has_no_revisit() {
        assert!(revisit_stats(&[iv(0.0, 600.0)]).is_none());
        assert!(revisit_stats(&[]).is_none());
    }

    #[test]
    fn test_gap_between_merged_intervals() {
        // Merged intervals in seconds: one 80-minute gap
        let merged = vec![iv(0.0, 7200.0), iv(12000.0, 15600.0)];
        let stats = revisit_stats(&merged).unwrap();
        assert_eq!(stats.count, 1);
        assert!((stats.mean - 4800.0).abs() < 1e-9);
        assert_eq!(stats.min, stats.max);
    }
}
