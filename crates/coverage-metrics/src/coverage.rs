//! Coverage fraction: union of covered time over the horizon

use access_windows::{interval, AccessWindow, Horizon, Interval};

/// Merge a target's access windows into disjoint covered intervals,
/// clipped to the horizon
pub fn merged_coverage(windows: &[AccessWindow], horizon: &Horizon) -> Vec<Interval> {
    let intervals: Vec<Interval> = windows.iter().map(AccessWindow::interval).collect();
    merge_clipped(&intervals, horizon)
}

/// Same, starting from raw intervals (used for station passes)
pub fn merge_clipped(intervals: &[Interval], horizon: &Horizon) -> Vec<Interval> {
    interval::merge(interval::clip(intervals, horizon.as_interval()))
}

/// Fraction of the horizon covered by at least one interval; always in [0, 1]
/// for intervals clipped to the horizon
pub fn coverage_fraction(merged: &[Interval], horizon: &Horizon) -> f64 {
    let total = horizon.duration_secs();
    if total <= 0.0 {
        return 0.0;
    }
    interval::total_duration(merged) / total
}
