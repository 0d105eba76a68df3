//! Interval algebra over f64 Unix seconds
//!
//! The metric calculators all operate on merged interval sets: sorted,
//! disjoint, produced by [`merge`]. Merging joins overlapping *and*
//! touching intervals, so a gap in a merged set is always strictly
//! positive.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Half-open time interval `[start, end)` in Unix seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    pub fn new(start: f64, end: f64) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t < self.end
    }
}

/// Merge intervals into a sorted, disjoint set. Overlapping or touching
/// intervals are joined.
pub fn merge(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(Ordering::Equal));

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for iv in intervals {
        match merged.last_mut() {
            Some(last) if iv.start <= last.end => {
                if iv.end > last.end {
                    last.end = iv.end;
                }
            }
            _ => merged.push(iv),
        }
    }
    merged
}

/// Clip intervals to `bounds`, dropping anything that falls entirely outside
pub fn clip(intervals: &[Interval], bounds: Interval) -> Vec<Interval> {
    intervals
        .iter()
        .filter_map(|iv| {
            let start = iv.start.max(bounds.start);
            let end = iv.end.min(bounds.end);
            (start < end).then(|| Interval::new(start, end))
        })
        .collect()
}

/// Total covered duration of a disjoint interval set
pub fn total_duration(intervals: &[Interval]) -> f64 {
    // fold from +0.0 rather than `sum()`, whose -0.0 identity would make
    // an empty set format as "-0.0"
    intervals.iter().map(Interval::duration).fold(0.0, |acc, d| acc + d)
}

/// Strictly positive gaps between consecutive intervals of a merged set
pub fn gaps(merged: &[Interval]) -> Vec<f64> {
    merged
        .windows(2)
        .map(|pair| pair[1].start - pair[0].end)
        .filter(|g| *g > 0.0)
        .collect()
}

/// Intersection of two merged interval sets
pub fn intersect(a: &[Interval], b: &[Interval]) -> Vec<Interval> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let start = a[i].start.max(b[j].start);
        let end = a[i].end.min(b[j].end);
        if start < end {
            out.push(Interval::new(start, end));
        }
        if a[i].end <= b[j].end {
            i += 1;
        } else {
            j += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start: f64, end: f64) -> Interval {
        Interval::new(start, end)
    }

    /// Minute-scale example: [(0,60),(50,120),(200,260)] merges to
    /// [(0,120),(200,260)] with one 80-unit gap
    #[test]
    fn test_merge_overlapping() {
        let merged = merge(vec![iv(0.0, 60.0), iv(50.0, 120.0), iv(200.0, 260.0)]);
        assert_eq!(merged, vec![iv(0.0, 120.0), iv(200.0, 260.0)]);
        assert!((total_duration(&merged) - 180.0).abs() < 1e-9);
        assert_eq!(gaps(&merged), vec![80.0]);
    }

    #[test]
    fn test_merge_touching() {
        let merged = merge(vec![iv(0.0, 10.0), iv(10.0, 20.0)]);
        assert_eq!(merged, vec![iv(0.0, 20.0)]);
    }

    #[test]
    fn test_merge_unsorted_input() {
        let merged = merge(vec![iv(200.0, 260.0), iv(50.0, 120.0), iv(0.0, 60.0)]);
        assert_eq!(merged, vec![iv(0.0, 120.0), iv(200.0, 260.0)]);
    }

    #[test]
    fn test_merge_idempotent() {
        let once = merge(vec![iv(0.0, 60.0), iv(50.0, 120.0), iv(200.0, 260.0)]);
        let twice = merge(once.clone());
        assert_eq!(once, twice);
        assert!((total_duration(&once) - total_duration(&twice)).abs() < 1e-9);
    }

    #[test]
    fn test_clip() {
        let clipped = clip(
            &[iv(-10.0, 5.0), iv(10.0, 20.0), iv(25.0, 40.0)],
            iv(0.0, 30.0),
        );
        assert_eq!(clipped, vec![iv(0.0, 5.0), iv(10.0, 20.0), iv(25.0, 30.0)]);

        // Entirely outside the bounds
        assert!(clip(&[iv(40.0, 50.0)], iv(0.0, 30.0)).is_empty());
    }

    #[test]
    fn test_intersect_commutative_and_bounded() {
        let a = merge(vec![iv(0.0, 10.0), iv(20.0, 30.0)]);
        let b = merge(vec![iv(5.0, 25.0)]);

        let ab = intersect(&a, &b);
        let ba = intersect(&b, &a);
        assert_eq!(ab, ba);
        assert_eq!(ab, vec![iv(5.0, 10.0), iv(20.0, 25.0)]);

        let overlap = total_duration(&ab);
        assert!(overlap <= total_duration(&a));
        assert!(overlap <= total_duration(&b));
    }

    #[test]
    fn test_intersect_disjoint() {
        let a = vec![iv(0.0, 10.0)];
        let b = vec![iv(10.0, 20.0)];
        assert!(intersect(&a, &b).is_empty());
    }

    #[test]
    fn test_gaps_single_interval() {
        assert!(gaps(&[iv(0.0, 10.0)]).is_empty());
        assert!(gaps(&[]).is_empty());
    }
}
