//! Summary statistics over f64 samples

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Summary-statistics vector for revisit, detection and delivery
/// distributions. Undefined (never constructed) for empty samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    pub count: usize,
    pub min: f64,
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
    pub max: f64,
}

impl SampleStats {
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        Some(SampleStats {
            count,
            min: sorted[0],
            mean,
            median: median_sorted(&sorted),
            p95: percentile_sorted(&sorted, 0.95),
            max: sorted[count - 1],
        })
    }

    /// Unit conversion (e.g. seconds to minutes); count is unchanged
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            count: self.count,
            min: self.min * factor,
            mean: self.mean * factor,
            median: self.median * factor,
            p95: self.p95 * factor,
            max: self.max * factor,
        }
    }
}

/// Midpoint of the two central values for even-length samples
fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Linear-interpolated percentile over sorted samples, `q` in [0, 1]
fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}
