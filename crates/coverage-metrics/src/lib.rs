//! Coverage Metric Calculators
//!
//! Pure functions mapping merged access-interval sets (plus an analysis
//! horizon) to the surveillance metrics of the study: coverage fraction,
//! revisit-time distribution, detection latency, sensor-fusion gain, and
//! downlink delivery latency. All calculators are deterministic over their
//! inputs; undefined statistics (empty samples, zero denominators) are
//! reported as `None`, never as a thrown error or a silent zero.

use thiserror::Error;

pub mod coverage;
pub mod delivery;
pub mod detection;
pub mod fusion;
pub mod revisit;
pub mod stats;

pub use delivery::DeliveryReport;
pub use detection::{DetectionPolicy, DetectionReport};
pub use fusion::{FusionReport, OverlapStats};
pub use stats::SampleStats;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("detection order interval must be positive, got {0} s")]
    InvalidOrderInterval(f64),
}

pub type Result<T> = std::result::Result<T, MetricsError>;
