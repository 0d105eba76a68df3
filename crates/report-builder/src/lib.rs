//! Constellation Access Report Builder
//!
//! Batch pipeline over simulation access exports: discover and load the
//! input CSVs, validate row-level schema, aggregate coverage / revisit /
//! detection / fusion / delivery metrics per (constellation, target,
//! sensor), and emit summary tables plus a JSON run summary for the
//! external dashboard renderer.
//!
//! A run either completes or fails atomically; there is no partial-success
//! mode. All validation failures name the offending file and row.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

pub mod aggregator;
pub mod emitter;
pub mod loader;
pub mod pipeline;
pub mod scenario;

pub use emitter::RunSummary;
pub use pipeline::{run, RunConfig};
pub use scenario::Scenario;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("metrics error: {0}")]
    Metrics(#[from] coverage_metrics::MetricsError),
    #[error("schema error in {file}:{line}: {message}")]
    Schema {
        file: String,
        line: usize,
        message: String,
    },
    #[error("ordering error in {file}:{line}: start {start} is not before end {end}")]
    Ordering {
        file: String,
        line: usize,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("undeclared constellation in {file}: {label}")]
    UndeclaredConstellation { file: String, label: String },
    #[error("no access windows for declared target {target:?} under constellation {constellation:?}")]
    EmptyInput {
        constellation: String,
        target: String,
    },
    #[error("no CSV input files found in {0:?}")]
    NoInputFiles(PathBuf),
    #[error("invalid scenario: {0}")]
    Scenario(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
