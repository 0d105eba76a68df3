//! End-to-end batch run: load, aggregate, emit
//!
//! Single-threaded and synchronous; a run either completes or fails
//! atomically with the first validation error.

use crate::emitter::RunSummary;
use crate::{aggregator, emitter, loader, Result, Scenario};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub scenario: Scenario,
}

pub fn run(config: &RunConfig) -> Result<RunSummary> {
    config.scenario.validate()?;

    info!("scenario {:?}, input {:?}", config.scenario.name, config.input_dir);
    let dataset = loader::load_input_dir(&config.input_dir, &config.scenario)?;
    info!(
        "loaded {} access windows and {} station passes from {} files",
        dataset.windows.len(),
        dataset.station_passes.len(),
        dataset.files.len()
    );

    let bundle = aggregator::aggregate(&dataset, &config.scenario)?;
    emitter::write_reports(&config.output_dir, &bundle, &dataset, &config.scenario)
}
