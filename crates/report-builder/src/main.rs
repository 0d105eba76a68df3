//! Constellation Access Report Builder CLI
//!
//! Builds coverage / fusion / delivery summary tables from simulation
//! access exports.
//!
//! Usage:
//!   build-reports --input-dir data/raw \
//!                 --output-dir reports \
//!                 --scenario scenario.json

use anyhow::Result;
use clap::Parser;
use report_builder::pipeline::{run, RunConfig};
use report_builder::scenario::{DetectionPolicyKind, DetectionSpec, Scenario};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "build-reports",
    about = "Build constellation access summary reports from simulation exports"
)]
struct Args {
    /// Directory containing simulation access CSV exports
    #[arg(short, long, default_value = "data/raw")]
    input_dir: PathBuf,

    /// Output directory for summary tables
    #[arg(short, long, default_value = "reports")]
    output_dir: PathBuf,

    /// Scenario JSON (the built-in default scenario is used when the file
    /// is absent)
    #[arg(short, long, default_value = "scenario.json")]
    scenario: PathBuf,

    /// Sample detection orders on a periodic grid with this interval
    /// (minutes) instead of a single order at the horizon start
    #[arg(long)]
    order_interval_min: Option<f64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{}", "=".repeat(60));
    info!("SX9-Maritime Access Report Builder");
    info!("{}", "=".repeat(60));

    let mut scenario = if args.scenario.exists() {
        Scenario::load(&args.scenario)?
    } else {
        warn!(
            "scenario file {:?} not found, using built-in default scenario",
            args.scenario
        );
        Scenario::default()
    };

    if let Some(interval_min) = args.order_interval_min {
        scenario.detection = DetectionSpec {
            policy: DetectionPolicyKind::Periodic,
            interval_min: Some(interval_min),
        };
    }

    let summary = run(&RunConfig {
        input_dir: args.input_dir,
        output_dir: args.output_dir.clone(),
        scenario,
    })?;

    info!("\n{}", "=".repeat(60));
    info!("SUMMARY");
    info!("{}", "=".repeat(60));
    info!("Scenario: {}", summary.scenario);
    info!("Input files: {}", summary.input_files.len());
    info!("Access windows: {}", summary.access_windows);
    info!("Station passes: {}", summary.station_passes);
    info!(
        "Rows: {} coverage, {} fusion, {} delivery",
        summary.coverage_rows, summary.fusion_rows, summary.delivery_rows
    );
    for table in &summary.tables {
        info!("  {:?}", args.output_dir.join(table));
    }

    Ok(())
}
