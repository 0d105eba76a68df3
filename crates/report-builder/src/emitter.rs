//! Report emission
//!
//! Writes the grouped summaries as flat CSV tables plus a JSON run
//! summary. The table list inside the run summary is the handoff manifest
//! the external dashboard renderer consumes; rendering itself is never
//! invoked from here. Durations are reported in minutes, coverage as
//! fractions in [0, 1]; undefined statistics become empty cells.

use crate::aggregator::{CoverageRow, DeliveryRow, FusionRow, ReportBundle};
use crate::loader::Dataset;
use crate::{Result, Scenario};
use access_windows::Horizon;
use chrono::{DateTime, Utc};
use coverage_metrics::SampleStats;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

const COVERAGE_TABLE: &str = "coverage_summary.csv";
const FUSION_TABLE: &str = "fusion_summary.csv";
const DELIVERY_TABLE: &str = "delivery_latency.csv";
const RUN_SUMMARY: &str = "run_summary.json";

/// The full structured report: run metadata plus every emitted row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub scenario: String,
    pub horizon_start: DateTime<Utc>,
    pub horizon_end: DateTime<Utc>,
    pub input_files: Vec<String>,
    pub access_windows: usize,
    pub station_passes: usize,
    pub coverage_rows: usize,
    pub fusion_rows: usize,
    pub delivery_rows: usize,
    /// Emitted tables, consumed by the external visualization step
    pub tables: Vec<String>,
    pub generated_at: String,
    pub coverage: Vec<CoverageRow>,
    pub fusion: Vec<FusionRow>,
    pub delivery: Vec<DeliveryRow>,
}

/// Write all report artifacts into `output_dir`
pub fn write_reports(
    output_dir: &Path,
    bundle: &ReportBundle,
    dataset: &Dataset,
    scenario: &Scenario,
) -> Result<RunSummary> {
    fs::create_dir_all(output_dir)?;
    let horizon = scenario.horizon()?;

    let mut tables = Vec::new();

    write_coverage_table(&output_dir.join(COVERAGE_TABLE), &bundle.coverage)?;
    tables.push(COVERAGE_TABLE.to_string());

    write_fusion_table(&output_dir.join(FUSION_TABLE), &bundle.fusion)?;
    tables.push(FUSION_TABLE.to_string());

    // Only meaningful when downlink passes were loaded
    if !dataset.station_passes.is_empty() {
        write_delivery_table(&output_dir.join(DELIVERY_TABLE), &bundle.delivery)?;
        tables.push(DELIVERY_TABLE.to_string());
    }

    let summary = build_summary(bundle, dataset, scenario, &horizon, tables);

    let file = File::create(output_dir.join(RUN_SUMMARY))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &summary)?;

    info!("wrote {} tables to {:?}", summary.tables.len(), output_dir);
    Ok(summary)
}

fn build_summary(
    bundle: &ReportBundle,
    dataset: &Dataset,
    scenario: &Scenario,
    horizon: &Horizon,
    mut tables: Vec<String>,
) -> RunSummary {
    tables.push(RUN_SUMMARY.to_string());
    RunSummary {
        scenario: scenario.name.clone(),
        horizon_start: horizon.start,
        horizon_end: horizon.end,
        input_files: dataset.files.clone(),
        access_windows: dataset.windows.len(),
        station_passes: dataset.station_passes.len(),
        coverage_rows: bundle.coverage.len(),
        fusion_rows: bundle.fusion.len(),
        delivery_rows: bundle.delivery.len(),
        tables,
        generated_at: Utc::now().to_rfc3339(),
        coverage: bundle.coverage.clone(),
        fusion: bundle.fusion.clone(),
        delivery: bundle.delivery.clone(),
    }
}

/// `count,min,mean,median,p95,max` cells; empty cells when undefined
fn stats_cells(stats: &Option<SampleStats>) -> String {
    match stats {
        Some(s) => format!(
            "{},{:.2},{:.2},{:.2},{:.2},{:.2}",
            s.count, s.min, s.mean, s.median, s.p95, s.max
        ),
        None => "0,,,,,".to_string(),
    }
}

fn opt_cell(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => String::new(),
    }
}

fn write_coverage_table(path: &Path, rows: &[CoverageRow]) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(
        w,
        "constellation,target,target_kind,sensor,window_count,pass_count,coverage_fraction,\
         revisit_count,revisit_min_min,revisit_mean_min,revisit_median_min,revisit_p95_min,revisit_max_min,\
         detection_orders,detection_served,detection_unserved,\
         detection_count,detection_min_min,detection_mean_min,detection_median_min,detection_p95_min,detection_max_min,\
         detection_worst_case_min"
    )?;
    for row in rows {
        writeln!(
            w,
            "{},{},{},{},{},{},{:.4},{},{},{},{},{},{}",
            row.constellation,
            row.target,
            row.target_kind.as_str(),
            row.sensor.as_str(),
            row.window_count,
            row.pass_count,
            row.coverage_fraction,
            stats_cells(&row.revisit_min),
            row.detection.orders,
            row.detection.served,
            row.detection.unserved,
            stats_cells(&row.detection.latency_min),
            opt_cell(row.detection.worst_case_min, 2),
        )?;
    }
    w.flush()?;
    Ok(())
}

fn write_fusion_table(path: &Path, rows: &[FusionRow]) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(
        w,
        "constellation,target,target_kind,sar_coverage_fraction,optical_coverage_fraction,\
         combined_coverage_fraction,gain_vs_sar,gain_vs_optical,\
         overlap_count,overlap_total_min,overlap_mean_min,overlap_max_min,detection_improvement"
    )?;
    for row in rows {
        writeln!(
            w,
            "{},{},{},{:.4},{:.4},{:.4},{},{},{},{:.2},{:.2},{:.2},{}",
            row.constellation,
            row.target,
            row.target_kind.as_str(),
            row.sar_fraction,
            row.optical_fraction,
            row.combined_fraction,
            opt_cell(row.gain_vs_sar, 3),
            opt_cell(row.gain_vs_optical, 3),
            row.overlap_count,
            row.overlap_total_min,
            row.overlap_mean_min,
            row.overlap_max_min,
            opt_cell(row.detection_improvement, 3),
        )?;
    }
    w.flush()?;
    Ok(())
}

fn write_delivery_table(path: &Path, rows: &[DeliveryRow]) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(
        w,
        "constellation,target,pass_count,served,\
         latency_count,latency_min_min,latency_mean_min,latency_median_min,latency_p95_min,latency_max_min"
    )?;
    for row in rows {
        writeln!(
            w,
            "{},{},{},{},{}",
            row.constellation,
            row.target,
            row.pass_count,
            row.served,
            stats_cells(&row.latency_min),
        )?;
    }
    w.flush()?;
    Ok(())
}
