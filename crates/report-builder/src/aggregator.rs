//! Metric aggregation
//!
//! Groups loaded windows per (constellation, target, sensor) in ordered
//! maps, so emitted row order is lexicographic and stable across runs, and
//! runs the calculators over each group. Empty-input enforcement happens
//! here: every declared target under every constellation must have at
//! least one access window.

use crate::loader::Dataset;
use crate::{ReportError, Result, Scenario};
use access_windows::{Interval, SensorType, TargetKind};
use coverage_metrics::{coverage, delivery, detection, fusion, revisit, SampleStats};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

const SECS_PER_MIN: f64 = 60.0;

/// One emitted coverage row: (constellation, target, sensor)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageRow {
    pub constellation: String,
    pub target: String,
    pub target_kind: TargetKind,
    pub sensor: SensorType,
    /// Raw windows loaded for this group
    pub window_count: usize,
    /// Merged disjoint access intervals
    pub pass_count: usize,
    pub coverage_fraction: f64,
    /// Revisit distribution in minutes; absent with fewer than two passes
    pub revisit_min: Option<SampleStats>,
    pub detection: DetectionSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionSummary {
    pub orders: usize,
    pub served: usize,
    pub unserved: usize,
    /// Sampled latency distribution in minutes
    pub latency_min: Option<SampleStats>,
    pub worst_case_min: Option<f64>,
}

/// One emitted fusion row: (constellation, target)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionRow {
    pub constellation: String,
    pub target: String,
    pub target_kind: TargetKind,
    pub sar_fraction: f64,
    pub optical_fraction: f64,
    pub combined_fraction: f64,
    pub gain_vs_sar: Option<f64>,
    pub gain_vs_optical: Option<f64>,
    pub overlap_count: usize,
    pub overlap_total_min: f64,
    pub overlap_mean_min: f64,
    pub overlap_max_min: f64,
    pub detection_improvement: Option<f64>,
}

/// One emitted delivery row: (constellation, ship target)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRow {
    pub constellation: String,
    pub target: String,
    pub pass_count: usize,
    pub served: usize,
    /// Delivery latency in minutes over served passes
    pub latency_min: Option<SampleStats>,
}

/// All grouped summaries for one run
#[derive(Debug, Clone, Default)]
pub struct ReportBundle {
    pub coverage: Vec<CoverageRow>,
    pub fusion: Vec<FusionRow>,
    pub delivery: Vec<DeliveryRow>,
}

struct TargetGroup {
    kind: TargetKind,
    by_sensor: BTreeMap<SensorType, Vec<access_windows::AccessWindow>>,
}

pub fn aggregate(dataset: &Dataset, scenario: &Scenario) -> Result<ReportBundle> {
    let horizon = scenario.horizon()?;
    let policy = scenario.detection_policy();

    // Ordered grouping: (constellation, target) -> sensor -> windows
    let mut groups: BTreeMap<(String, String), TargetGroup> = BTreeMap::new();
    for loaded in &dataset.windows {
        let key = (
            loaded.constellation.clone(),
            loaded.window.target.name.clone(),
        );
        groups
            .entry(key)
            .or_insert_with(|| TargetGroup {
                kind: loaded.window.target.kind,
                by_sensor: BTreeMap::new(),
            })
            .by_sensor
            .entry(loaded.window.sensor)
            .or_default()
            .push(loaded.window.clone());
    }

    enforce_declared_targets(&groups, dataset, scenario)?;

    let mut bundle = ReportBundle::default();

    for ((constellation, target), group) in &groups {
        let mut merged_by_sensor: BTreeMap<SensorType, Vec<Interval>> = BTreeMap::new();

        for (sensor, windows) in &group.by_sensor {
            let merged = coverage::merged_coverage(windows, &horizon);
            let detection_report = detection::detection_report(&merged, &horizon, &policy)?;

            bundle.coverage.push(CoverageRow {
                constellation: constellation.clone(),
                target: target.clone(),
                target_kind: group.kind,
                sensor: *sensor,
                window_count: windows.len(),
                pass_count: merged.len(),
                coverage_fraction: coverage::coverage_fraction(&merged, &horizon),
                revisit_min: revisit::revisit_stats(&merged)
                    .map(|s| s.scaled(1.0 / SECS_PER_MIN)),
                detection: DetectionSummary {
                    orders: detection_report.orders,
                    served: detection_report.served,
                    unserved: detection_report.unserved,
                    latency_min: detection_report
                        .latency
                        .map(|s| s.scaled(1.0 / SECS_PER_MIN)),
                    worst_case_min: detection_report.worst_case_secs.map(|w| w / SECS_PER_MIN),
                },
            });

            merged_by_sensor.insert(*sensor, merged);
        }

        let empty = Vec::new();
        let sar = merged_by_sensor.get(&SensorType::Sar).unwrap_or(&empty);
        let optical = merged_by_sensor
            .get(&SensorType::Optical)
            .unwrap_or(&empty);
        let report = fusion::fusion_report(sar, optical, &horizon);
        bundle.fusion.push(FusionRow {
            constellation: constellation.clone(),
            target: target.clone(),
            target_kind: group.kind,
            sar_fraction: report.sar_fraction,
            optical_fraction: report.optical_fraction,
            combined_fraction: report.combined_fraction,
            gain_vs_sar: report.gain_vs_sar,
            gain_vs_optical: report.gain_vs_optical,
            overlap_count: report.overlap.count,
            overlap_total_min: report.overlap.total_secs / SECS_PER_MIN,
            overlap_mean_min: report.overlap.mean_secs / SECS_PER_MIN,
            overlap_max_min: report.overlap.max_secs / SECS_PER_MIN,
            detection_improvement: report.detection_improvement,
        });
    }

    // Delivery: ship targets against the merged union of the same
    // constellation's station passes
    let mut stations_by_constellation: BTreeMap<String, Vec<Interval>> = BTreeMap::new();
    for pass in &dataset.station_passes {
        stations_by_constellation
            .entry(pass.constellation.clone())
            .or_default()
            .push(pass.interval());
    }
    let station_merged: BTreeMap<String, Vec<Interval>> = stations_by_constellation
        .into_iter()
        .map(|(name, intervals)| (name, coverage::merge_clipped(&intervals, &horizon)))
        .collect();

    for ((constellation, target), group) in &groups {
        if group.kind != TargetKind::Ship {
            continue;
        }
        let Some(stations) = station_merged.get(constellation) else {
            continue;
        };
        let all_windows: Vec<Interval> = group
            .by_sensor
            .values()
            .flatten()
            .map(|w| w.interval())
            .collect();
        let target_merged = coverage::merge_clipped(&all_windows, &horizon);
        let report = delivery::delivery_report(&target_merged, stations);

        bundle.delivery.push(DeliveryRow {
            constellation: constellation.clone(),
            target: target.clone(),
            pass_count: report.pass_count,
            served: report.served,
            latency_min: report.latency.map(|s| s.scaled(1.0 / SECS_PER_MIN)),
        });
    }

    info!(
        "aggregated {} coverage rows, {} fusion rows, {} delivery rows",
        bundle.coverage.len(),
        bundle.fusion.len(),
        bundle.delivery.len()
    );
    Ok(bundle)
}

/// Every declared target under every constellation must have data
fn enforce_declared_targets(
    groups: &BTreeMap<(String, String), TargetGroup>,
    dataset: &Dataset,
    scenario: &Scenario,
) -> Result<()> {
    let constellations: Vec<&str> = if scenario.constellations.is_empty() {
        dataset.constellations.keys().map(String::as_str).collect()
    } else {
        scenario
            .constellations
            .iter()
            .map(|c| c.name.as_str())
            .collect()
    };

    for constellation in constellations {
        for target in &scenario.targets {
            let key = (constellation.to_string(), target.name.clone());
            if !groups.contains_key(&key) {
                return Err(ReportError::EmptyInput {
                    constellation: constellation.to_string(),
                    target: target.name.clone(),
                });
            }
        }
    }
    Ok(())
}
