//! Access-export discovery and loading
//!
//! Scans the input directory for `*.csv` (sorted by filename for
//! determinism) and classifies each file by name. Raw STK exports carry
//! their target, sensor and constellation size in the filename and stack
//! per-satellite row blocks inside; ground-station (`GS_*`) exports share
//! the row structure but describe downlink passes. Every other CSV is
//! parsed as a normalized flat table. Any row that fails validation aborts
//! the whole run with an error naming the file and line.

use crate::{ReportError, Result};
use access_windows::{
    AccessWindow, ConstellationConfig, SensorType, StationPass, Target, TargetKind,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// STK export timestamp format, e.g. `1 Jan 2026 00:14:32.512`
const STK_TIME_FORMAT: &str = "%d %b %Y %H:%M:%S%.f";

/// Normalized flat-table columns, in order
const FLAT_COLUMNS: [&str; 8] = [
    "constellation",
    "satellite",
    "target",
    "target_kind",
    "sensor",
    "start",
    "end",
    "max_elevation_deg",
];

/// Statistics trailer rows appended by STK after each satellite block
const STK_TRAILERS: [&str; 6] = [
    "Min Duration",
    "Max Duration",
    "Mean Duration",
    "Total Duration",
    "Statistics",
    "Global Statistics",
];

/// An access window labeled with the constellation it was simulated under
#[derive(Debug, Clone)]
pub struct LoadedWindow {
    pub constellation: String,
    pub window: AccessWindow,
}

/// Everything loaded from one input directory
#[derive(Debug, Default)]
pub struct Dataset {
    pub windows: Vec<LoadedWindow>,
    pub station_passes: Vec<StationPass>,
    /// Files that contributed data, in load order
    pub files: Vec<String>,
    /// Resolved constellation configurations, keyed by name
    pub constellations: BTreeMap<String, ConstellationConfig>,
}

/// Filename classification
#[derive(Debug, Clone, PartialEq)]
enum FileKind {
    /// `Port_*`, `Ship*`, `EEZ_*` access export
    TargetExport {
        target: Target,
        sensor: SensorType,
        satellite_count: u32,
    },
    /// `GS_*` downlink export
    StationExport {
        station: String,
        satellite_count: u32,
    },
    /// `*_Access.csv` with no per-constellation access data (e.g. ship-to-EEZ
    /// transit geometry); logged and skipped
    OtherAccess,
    /// Normalized flat table
    FlatTable,
}

/// Classify an input filename.
///
/// Recognized raw-export shapes:
/// - `Port_{Name}-Walker{N}_{SAR|Optical}_Access.csv`
/// - `Ship{K}-Constellation{N}_{SAR|Optical}_Access.csv`
/// - `EEZ_{Name}-Constellation{N}_{SAR|Optical}_Access.csv`
/// - `GS_{Name}-Walker{N}_Access.csv`
fn classify(filename: &str) -> FileKind {
    let Some(stem) = filename.strip_suffix(".csv") else {
        return FileKind::FlatTable;
    };
    let Some(stem) = stem.strip_suffix("_Access") else {
        return FileKind::FlatTable;
    };

    if let Some(rest) = stem.strip_prefix("GS_") {
        if let Some((station, count)) = split_constellation(rest, "Walker") {
            return FileKind::StationExport {
                station: station.to_string(),
                satellite_count: count,
            };
        }
        return FileKind::OtherAccess;
    }

    let (kind, body, pattern) = if let Some(rest) = stem.strip_prefix("Port_") {
        (TargetKind::Port, rest, "Walker")
    } else if let Some(rest) = stem.strip_prefix("EEZ_") {
        (TargetKind::EezRegion, rest, "Constellation")
    } else if stem.starts_with("Ship") {
        (TargetKind::Ship, stem, "Constellation")
    } else {
        return FileKind::OtherAccess;
    };

    // `{Name}-{Pattern}{N}_{Sensor}`
    let Some((body, sensor_token)) = body.rsplit_once('_') else {
        return FileKind::OtherAccess;
    };
    let Ok(sensor) = SensorType::parse(sensor_token) else {
        return FileKind::OtherAccess;
    };
    let Some((name, count)) = split_constellation(body, pattern) else {
        return FileKind::OtherAccess;
    };

    FileKind::TargetExport {
        target: Target::new(name, kind),
        sensor,
        satellite_count: count,
    }
}

/// Split `{Name}-{Pattern}{N}` into the name and the satellite count
fn split_constellation<'a>(body: &'a str, pattern: &str) -> Option<(&'a str, u32)> {
    let (name, tail) = body.rsplit_once('-')?;
    let count = tail.strip_prefix(pattern)?.parse().ok()?;
    (!name.is_empty()).then_some((name, count))
}

/// Constellation name resolution against the scenario declarations
struct Registry {
    declared: bool,
    by_name: BTreeMap<String, ConstellationConfig>,
}

impl Registry {
    fn new(declared: &[ConstellationConfig]) -> Self {
        Self {
            declared: !declared.is_empty(),
            by_name: declared
                .iter()
                .map(|c| (c.name.clone(), c.clone()))
                .collect(),
        }
    }

    /// Resolve a satellite count parsed from a filename
    fn resolve_count(&mut self, count: u32, file: &str) -> Result<String> {
        if let Some(cfg) = self.by_name.values().find(|c| c.satellite_count == count) {
            return Ok(cfg.name.clone());
        }
        if self.declared {
            return Err(ReportError::UndeclaredConstellation {
                file: file.to_string(),
                label: format!("{count} satellites"),
            });
        }
        let cfg = ConstellationConfig::from_count(count);
        let name = cfg.name.clone();
        self.by_name.insert(name.clone(), cfg);
        Ok(name)
    }

    /// Resolve a constellation label from a flat-table row
    fn resolve_label(&mut self, label: &str, file: &str) -> Result<String> {
        if self.by_name.contains_key(label) {
            return Ok(label.to_string());
        }
        if self.declared {
            return Err(ReportError::UndeclaredConstellation {
                file: file.to_string(),
                label: label.to_string(),
            });
        }
        // Registered on first sight; count recovered from "{n}-sat" labels
        let count = label
            .split('-')
            .next()
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
        self.by_name.insert(
            label.to_string(),
            ConstellationConfig {
                name: label.to_string(),
                satellite_count: count,
            },
        );
        Ok(label.to_string())
    }
}

/// One validated data row from an STK export
struct StkRow {
    satellite: usize,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    line: usize,
}

fn schema_error(file: &str, line: usize, message: String) -> ReportError {
    ReportError::Schema {
        file: file.to_string(),
        line,
        message,
    }
}

fn parse_stk_timestamp(raw: &str, file: &str, line: usize) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, STK_TIME_FORMAT)
        .map(|dt| dt.and_utc())
        .map_err(|e| schema_error(file, line, format!("bad timestamp {raw:?}: {e}")))
}

fn is_trailer_row(first_cell: &str) -> bool {
    STK_TRAILERS.iter().any(|p| first_cell.starts_with(p))
}

/// Parse the stacked per-satellite blocks of an STK access export. A
/// repeated header row opens the block for the next satellite; statistics
/// trailer rows are skipped; everything else must be a valid data row.
fn read_stk_rows(path: &Path, file: &str) -> Result<Vec<StkRow>> {
    let content = fs::read_to_string(path)?;
    let mut rows = Vec::new();
    let mut satellite: Option<usize> = None;

    for (idx, raw_line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim_start_matches('\u{feff}');
        let cells: Vec<&str> = line
            .split(',')
            .map(|c| c.trim().trim_matches('"'))
            .filter(|c| !c.is_empty())
            .collect();
        if cells.is_empty() {
            continue;
        }

        let first = cells[0];
        if first == "Access" && cells.len() >= 2 && cells[1].contains("Start Time") {
            satellite = Some(satellite.map_or(0, |s| s + 1));
            continue;
        }
        if is_trailer_row(first) {
            continue;
        }

        let sat = satellite.ok_or_else(|| {
            schema_error(file, line_no, "data row before satellite block header".to_string())
        })?;
        if cells.len() < 4 {
            return Err(schema_error(
                file,
                line_no,
                format!("expected 4 columns (access, start, stop, duration), got {}", cells.len()),
            ));
        }
        first.parse::<u32>().map_err(|_| {
            schema_error(file, line_no, format!("expected access index, got {first:?}"))
        })?;
        let start = parse_stk_timestamp(cells[1], file, line_no)?;
        let end = parse_stk_timestamp(cells[2], file, line_no)?;
        cells[3].parse::<f64>().map_err(|_| {
            schema_error(file, line_no, format!("bad duration {:?}", cells[3]))
        })?;

        rows.push(StkRow {
            satellite: sat,
            start,
            end,
            line: line_no,
        });
    }

    Ok(rows)
}

/// Load an STK target export into labeled access windows
fn load_target_export(
    path: &Path,
    file: &str,
    constellation: &str,
    target: &Target,
    sensor: SensorType,
) -> Result<Vec<LoadedWindow>> {
    let rows = read_stk_rows(path, file)?;
    let satellites = rows.iter().map(|r| r.satellite).max().map_or(0, |s| s + 1);
    debug!(
        "{}: {} access rows across {} satellites",
        file,
        rows.len(),
        satellites
    );

    rows.into_iter()
        .map(|row| {
            let window = AccessWindow::new(
                format!("sat-{:02}", row.satellite),
                target.clone(),
                sensor,
                row.start,
                row.end,
                None,
            )
            .map_err(|_| ReportError::Ordering {
                file: file.to_string(),
                line: row.line,
                start: row.start,
                end: row.end,
            })?;
            Ok(LoadedWindow {
                constellation: constellation.to_string(),
                window,
            })
        })
        .collect()
}

/// Load a `GS_*` downlink export into station passes
fn load_station_export(
    path: &Path,
    file: &str,
    constellation: &str,
    station: &str,
) -> Result<Vec<StationPass>> {
    let rows = read_stk_rows(path, file)?;
    rows.into_iter()
        .map(|row| {
            StationPass::new(
                constellation.to_string(),
                station.to_string(),
                format!("sat-{:02}", row.satellite),
                row.start,
                row.end,
            )
            .map_err(|_| ReportError::Ordering {
                file: file.to_string(),
                line: row.line,
                start: row.start,
                end: row.end,
            })
        })
        .collect()
}

fn parse_rfc3339(raw: &str, file: &str, line: usize) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| schema_error(file, line, format!("bad timestamp {raw:?}: {e}")))
}

/// Load a normalized flat table. The constellation column is required here
/// because flat rows carry no filename metadata.
fn load_flat_table(path: &Path, file: &str, registry: &mut Registry) -> Result<Vec<LoadedWindow>> {
    let content = fs::read_to_string(path)?;
    let mut lines = content.lines().enumerate();

    let (header_idx, header) = lines
        .next()
        .ok_or_else(|| schema_error(file, 1, "empty file".to_string()))?;
    let header = header.trim_start_matches('\u{feff}');
    let found: Vec<&str> = header.split(',').map(str::trim).collect();
    for (i, expected) in FLAT_COLUMNS.iter().enumerate() {
        match found.get(i) {
            Some(col) if col == expected => {}
            Some(col) => {
                return Err(schema_error(
                    file,
                    header_idx + 1,
                    format!("expected column {expected:?}, found {col:?}"),
                ))
            }
            None => {
                return Err(schema_error(
                    file,
                    header_idx + 1,
                    format!("missing column {expected:?}"),
                ))
            }
        }
    }

    let mut windows = Vec::new();
    for (idx, raw_line) in lines {
        let line_no = idx + 1;
        if raw_line.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = raw_line.split(',').map(str::trim).collect();
        if cells.len() != FLAT_COLUMNS.len() {
            return Err(schema_error(
                file,
                line_no,
                format!("expected {} columns, got {}", FLAT_COLUMNS.len(), cells.len()),
            ));
        }

        let label = cells[0];
        if label.is_empty() {
            return Err(schema_error(file, line_no, "missing constellation".to_string()));
        }
        let constellation = registry.resolve_label(label, file)?;

        let satellite = cells[1];
        if satellite.is_empty() {
            return Err(schema_error(file, line_no, "missing satellite".to_string()));
        }
        let target_name = cells[2];
        if target_name.is_empty() {
            return Err(schema_error(file, line_no, "missing target".to_string()));
        }
        let kind = TargetKind::parse(cells[3])
            .map_err(|e| schema_error(file, line_no, e.to_string()))?;
        let sensor = SensorType::parse(cells[4])
            .map_err(|e| schema_error(file, line_no, e.to_string()))?;
        let start = parse_rfc3339(cells[5], file, line_no)?;
        let end = parse_rfc3339(cells[6], file, line_no)?;
        let max_elevation = if cells[7].is_empty() {
            None
        } else {
            Some(cells[7].parse::<f64>().map_err(|_| {
                schema_error(file, line_no, format!("bad max_elevation_deg {:?}", cells[7]))
            })?)
        };

        let window = AccessWindow::new(
            satellite.to_string(),
            Target::new(target_name, kind),
            sensor,
            start,
            end,
            max_elevation,
        )
        .map_err(|_| ReportError::Ordering {
            file: file.to_string(),
            line: line_no,
            start,
            end,
        })?;

        windows.push(LoadedWindow {
            constellation,
            window,
        });
    }

    Ok(windows)
}

/// Discover and load all CSV inputs under `dir`
pub fn load_input_dir(dir: &Path, scenario: &crate::Scenario) -> Result<Dataset> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(ReportError::NoInputFiles(dir.to_path_buf()));
    }

    let mut registry = Registry::new(&scenario.constellations);
    let mut dataset = Dataset::default();

    for path in &paths {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match classify(&file) {
            FileKind::TargetExport {
                target,
                sensor,
                satellite_count,
            } => {
                let constellation = registry.resolve_count(satellite_count, &file)?;
                let windows =
                    load_target_export(path, &file, &constellation, &target, sensor)?;
                info!(
                    "{}: {} access windows ({} / {} / {})",
                    file,
                    windows.len(),
                    constellation,
                    target.name,
                    sensor.as_str()
                );
                dataset.windows.extend(windows);
                dataset.files.push(file);
            }
            FileKind::StationExport {
                station,
                satellite_count,
            } => {
                let constellation = registry.resolve_count(satellite_count, &file)?;
                let passes = load_station_export(path, &file, &constellation, &station)?;
                info!(
                    "{}: {} station passes ({} / {})",
                    file,
                    passes.len(),
                    constellation,
                    station
                );
                dataset.station_passes.extend(passes);
                dataset.files.push(file);
            }
            FileKind::OtherAccess => {
                info!("skipping {} (no per-constellation access data)", file);
            }
            FileKind::FlatTable => {
                let windows = load_flat_table(path, &file, &mut registry)?;
                info!("{}: {} access windows (flat table)", file, windows.len());
                dataset.windows.extend(windows);
                dataset.files.push(file);
            }
        }
    }

    dataset.constellations = registry.by_name;
    Ok(dataset)
}
