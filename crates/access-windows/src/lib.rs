//! Satellite Access Window Data Model
//!
//! Typed access windows, target and sensor enumerations, constellation
//! configuration, and the interval algebra the metric calculators run on.
//! Everything here is a read-only derived value: windows are validated on
//! construction (`start < end`) and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod interval;

pub use interval::Interval;

#[derive(Error, Debug)]
pub enum AccessError {
    #[error("invalid interval: start {start} is not before end {end}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("unknown target kind: {0:?}")]
    UnknownTargetKind(String),
    #[error("unknown sensor type: {0:?}")]
    UnknownSensor(String),
}

pub type Result<T> = std::result::Result<T, AccessError>;

/// Target classification for surveillance metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Port,
    Ship,
    EezRegion,
}

impl TargetKind {
    /// Parse from input-table or scenario spelling
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "port" | "Port" => Ok(TargetKind::Port),
            "ship" | "Ship" => Ok(TargetKind::Ship),
            "eez_region" | "eez" | "EEZ" => Ok(TargetKind::EezRegion),
            other => Err(AccessError::UnknownTargetKind(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Port => "port",
            TargetKind::Ship => "ship",
            TargetKind::EezRegion => "eez_region",
        }
    }
}

/// Imaging sensor carried by the constellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SensorType {
    #[serde(rename = "SAR")]
    Sar,
    Optical,
}

impl SensorType {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "SAR" | "sar" | "Sar" => Ok(SensorType::Sar),
            "Optical" | "optical" | "OPTICAL" => Ok(SensorType::Optical),
            other => Err(AccessError::UnknownSensor(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorType::Sar => "SAR",
            SensorType::Optical => "Optical",
        }
    }
}

/// A surveillance target (port, transiting ship, or EEZ region)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub kind: TargetKind,
}

impl Target {
    pub fn new(name: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A single simulated line-of-sight visibility interval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessWindow {
    pub satellite_id: String,
    pub target: Target,
    pub sensor: SensorType,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Absent in raw STK exports, present in normalized flat tables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_elevation_deg: Option<f64>,
}

impl AccessWindow {
    pub fn new(
        satellite_id: String,
        target: Target,
        sensor: SensorType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        max_elevation_deg: Option<f64>,
    ) -> Result<Self> {
        if start >= end {
            return Err(AccessError::InvalidInterval { start, end });
        }
        Ok(Self {
            satellite_id,
            target,
            sensor,
            start,
            end,
            max_elevation_deg,
        })
    }

    pub fn interval(&self) -> Interval {
        Interval::new(to_unix_secs(self.start), to_unix_secs(self.end))
    }

    pub fn duration_secs(&self) -> f64 {
        self.interval().duration()
    }
}

/// A downlink visibility window between one satellite and a ground station
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationPass {
    pub constellation: String,
    pub station: String,
    pub satellite_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl StationPass {
    pub fn new(
        constellation: String,
        station: String,
        satellite_id: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self> {
        if start >= end {
            return Err(AccessError::InvalidInterval { start, end });
        }
        Ok(Self {
            constellation,
            station,
            satellite_id,
            start,
            end,
        })
    }

    pub fn interval(&self) -> Interval {
        Interval::new(to_unix_secs(self.start), to_unix_secs(self.end))
    }
}

/// An externally defined constellation configuration (input label only;
/// no geometry is computed here)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstellationConfig {
    pub name: String,
    pub satellite_count: u32,
}

impl ConstellationConfig {
    /// Default naming for configurations registered on first sight
    pub fn from_count(satellite_count: u32) -> Self {
        Self {
            name: format!("{}-sat", satellite_count),
            satellite_count,
        }
    }
}

/// The analysis horizon all metrics are computed against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Horizon {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Horizon {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(AccessError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn as_interval(&self) -> Interval {
        Interval::new(to_unix_secs(self.start), to_unix_secs(self.end))
    }

    pub fn duration_secs(&self) -> f64 {
        self.as_interval().duration()
    }
}

/// Unix seconds with sub-second precision preserved
fn to_unix_secs(t: DateTime<Utc>) -> f64 {
    t.timestamp_millis() as f64 / 1000.0
}
