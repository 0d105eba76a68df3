//! Scenario configuration document
//!
//! Declares the analysis horizon, the constellation configurations, the
//! declared targets (enforced against the loaded data), the downlink
//! stations, and the detection-order sampling policy. Loaded from JSON;
//! the built-in default mirrors the original 24-hour Walker study.

use crate::{ReportError, Result};
use access_windows::{ConstellationConfig, Horizon, TargetKind};
use chrono::{DateTime, Duration, TimeZone, Utc};
use coverage_metrics::DetectionPolicy;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub horizon: HorizonSpec,
    pub constellations: Vec<ConstellationConfig>,
    pub targets: Vec<TargetSpec>,
    pub stations: Vec<String>,
    pub detection: DetectionSpec,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HorizonSpec {
    pub start: DateTime<Utc>,
    pub duration_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSpec {
    pub name: String,
    pub kind: TargetKind,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DetectionSpec {
    pub policy: DetectionPolicyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_min: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionPolicyKind {
    HorizonStart,
    Periodic,
}

impl Default for Scenario {
    /// The original study: three Walker configurations over five Indian
    /// ports, three transiting ships and two EEZ regions, 24 h horizon,
    /// two downlink stations
    fn default() -> Self {
        let ports = ["Mumbai", "Chennai", "Kochi", "Kandla", "Visakhapatnam"];
        let ships = ["Ship1", "Ship2", "Ship3"];
        let eez = ["East", "West"];

        let mut targets = Vec::new();
        targets.extend(ports.iter().map(|name| TargetSpec {
            name: name.to_string(),
            kind: TargetKind::Port,
        }));
        targets.extend(ships.iter().map(|name| TargetSpec {
            name: name.to_string(),
            kind: TargetKind::Ship,
        }));
        targets.extend(eez.iter().map(|name| TargetSpec {
            name: name.to_string(),
            kind: TargetKind::EezRegion,
        }));

        Self {
            name: "walker-maritime-24h".to_string(),
            horizon: HorizonSpec {
                start: Utc
                    .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
                    .single()
                    .unwrap_or_default(),
                duration_hours: 24.0,
            },
            constellations: [6, 12, 32]
                .into_iter()
                .map(ConstellationConfig::from_count)
                .collect(),
            targets,
            stations: vec!["Ahmedabad".to_string(), "Sriharikota".to_string()],
            detection: DetectionSpec {
                policy: DetectionPolicyKind::HorizonStart,
                interval_min: None,
            },
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let scenario: Scenario = serde_json::from_reader(reader)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon.duration_hours <= 0.0 {
            return Err(ReportError::Scenario(format!(
                "horizon duration must be positive, got {} h",
                self.horizon.duration_hours
            )));
        }
        if self.detection.policy == DetectionPolicyKind::Periodic
            && !self.detection.interval_min.is_some_and(|i| i > 0.0)
        {
            return Err(ReportError::Scenario(
                "periodic detection policy requires a positive interval_min".to_string(),
            ));
        }
        Ok(())
    }

    pub fn horizon(&self) -> Result<Horizon> {
        let duration = Duration::seconds((self.horizon.duration_hours * 3600.0) as i64);
        Horizon::new(self.horizon.start, self.horizon.start + duration)
            .map_err(|e| ReportError::Scenario(e.to_string()))
    }

    pub fn detection_policy(&self) -> DetectionPolicy {
        match self.detection.policy {
            DetectionPolicyKind::HorizonStart => DetectionPolicy::HorizonStart,
            DetectionPolicyKind::Periodic => DetectionPolicy::Periodic {
                // validate() guarantees the interval is present and positive
                interval_secs: self.detection.interval_min.unwrap_or(60.0) * 60.0,
            },
        }
    }
}
