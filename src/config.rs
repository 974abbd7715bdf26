use crate::error::EngineError;
use crate::global_variables::{
    DEFAULT_CHART_PATH, DEFAULT_CSV_PATH, DEFAULT_JSON_PATH, DEFAULT_REFRESH_INTERVAL_SECS,
    DEFAULT_REPORT_CSV_PATH, ENV_PROFILE, ENV_REFRESH_SECS, ENV_SEED,
};
use crate::shared_data::LaneId;
use crate::simulation_engine::profiles::{Profile, ProfileKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Session settings for one run of the engine.
///
/// Built once at startup and handed to the components that need it; nothing
/// reads configuration from anywhere else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub profile: ProfileKind,
    /// Overrides the preset's lane list. Order is the tie-break order.
    pub lanes: Option<Vec<String>>,
    pub refresh_interval_secs: f64,
    pub seed: Option<u64>,
    /// Switches the preset's score jitter off when false.
    pub jitter: bool,
    pub csv_path: PathBuf,
    pub report_csv_path: PathBuf,
    pub json_path: PathBuf,
    pub chart_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profile: ProfileKind::default(),
            lanes: None,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            seed: None,
            jitter: true,
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            report_csv_path: PathBuf::from(DEFAULT_REPORT_CSV_PATH),
            json_path: PathBuf::from(DEFAULT_JSON_PATH),
            chart_path: PathBuf::from(DEFAULT_CHART_PATH),
        }
    }
}

impl EngineConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, EngineError> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    /// Reads the optional JSON file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, EngineError> {
        let config = match path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up through `lookup` (the environment in production).
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, EngineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(profile) = lookup(ENV_PROFILE) {
            self.profile = profile.parse()?;
        }
        if let Some(seed) = lookup(ENV_SEED) {
            let seed = seed
                .trim()
                .parse::<u64>()
                .map_err(|e| EngineError::invalid(format!("{} is not a u64: {}", ENV_SEED, e)))?;
            self.seed = Some(seed);
        }
        if let Some(secs) = lookup(ENV_REFRESH_SECS) {
            self.refresh_interval_secs = secs.trim().parse::<f64>().map_err(|e| {
                EngineError::invalid(format!("{} is not a number: {}", ENV_REFRESH_SECS, e))
            })?;
        }
        Ok(self)
    }

    /// Preset selected by `profile`, with jitter removed if disabled.
    pub fn resolved_profile(&self) -> Profile {
        let profile = self.profile.profile();
        if self.jitter {
            profile
        } else {
            profile.without_jitter()
        }
    }

    /// Configured lanes, falling back to the preset's lanes.
    pub fn lanes(&self) -> Vec<LaneId> {
        match &self.lanes {
            Some(lanes) => lanes.iter().map(|name| LaneId::new(name.trim())).collect(),
            None => self.profile.profile().lanes,
        }
    }

    /// Interval between live cycles. Rejects values that are not a positive,
    /// representable duration.
    pub fn refresh_interval(&self) -> Result<Duration, EngineError> {
        let secs = self.refresh_interval_secs;
        let interval = Duration::try_from_secs_f64(secs)
            .map_err(|e| EngineError::invalid(format!("refresh interval {} is out of range: {}", secs, e)))?;
        if interval.is_zero() {
            return Err(EngineError::invalid(format!(
                "refresh interval must be positive, got {}",
                secs
            )));
        }
        Ok(interval)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.refresh_interval()?;
        validate_lanes(&self.lanes())?;
        self.resolved_profile().validate()
    }
}

pub fn validate_lanes(lanes: &[LaneId]) -> Result<(), EngineError> {
    if lanes.is_empty() {
        return Err(EngineError::invalid("at least one lane is required"));
    }
    let mut seen = HashSet::new();
    for lane in lanes {
        if lane.as_str().is_empty() {
            return Err(EngineError::invalid("lane names must not be blank"));
        }
        if !seen.insert(lane) {
            return Err(EngineError::invalid(format!("lane {} is listed twice", lane)));
        }
    }
    Ok(())
}
