// simulation_engine/profiles.rs
use crate::error::EngineError;
use crate::flow_analyzer::density_scorer::WeightTable;
use crate::global_variables::{
    BASIC_RANGES, BASIC_WEIGHTS, EVENING_RUSH, EXTENDED_JITTER, EXTENDED_RANGES,
    EXTENDED_WEIGHTS, MORNING_RUSH,
};
use crate::shared_data::{LaneId, TrafficClass};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Named presets selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// Three lanes, cars/trucks/pedestrians, no rush hours, no jitter.
    Basic,
    /// Four lanes, six classes, rush-hour scaling and per-lane jitter.
    #[default]
    Extended,
}

impl ProfileKind {
    pub fn profile(&self) -> Profile {
        match self {
            ProfileKind::Basic => Profile::basic(),
            ProfileKind::Extended => Profile::extended(),
        }
    }
}

impl FromStr for ProfileKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(ProfileKind::Basic),
            "extended" => Ok(ProfileKind::Extended),
            other => Err(EngineError::invalid(format!("unknown profile '{}'", other))),
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProfileKind::Basic => f.write_str("basic"),
            ProfileKind::Extended => f.write_str("extended"),
        }
    }
}

/// Inclusive range a class count is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountRange {
    pub class: TrafficClass,
    pub min: u32,
    pub max: u32,
}

/// Hours `start_hour..=end_hour` during which counts are scaled by `multiplier`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RushWindow {
    pub start_hour: u32,
    pub end_hour: u32,
    pub multiplier: f64,
}

impl RushWindow {
    pub fn contains(&self, hour: u32) -> bool {
        (self.start_hour..=self.end_hour).contains(&hour)
    }

    fn overlaps(&self, other: &RushWindow) -> bool {
        self.start_hour <= other.end_hour && other.start_hour <= self.end_hour
    }
}

/// Bounds of the multiplicative variance applied after scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JitterBand {
    pub low: f64,
    pub high: f64,
}

impl JitterBand {
    pub fn clamp(&self, factor: f64) -> f64 {
        factor.clamp(self.low, self.high)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub lanes: Vec<LaneId>,
    pub ranges: Vec<CountRange>,
    pub weights: WeightTable,
    pub rush_windows: Vec<RushWindow>,
    pub jitter: Option<JitterBand>,
}

impl Profile {
    /// A profile with no rush hours and no jitter.
    pub fn new(
        name: impl Into<String>,
        lanes: Vec<LaneId>,
        ranges: Vec<CountRange>,
        weights: WeightTable,
    ) -> Self {
        Self {
            name: name.into(),
            lanes,
            ranges,
            weights,
            rush_windows: Vec::new(),
            jitter: None,
        }
    }

    pub fn with_rush_windows(mut self, windows: Vec<RushWindow>) -> Self {
        self.rush_windows = windows;
        self
    }

    pub fn with_jitter(mut self, band: JitterBand) -> Self {
        self.jitter = Some(band);
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = None;
        self
    }

    pub fn basic() -> Self {
        Profile::new(
            ProfileKind::Basic.to_string(),
            numbered_lanes("lane", 3),
            BASIC_RANGES
                .iter()
                .map(|&(class, min, max)| CountRange { class, min, max })
                .collect(),
            WeightTable::from_pairs(&BASIC_WEIGHTS),
        )
    }

    pub fn extended() -> Self {
        let rush = [MORNING_RUSH, EVENING_RUSH]
            .iter()
            .map(|&(start_hour, end_hour, multiplier)| RushWindow {
                start_hour,
                end_hour,
                multiplier,
            })
            .collect();
        Profile::new(
            ProfileKind::Extended.to_string(),
            numbered_lanes("Lane", 4),
            EXTENDED_RANGES
                .iter()
                .map(|&(class, min, max)| CountRange { class, min, max })
                .collect(),
            WeightTable::from_pairs(&EXTENDED_WEIGHTS),
        )
        .with_rush_windows(rush)
        .with_jitter(JitterBand {
            low: EXTENDED_JITTER.0,
            high: EXTENDED_JITTER.1,
        })
    }

    pub fn classes(&self) -> Vec<TrafficClass> {
        self.ranges.iter().map(|range| range.class).collect()
    }

    /// Count multiplier in effect at `hour`; 1.0 outside every rush window.
    pub fn multiplier_at(&self, hour: u32) -> f64 {
        self.rush_windows
            .iter()
            .find(|window| window.contains(hour))
            .map(|window| window.multiplier)
            .unwrap_or(1.0)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.ranges.is_empty() {
            return Err(EngineError::invalid(format!(
                "profile '{}' defines no traffic classes",
                self.name
            )));
        }
        let mut seen = HashSet::new();
        for range in &self.ranges {
            if !seen.insert(range.class) {
                return Err(EngineError::invalid(format!(
                    "class {} appears twice in profile '{}'",
                    range.class, self.name
                )));
            }
            if range.min > range.max {
                return Err(EngineError::invalid(format!(
                    "range for {} is inverted ({} > {})",
                    range.class, range.min, range.max
                )));
            }
        }
        self.weights.validate()?;

        for (i, window) in self.rush_windows.iter().enumerate() {
            if window.start_hour > window.end_hour || window.end_hour > 23 {
                return Err(EngineError::invalid(format!(
                    "rush window {}..={} is not a valid hour range",
                    window.start_hour, window.end_hour
                )));
            }
            if !window.multiplier.is_finite() || window.multiplier <= 0.0 {
                return Err(EngineError::invalid(format!(
                    "rush multiplier must be positive, got {}",
                    window.multiplier
                )));
            }
            if self.rush_windows[i + 1..].iter().any(|w| w.overlaps(window)) {
                return Err(EngineError::invalid("rush windows overlap"));
            }
        }

        if let Some(band) = self.jitter {
            if !band.low.is_finite() || !band.high.is_finite() || band.low < 0.0 || band.low > band.high {
                return Err(EngineError::invalid(format!(
                    "jitter band {}..={} is invalid",
                    band.low, band.high
                )));
            }
        }
        Ok(())
    }
}

fn numbered_lanes(prefix: &str, count: usize) -> Vec<LaneId> {
    (1..=count)
        .map(|i| LaneId::new(format!("{}_{}", prefix, i)))
        .collect()
}
