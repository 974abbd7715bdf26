// src/shared_data.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stable identifier of a lane, e.g. `Lane_1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaneId(pub String);

impl LaneId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LaneId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Traffic-participant classes counted per lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrafficClass {
    Car,
    Truck,
    Pedestrian,
    Bicycle,
    Motorcycle,
    Bus,
}

impl TrafficClass {
    /// Column label used in exported tables.
    pub fn label(&self) -> &'static str {
        match self {
            TrafficClass::Car => "Cars",
            TrafficClass::Truck => "Trucks",
            TrafficClass::Pedestrian => "People",
            TrafficClass::Bicycle => "Bicycles",
            TrafficClass::Motorcycle => "Motorcycles",
            TrafficClass::Bus => "Buses",
        }
    }

    pub fn is_vehicle(&self) -> bool {
        !matches!(self, TrafficClass::Pedestrian)
    }
}

impl fmt::Display for TrafficClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw counts observed on one lane during one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneReading {
    pub lane: LaneId,
    pub counts: BTreeMap<TrafficClass, u32>,
}

impl LaneReading {
    pub fn new(lane: LaneId) -> Self {
        Self {
            lane,
            counts: BTreeMap::new(),
        }
    }

    /// Builder-style helper, mostly handy when composing readings by hand.
    pub fn with_count(mut self, class: TrafficClass, count: u32) -> Self {
        self.counts.insert(class, count);
        self
    }

    /// Count for `class`; classes the reading does not carry count as zero.
    pub fn count(&self, class: TrafficClass) -> u32 {
        self.counts.get(&class).copied().unwrap_or(0)
    }

    /// Sum of every vehicle class. Pedestrians are not vehicles.
    pub fn total_vehicles(&self) -> u32 {
        self.counts
            .iter()
            .filter(|(class, _)| class.is_vehicle())
            .map(|(_, &count)| count)
            .sum()
    }
}

/// Weighted congestion score of a lane. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DensityScore(f64);

impl DensityScore {
    /// Clamps negative and NaN input to zero.
    pub fn new(value: f64) -> Self {
        if value.is_nan() || value < 0.0 {
            Self(0.0)
        } else {
            Self(value)
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// One-decimal value shown in tables and on the console.
    pub fn rounded(&self) -> f64 {
        (self.0 * 10.0).round() / 10.0
    }
}

impl fmt::Display for DensityScore {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// The 3-state priority scheme handed to each lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalState {
    Green,
    Orange,
    Red,
}

impl SignalState {
    pub fn label(&self) -> &'static str {
        match self {
            SignalState::Green => "GREEN",
            SignalState::Orange => "ORANGE",
            SignalState::Red => "RED",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "GREEN" => Some(SignalState::Green),
            "ORANGE" => Some(SignalState::Orange),
            "RED" => Some(SignalState::Red),
            _ => None,
        }
    }
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything the engine derived for one lane in one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneStatus {
    pub reading: LaneReading,
    /// Deterministic weighted sum, before any jitter.
    pub weighted_sum: DensityScore,
    /// 1.0 when jitter is disabled.
    pub jitter_factor: f64,
    pub score: DensityScore,
    pub signal: SignalState,
}

/// Result of one generate-score-allocate pass.
///
/// Built only by the cycle reporter and handed out by value; consumers get
/// read access through the accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub(crate) cycle: u64,
    pub(crate) profile: String,
    pub(crate) captured_at: NaiveDateTime,
    pub(crate) classes: Vec<TrafficClass>,
    pub(crate) lanes: Vec<LaneStatus>,
}

impl Snapshot {
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn captured_at(&self) -> NaiveDateTime {
        self.captured_at
    }

    pub fn classes(&self) -> &[TrafficClass] {
        &self.classes
    }

    /// Lanes in canonical order.
    pub fn lanes(&self) -> &[LaneStatus] {
        &self.lanes
    }

    pub fn lane(&self, lane: &LaneId) -> Option<&LaneStatus> {
        self.lanes.iter().find(|status| &status.reading.lane == lane)
    }

    pub fn signal_of(&self, lane: &LaneId) -> Option<SignalState> {
        self.lane(lane).map(|status| status.signal)
    }

    /// Lane currently holding GREEN, if any lane exists.
    pub fn green_lane(&self) -> Option<&LaneId> {
        self.lanes
            .iter()
            .find(|status| status.signal == SignalState::Green)
            .map(|status| &status.reading.lane)
    }

    /// Column names matching [`SnapshotRow::to_record`].
    pub fn header(&self) -> Vec<String> {
        let mut header = vec!["Date".to_string(), "Time".to_string(), "Lane".to_string()];
        header.extend(self.classes.iter().map(|class| class.label().to_string()));
        header.push("Total_Vehicles".to_string());
        header.push("Traffic_Density".to_string());
        header.push("Signal_Status".to_string());
        header
    }

    /// Presentation rows, one per lane, in canonical order.
    pub fn rows(&self) -> Vec<SnapshotRow> {
        let date = self.captured_at.format("%Y-%m-%d").to_string();
        let time = self.captured_at.format("%H:%M:%S").to_string();
        self.lanes
            .iter()
            .map(|status| SnapshotRow {
                date: date.clone(),
                time: time.clone(),
                lane: status.reading.lane.clone(),
                counts: self
                    .classes
                    .iter()
                    .map(|&class| (class, status.reading.count(class)))
                    .collect(),
                total_vehicles: status.reading.total_vehicles(),
                traffic_density: status.score.rounded(),
                signal: status.signal,
            })
            .collect()
    }
}

/// Flat, display-ready view of one lane of a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    pub date: String,
    pub time: String,
    pub lane: LaneId,
    pub counts: Vec<(TrafficClass, u32)>,
    pub total_vehicles: u32,
    pub traffic_density: f64,
    pub signal: SignalState,
}

impl SnapshotRow {
    pub fn to_record(&self) -> Vec<String> {
        let mut record = vec![self.date.clone(), self.time.clone(), self.lane.to_string()];
        record.extend(self.counts.iter().map(|(_, count)| count.to_string()));
        record.push(self.total_vehicles.to_string());
        record.push(format!("{:.1}", self.traffic_density));
        record.push(self.signal.label().to_string());
        record
    }
}
