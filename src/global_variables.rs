use crate::shared_data::TrafficClass;

// Refresh interval used when neither the config file nor the environment sets one.
pub const DEFAULT_REFRESH_INTERVAL_SECS: f64 = 3.0;

// Export locations
pub const DEFAULT_CSV_PATH: &str = "traffic_data.csv";
pub const DEFAULT_REPORT_CSV_PATH: &str = "traffic_report.csv";
pub const DEFAULT_JSON_PATH: &str = "traffic_snapshots.jsonl";
pub const DEFAULT_CHART_PATH: &str = "traffic_distribution.png";

// Environment overrides
pub const ENV_PROFILE: &str = "TRAFFIC_PROFILE";
pub const ENV_SEED: &str = "TRAFFIC_SEED";
pub const ENV_REFRESH_SECS: &str = "TRAFFIC_REFRESH_SECS";

// Weight tables. Heavier classes take more road space and count for more.
pub const BASIC_WEIGHTS: [(TrafficClass, f64); 3] = [
    (TrafficClass::Car, 1.0),
    (TrafficClass::Truck, 2.0),
    (TrafficClass::Pedestrian, 0.5),
];

pub const EXTENDED_WEIGHTS: [(TrafficClass, f64); 6] = [
    (TrafficClass::Car, 1.0),
    (TrafficClass::Truck, 2.5),
    (TrafficClass::Pedestrian, 0.3),
    (TrafficClass::Bicycle, 0.5),
    (TrafficClass::Motorcycle, 0.7),
    (TrafficClass::Bus, 3.0),
];

// Inclusive count ranges drawn per lane and cycle.
pub const BASIC_RANGES: [(TrafficClass, u32, u32); 3] = [
    (TrafficClass::Car, 0, 10),
    (TrafficClass::Truck, 0, 5),
    (TrafficClass::Pedestrian, 0, 15),
];

pub const EXTENDED_RANGES: [(TrafficClass, u32, u32); 6] = [
    (TrafficClass::Car, 10, 30),
    (TrafficClass::Truck, 3, 12),
    (TrafficClass::Pedestrian, 5, 25),
    (TrafficClass::Bicycle, 2, 15),
    (TrafficClass::Motorcycle, 3, 18),
    (TrafficClass::Bus, 1, 8),
];

// Rush hours, inclusive hour bounds.
pub const MORNING_RUSH: (u32, u32, f64) = (7, 10, 1.5);
pub const EVENING_RUSH: (u32, u32, f64) = (16, 19, 1.8);

// Per-lane variance applied on top of the weighted sum in the extended preset.
pub const EXTENDED_JITTER: (f64, f64) = (0.8, 1.2);
