use crate::error::EngineError;
use crate::shared_data::{LaneId, SignalState};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

/// Per-lane totals over an exported table.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneHistory {
    pub lane: LaneId,
    pub samples: usize,
    pub green_count: usize,
    pub orange_count: usize,
    pub mean_density: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
    pub rows: usize,
    pub cycles: usize,
    pub lanes: Vec<LaneHistory>,
}

impl HistorySummary {
    pub fn lane(&self, lane: &LaneId) -> Option<&LaneHistory> {
        self.lanes.iter().find(|history| &history.lane == lane)
    }

    pub fn print(&self) {
        println!("Report Summary:");
        println!("Rows: {} ({} cycles)", self.rows, self.cycles);
        for lane in &self.lanes {
            println!(
                "{}: green {} / orange {} of {} cycles, mean density {:.1}",
                lane.lane, lane.green_count, lane.orange_count, lane.samples, lane.mean_density
            );
        }
    }
}

fn column(headers: &csv::StringRecord, name: &str) -> Result<usize, EngineError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| EngineError::MalformedTable(format!("no '{}' column", name)))
}

/// Reads a table written by the CSV sink and totals it per lane.
pub fn summarize_csv(path: &Path) -> Result<HistorySummary, EngineError> {
    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);
    let headers = rdr.headers()?.clone();
    let date_idx = column(&headers, "Date")?;
    let time_idx = column(&headers, "Time")?;
    let lane_idx = column(&headers, "Lane")?;
    let density_idx = column(&headers, "Traffic_Density")?;
    let signal_idx = column(&headers, "Signal_Status")?;

    let mut rows = 0;
    let mut cycles = HashSet::new();
    let mut lanes: Vec<(LaneHistory, f64)> = Vec::new();

    for result in rdr.records() {
        let record = result?;
        let field = |idx: usize| record.get(idx).unwrap_or_default();
        rows += 1;
        let line = record.position().map_or(rows + 1, |pos| pos.line() as usize);

        let density = field(density_idx)
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite() && *d >= 0.0)
            .ok_or_else(|| {
                EngineError::MalformedTable(format!(
                    "line {}: Traffic_Density '{}' is not a density",
                    line,
                    field(density_idx)
                ))
            })?;
        let signal = SignalState::from_label(field(signal_idx)).ok_or_else(|| {
            EngineError::MalformedTable(format!(
                "line {}: unknown Signal_Status '{}'",
                line,
                field(signal_idx)
            ))
        })?;
        cycles.insert((field(date_idx).to_string(), field(time_idx).to_string()));
        let lane = LaneId::new(field(lane_idx));

        let slot = match lanes.iter().position(|(h, _)| h.lane == lane) {
            Some(i) => i,
            None => {
                lanes.push((
                    LaneHistory {
                        lane,
                        samples: 0,
                        green_count: 0,
                        orange_count: 0,
                        mean_density: 0.0,
                    },
                    0.0,
                ));
                lanes.len() - 1
            }
        };
        let (history, density_sum) = &mut lanes[slot];
        history.samples += 1;
        *density_sum += density;
        match signal {
            SignalState::Green => history.green_count += 1,
            SignalState::Orange => history.orange_count += 1,
            SignalState::Red => {}
        }
    }

    let lanes = lanes
        .into_iter()
        .map(|(mut history, density_sum)| {
            if history.samples > 0 {
                history.mean_density = density_sum / history.samples as f64;
            }
            history
        })
        .collect();

    Ok(HistorySummary {
        rows,
        cycles: cycles.len(),
        lanes,
    })
}
