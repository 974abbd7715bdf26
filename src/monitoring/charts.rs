use crate::error::EngineError;
use crate::monitoring::sinks::SnapshotSink;
use crate::shared_data::{LaneStatus, SignalState, Snapshot, TrafficClass};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

const PANEL_COLUMNS: usize = 2;
const PANEL_WIDTH: u32 = 480;
const PANEL_HEIGHT: u32 = 360;

/// Renders one bar chart per lane (class counts) into a PNG file.
pub struct ChartSink {
    path: PathBuf,
}

impl ChartSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotSink for ChartSink {
    fn name(&self) -> &str {
        "chart"
    }

    fn deliver(&mut self, snapshot: &Snapshot) -> Result<(), EngineError> {
        render_lane_distribution(snapshot, &self.path)
            .map_err(|e| EngineError::sink(format!("chart:{}", self.path.display()), e))
    }
}

/// Grid layout (rows, columns) for `lanes` panels.
pub fn panel_grid(lanes: usize) -> (usize, usize) {
    if lanes == 0 {
        return (1, 1);
    }
    let cols = lanes.min(PANEL_COLUMNS);
    (lanes.div_ceil(cols), cols)
}

fn signal_color(signal: SignalState) -> RGBColor {
    match signal {
        SignalState::Green => RGBColor(0x90, 0xEE, 0x90),
        SignalState::Orange => RGBColor(0xFF, 0xA5, 0x00),
        SignalState::Red => RGBColor(0xFF, 0x6B, 0x6B),
    }
}

pub fn render_lane_distribution(snapshot: &Snapshot, path: &Path) -> Result<(), String> {
    let (rows, cols) = panel_grid(snapshot.lanes().len());
    let size = (PANEL_WIDTH * cols as u32, PANEL_HEIGHT * rows as u32);
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;

    let panels = root.split_evenly((rows, cols));
    for (lane, panel) in snapshot.lanes().iter().zip(panels.iter()) {
        draw_lane_panel(panel, lane, snapshot.classes())?;
    }

    root.present().map_err(|e| e.to_string())?;
    log::info!("Lane distribution chart saved to {}", path.display());
    Ok(())
}

fn draw_lane_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    lane: &LaneStatus,
    classes: &[TrafficClass],
) -> Result<(), String> {
    let counts: Vec<u32> = classes.iter().map(|c| lane.reading.count(*c)).collect();
    let y_max = counts.iter().copied().max().unwrap_or(0).max(1) + 1;
    let labels: Vec<&str> = classes.iter().map(|c| c.label()).collect();

    area.fill(&signal_color(lane.signal).mix(0.15))
        .map_err(|e| e.to_string())?;

    let mut chart = ChartBuilder::on(area)
        .caption(
            format!("{} Traffic Distribution ({})", lane.reading.lane, lane.signal),
            ("sans-serif", 18),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d((0..classes.len()).into_segmented(), 0u32..y_max)
        .map_err(|e| e.to_string())?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Count")
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(i) => labels.get(*i).map(|l| l.to_string()).unwrap_or_default(),
            _ => String::new(),
        })
        .draw()
        .map_err(|e| e.to_string())?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(RGBColor(0x87, 0xCE, 0xEB).filled())
                .margin(8)
                .data(counts.iter().enumerate().map(|(i, &count)| (i, count))),
        )
        .map_err(|e| e.to_string())?;

    Ok(())
}
