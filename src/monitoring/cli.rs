use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::monitoring::charts::ChartSink;
use crate::monitoring::cycle_reporter::{ClockSource, CycleReporter, SystemClock};
use crate::monitoring::history::summarize_csv;
use crate::monitoring::sinks::{ConsoleSink, CsvSink, FanOutSink, JsonLinesSink, SnapshotSink};
use crate::shared_data::Snapshot;
use std::io::{stdin, stdout, Write};
use tokio::sync::watch;

/// Outcome of [`generate_report`]. The table is always written; the chart may not be.
#[derive(Debug)]
pub struct Report {
    pub snapshot: Snapshot,
    pub chart_error: Option<EngineError>,
}

impl Report {
    pub fn chart_written(&self) -> bool {
        self.chart_error.is_none()
    }

    /// Prints where the artefacts went.
    pub fn print_locations(&self, config: &EngineConfig) {
        println!("Table saved as: {}", config.report_csv_path.display());
        match &self.chart_error {
            None => println!("Chart saved as: {}", config.chart_path.display()),
            Some(e) => println!("Chart not saved: {}", e),
        }
    }
}

/// On-demand report: one cycle written to the report CSV and the chart PNG.
///
/// A chart failure does not fail the report; it is returned in [`Report::chart_error`].
pub fn generate_report(config: &EngineConfig) -> Result<Report, EngineError> {
    let mut reporter = CycleReporter::new(config)?;
    let snapshot = reporter.run_once(SystemClock.now())?;

    CsvSink::overwrite(&config.report_csv_path).deliver(&snapshot)?;
    let chart_error = ChartSink::new(&config.chart_path).deliver(&snapshot).err();
    if let Some(e) = &chart_error {
        log::warn!("{}", e);
    }
    log::info!(
        "Report for cycle {} written to {}",
        snapshot.cycle(),
        config.report_csv_path.display()
    );
    Ok(Report {
        snapshot,
        chart_error,
    })
}

/// Console + CSV log + JSON lines sinks used by the live monitor.
pub fn live_sinks(config: &EngineConfig) -> FanOutSink {
    FanOutSink::new()
        .with(ConsoleSink::stdout())
        .with(CsvSink::append(&config.csv_path))
        .with(JsonLinesSink::new(&config.json_path))
}

/// Runs the live monitor until Ctrl+C. Returns the number of cycles run.
pub async fn run_live_monitor(config: &EngineConfig) -> Result<u64, EngineError> {
    let mut reporter = CycleReporter::new(config)?;
    let mut sink = live_sinks(config);
    let (stop_tx, stop_rx) = watch::channel(false);

    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(true);
        }
    });

    println!("Traffic Signal Control System");
    println!("Press Ctrl+C to stop");
    let cycles = reporter.run_forever(&SystemClock, &mut sink, stop_rx).await;
    ctrl_c.abort();
    println!("\nMonitor stopped after {} cycles", cycles);
    Ok(cycles)
}

pub fn show_history(config: &EngineConfig) -> Result<(), EngineError> {
    let summary = summarize_csv(&config.csv_path)?;
    summary.print();
    Ok(())
}

fn prompt(message: &str) -> Option<String> {
    print!("{}", message);
    stdout().flush().ok()?;
    let mut input = String::new();
    match stdin().read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input.trim().to_string()),
    }
}

/// Menu-driven admin front end.
pub async fn run_cli(config: EngineConfig) {
    loop {
        println!("\nLane Signal Engine Admin CLI");
        println!("1. Generate Traffic Report");
        println!("2. Start Live Monitor");
        println!("3. Show Monitor History");
        println!("4. Exit");
        let Some(input) = prompt("Enter your choice: ") else {
            break;
        };
        match input.parse::<u32>().unwrap_or(0) {
            1 => match generate_report(&config) {
                Ok(report) => {
                    println!("\nTraffic data has been generated successfully!");
                    report.print_locations(&config);
                    if let Some(lane) = report.snapshot.green_lane() {
                        println!("Green signal: {}", lane);
                    }
                }
                Err(e) => eprintln!("Error generating traffic report: {}", e),
            },
            2 => {
                if let Err(e) = run_live_monitor(&config).await {
                    eprintln!("Error starting live monitor: {}", e);
                }
            }
            3 => {
                if let Err(e) = show_history(&config) {
                    eprintln!("Error reading monitor history: {}", e);
                }
            }
            4 => {
                println!("Exiting CLI.");
                break;
            }
            _ => println!("Invalid choice. Try again."),
        }
    }
}
