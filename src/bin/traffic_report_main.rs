use lane_signal_engine::config::EngineConfig;
use lane_signal_engine::monitoring::cli::generate_report;
use lane_signal_engine::monitoring::sinks::{ConsoleSink, SnapshotSink};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    println!("Generating traffic data...");

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let report = EngineConfig::load(config_path.as_deref()).and_then(|config| {
        let report = generate_report(&config)?;
        report.print_locations(&config);
        Ok(report)
    });
    match report {
        Ok(report) => {
            if let Err(e) = ConsoleSink::stdout().deliver(&report.snapshot) {
                eprintln!("{}", e);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Report error: {}", e);
            ExitCode::FAILURE
        }
    }
}
