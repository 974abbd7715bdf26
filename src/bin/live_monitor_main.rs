use lane_signal_engine::config::EngineConfig;
use lane_signal_engine::monitoring::cli::run_live_monitor;
use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let result = match EngineConfig::load(config_path.as_deref()) {
        Ok(config) => run_live_monitor(&config).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Monitor error: {}", e);
            ExitCode::FAILURE
        }
    }
}
