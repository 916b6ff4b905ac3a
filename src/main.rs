use std::process::ExitCode;

use clap::Parser;
use grid_viewer::{ViewerConfig, config::Args, session};

fn main() -> ExitCode {
    if let Err(e) = env_logger::try_init() {
        eprintln!("Warning: Could not initialize logger: {}", e);
    }

    let config = ViewerConfig::from(Args::parse());
    match session::run(&config) {
        Ok(outcome) => ExitCode::from(outcome.exit_status(config.strict)),
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
