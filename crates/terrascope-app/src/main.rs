//! Binary entry point: CLI, config, logging, then the event loop.

use clap::Parser;
use terrascope_config::{CliArgs, Config, default_config_dir};

fn main() {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(default_config_dir)
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", config_dir.display());
            eprintln!("Continuing with defaults");
            Config::default()
        }
    };
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    terrascope_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    terrascope_app::run_with_config(config);
}
