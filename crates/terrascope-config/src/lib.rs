//! Configuration system for the terrain debugger.
//!
//! Runtime-configurable settings that persist to disk as RON files, with
//! CLI overrides via clap and forward/backward compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BlendConfig, CloudConfig, Config, DebugConfig, HumidityConfig, MaskConfig, RoadConfig,
    TerrainConfig, default_config_dir,
};
pub use error::ConfigError;
