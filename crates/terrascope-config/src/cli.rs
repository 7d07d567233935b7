//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Terrascope command-line arguments.
///
/// CLI values override settings loaded from `terrascope.ron`.
#[derive(Parser, Debug)]
#[command(name = "terrascope", about = "Terrain heightfield and biome-blend debugger")]
pub struct CliArgs {
    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Mask export resolution (square, texels per side).
    #[arg(long)]
    pub mask_resolution: Option<u32>,

    /// Debug visualization mode (biome_id, humidity, transition_band,
    /// transition_result, transition_weight, transition_falloff,
    /// transition_noise, pair_isolation, patch_ids).
    #[arg(long)]
    pub debug_mode: Option<String>,

    /// Mask seed override.
    #[arg(long)]
    pub mask_seed: Option<u64>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(res) = args.mask_resolution {
            self.mask.resolution = res;
        }
        if let Some(ref mode) = args.debug_mode {
            self.debug.debug_mode = mode.clone();
        }
        if let Some(seed) = args.mask_seed {
            self.mask.seed = seed;
        }
    }
}
