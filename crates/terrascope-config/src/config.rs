//! Configuration structs with sensible defaults and RON persistence.
//!
//! Defaults here mirror the domain crates' `Default` impls; the config
//! layer stays a leaf so it can be loaded before anything else exists.
//! Out-of-range values are accepted as-is and clamped by the consuming
//! subsystems.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name inside the config directory.
const CONFIG_FILE: &str = "terrascope.ron";

/// Top-level tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Terrain grid and slope settings.
    pub terrain: TerrainConfig,
    /// Road carve settings.
    pub road: RoadConfig,
    /// Cloud displacement settings.
    pub cloud: CloudConfig,
    /// Material blend settings (tiling, anti-tiling, macro variation).
    pub blend: BlendConfig,
    /// Humidity partition thresholds.
    pub humidity: HumidityConfig,
    /// Biome mask export settings.
    pub mask: MaskConfig,
    /// Debug/visualization settings.
    pub debug: DebugConfig,
}

/// Terrain grid extents and hill slopes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Edge length of one tile in meters.
    pub tile_size_m: f64,
    /// Grid extent in tiles along X.
    pub tiles_x: u32,
    /// Grid extent in tiles along Z.
    pub tiles_z: u32,
    /// Tile offset of the grid's minimum corner along X.
    pub min_tile_x: i32,
    /// Tile offset of the grid's minimum corner along Z.
    pub min_tile_z: i32,
    /// Quads per tile edge.
    pub subdivisions: u32,
    /// Noise seed for cloud displacement.
    pub seed: u64,
    /// Left hill slope in degrees.
    pub slope_left_deg: f64,
    /// Right hill slope in degrees.
    pub slope_right_deg: f64,
    /// Far-end slope in degrees.
    pub slope_end_deg: f64,
    /// Length of the eased transition at the hill foot, meters.
    pub bottom_curve_m: f64,
    /// Plateau width at the hill top, meters.
    pub top_flat_m: f64,
    /// Where the end slope starts, in tiles past the road's far end.
    pub end_slope_offset_tiles: f64,
}

/// Road carve configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RoadConfig {
    pub enabled: bool,
    /// Half-width of the flat strip, meters.
    pub half_width_m: f64,
    pub z_start_m: f64,
    pub z_end_m: f64,
    pub base_elevation_m: f64,
    /// Lateral blend distance past the road edge, meters.
    pub edge_blend_m: f64,
    /// Longitudinal blend distance past the road ends, meters.
    pub longitudinal_blend_m: f64,
}

/// Cloud displacement configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CloudConfig {
    pub enabled: bool,
    /// Peak displacement, meters.
    pub amplitude_m: f64,
    /// Base noise frequency, cycles per meter.
    pub frequency: f64,
    /// How many tiles from the far edge are affected.
    pub affected_tiles: f64,
    /// Fade-in width at the near boundary of the affected band, meters.
    pub blend_width_m: f64,
}

/// Material blend configuration: distance tiling, anti-tiling breakup,
/// and macro variation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BlendConfig {
    pub tiling_enabled: bool,
    pub tiling_near_scale: f32,
    pub tiling_far_scale: f32,
    pub tiling_blend_start_m: f32,
    pub tiling_blend_end_m: f32,
    pub tiling_blend_curve: f32,
    /// "blended", "near_only", or "far_only".
    pub tiling_debug_view: String,
    pub anti_tiling_enabled: bool,
    pub anti_tiling_strength: f32,
    pub anti_tiling_cell_size_m: f32,
    pub macro_enabled: bool,
    pub macro_strength: f32,
    pub macro_frequency: f32,
    pub intensity_near: f32,
    pub intensity_far: f32,
}

/// Humidity partition thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HumidityConfig {
    pub dry_max: f32,
    pub wet_min: f32,
    pub band_width: f32,
    pub edge_noise_strength: f32,
}

/// Biome mask export configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MaskConfig {
    pub seed: u64,
    /// Export resolution (square).
    pub resolution: u32,
    /// Half-extent of the exported world rectangle, meters.
    pub half_extent_m: f64,
    /// Voronoi patch cell size, meters.
    pub cell_size_m: f64,
    /// Width of the blend band between adjacent patches, meters.
    pub transition_width_m: f64,
    /// Frequency of the humidity noise field.
    pub humidity_frequency: f64,
}

/// Debug/visualization configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Debug visualization mode name, e.g. "biome_id", "humidity",
    /// "transition_band", "patch_ids".
    pub debug_mode: String,
    /// Biome pair highlighted by the pair-isolation mode.
    pub isolation_pair: (u8, u8),
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            tile_size_m: 50.0,
            tiles_x: 4,
            tiles_z: 4,
            min_tile_x: -2,
            min_tile_z: -2,
            subdivisions: 16,
            seed: 0,
            slope_left_deg: 30.0,
            slope_right_deg: 30.0,
            slope_end_deg: 0.0,
            bottom_curve_m: 20.0,
            top_flat_m: 0.0,
            end_slope_offset_tiles: 1.0,
        }
    }
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            half_width_m: 5.0,
            z_start_m: -50.0,
            z_end_m: 50.0,
            base_elevation_m: 0.0,
            edge_blend_m: 8.0,
            longitudinal_blend_m: 12.0,
        }
    }
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            amplitude_m: 6.0,
            frequency: 0.015,
            affected_tiles: 3.0,
            blend_width_m: 30.0,
        }
    }
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            tiling_enabled: true,
            tiling_near_scale: 1.0,
            tiling_far_scale: 0.25,
            tiling_blend_start_m: 30.0,
            tiling_blend_end_m: 180.0,
            tiling_blend_curve: 1.0,
            tiling_debug_view: "blended".to_string(),
            anti_tiling_enabled: true,
            anti_tiling_strength: 0.6,
            anti_tiling_cell_size_m: 12.0,
            macro_enabled: true,
            macro_strength: 0.25,
            macro_frequency: 0.01,
            intensity_near: 1.0,
            intensity_far: 0.5,
        }
    }
}

impl Default for HumidityConfig {
    fn default() -> Self {
        Self {
            dry_max: 0.35,
            wet_min: 0.65,
            band_width: 0.1,
            edge_noise_strength: 0.05,
        }
    }
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            resolution: 256,
            half_extent_m: 200.0,
            cell_size_m: 60.0,
            transition_width_m: 18.0,
            humidity_frequency: 0.004,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            debug_mode: "biome_id".to_string(),
            isolation_pair: (1, 2),
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save ---

impl Config {
    /// Load config from the given directory, or create a default config
    /// file there.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
                    path: config_path.clone(),
                    source,
                })?;
            let config: Config =
                ron::from_str(&contents).map_err(|source| ConfigError::Malformed {
                    path: config_path.clone(),
                    source,
                })?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `terrascope.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_path.clone(),
            source,
        })?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized = ron::ser::to_string_pretty(self, pretty)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::Write {
            path: config_path.clone(),
            source,
        })?;
        Ok(())
    }
}

/// The platform config directory for this tool, if one exists.
pub fn default_config_dir() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|base| base.join("terrascope"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(!ron_str.is_empty());
        assert!(ron_str.contains("tile_size_m: 50.0"));
        assert!(ron_str.contains("resolution: 256"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        // Config missing the `mask` section entirely
        let ron_str = "(terrain: (), road: (), cloud: (), blend: (), humidity: (), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.mask, MaskConfig::default());
    }

    #[test]
    fn test_partial_section_fills_remaining_fields() {
        let ron_str = "(terrain: (tiles_x: 8))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.terrain.tiles_x, 8);
        assert_eq!(config.terrain.tiles_z, TerrainConfig::default().tiles_z);
    }

    #[test]
    fn test_extra_field_ignored() {
        let ron_str = "(future_setting: true)";
        let result: Result<Config, _> = ron::from_str(ron_str);
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.terrain.tiles_x = 12;
        config.mask.resolution = 512;
        config.debug.debug_mode = "humidity".to_string();

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_creates_default_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(loaded, Config::default());
        assert!(dir.path().join("terrascope.ron").exists());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_file_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("terrascope.ron"), "{{not valid}}").unwrap();

        let err = Config::load_or_create(dir.path()).unwrap_err();
        match &err {
            ConfigError::Malformed { path, .. } => {
                assert!(path.ends_with("terrascope.ron"));
            }
            other => panic!("Expected Malformed, got {other:?}"),
        }
        assert!(err.to_string().contains("terrascope.ron"));
    }
}
