//! The debug panel state and its mapping onto typed parameters.

use terrascope_heightfield::{CloudSpec, RoadSpec, SlopeSpec, TerrainSpec};
use terrascope_mask::{DebugMode, DecodeOptions, MaskConfigKey};
use terrascope_material::{
    AntiTiling, BlendParameters, DistanceTiling, HumidityThresholds, MacroVariation,
    TilingDebugView, VariationIntensity,
};

/// Flat slider/toggle state as the UI layer edits it.
///
/// Values here are raw user input; every mapping method clamps on the
/// way out, so the panel can hold any number the user typed without the
/// subsystems ever seeing it. Structural-change detection is plain
/// `PartialEq` on the mapped outputs.
#[derive(Clone, Debug, PartialEq)]
pub struct UiState {
    // Terrain grid.
    pub tile_size_m: f64,
    pub tiles_x: u32,
    pub tiles_z: u32,
    pub min_tile_x: i32,
    pub min_tile_z: i32,
    pub subdivisions: u32,
    pub terrain_seed: u64,

    // Hill and end slopes.
    pub slope_left_deg: f64,
    pub slope_right_deg: f64,
    pub slope_end_deg: f64,
    pub bottom_curve_m: f64,
    pub top_flat_m: f64,
    pub end_slope_offset_tiles: f64,

    // Road.
    pub road_enabled: bool,
    pub road_half_width_m: f64,
    pub road_z_start_m: f64,
    pub road_z_end_m: f64,
    pub road_base_elevation_m: f64,
    pub road_edge_blend_m: f64,
    pub road_longitudinal_blend_m: f64,

    // Clouds.
    pub cloud_enabled: bool,
    pub cloud_amplitude_m: f64,
    pub cloud_frequency: f64,
    pub cloud_affected_tiles: f64,
    pub cloud_blend_width_m: f64,

    // Distance tiling.
    pub tiling_enabled: bool,
    pub tiling_near_scale: f32,
    pub tiling_far_scale: f32,
    pub tiling_blend_start_m: f32,
    pub tiling_blend_end_m: f32,
    pub tiling_blend_curve: f32,
    pub tiling_debug_view: TilingDebugView,

    // Anti-tiling and macro variation.
    pub anti_tiling_enabled: bool,
    pub anti_tiling_strength: f32,
    pub anti_tiling_cell_size_m: f32,
    pub macro_enabled: bool,
    pub macro_strength: f32,
    pub macro_frequency: f32,
    pub intensity_near: f32,
    pub intensity_far: f32,

    // Humidity partition.
    pub humidity_dry_max: f32,
    pub humidity_wet_min: f32,
    pub humidity_band_width: f32,
    pub humidity_edge_noise: f32,

    // Mask export.
    pub mask_seed: u64,
    pub mask_resolution: u32,
    pub mask_half_extent_m: f64,
    pub mask_cell_size_m: f64,
    pub mask_transition_width_m: f64,
    pub mask_humidity_frequency: f64,

    // Debug visualization.
    pub debug_mode: DebugMode,
    pub isolation_pair: (u8, u8),
}

impl Default for UiState {
    fn default() -> Self {
        let terrain = TerrainSpec::default();
        let blend = BlendParameters::default();
        let mask = MaskConfigKey::default();
        Self {
            tile_size_m: terrain.tile_size_m,
            tiles_x: terrain.tiles_x,
            tiles_z: terrain.tiles_z,
            min_tile_x: terrain.min_tile_x,
            min_tile_z: terrain.min_tile_z,
            subdivisions: terrain.subdivisions,
            terrain_seed: terrain.seed,

            slope_left_deg: terrain.slope.left_deg,
            slope_right_deg: terrain.slope.right_deg,
            slope_end_deg: terrain.slope.end_deg,
            bottom_curve_m: terrain.slope.bottom_curve_m,
            top_flat_m: terrain.slope.top_flat_m,
            end_slope_offset_tiles: terrain.slope.end_slope_offset_tiles,

            road_enabled: terrain.road.enabled,
            road_half_width_m: terrain.road.half_width_m,
            road_z_start_m: terrain.road.z_start_m,
            road_z_end_m: terrain.road.z_end_m,
            road_base_elevation_m: terrain.road.base_elevation_m,
            road_edge_blend_m: terrain.road.edge_blend_m,
            road_longitudinal_blend_m: terrain.road.longitudinal_blend_m,

            cloud_enabled: terrain.cloud.enabled,
            cloud_amplitude_m: terrain.cloud.amplitude_m,
            cloud_frequency: terrain.cloud.frequency,
            cloud_affected_tiles: terrain.cloud.affected_tiles,
            cloud_blend_width_m: terrain.cloud.blend_width_m,

            tiling_enabled: blend.tiling.enabled,
            tiling_near_scale: blend.tiling.near_scale,
            tiling_far_scale: blend.tiling.far_scale,
            tiling_blend_start_m: blend.tiling.blend_start_m,
            tiling_blend_end_m: blend.tiling.blend_end_m,
            tiling_blend_curve: blend.tiling.blend_curve,
            tiling_debug_view: blend.tiling.debug_view,

            anti_tiling_enabled: blend.anti_tiling.enabled,
            anti_tiling_strength: blend.anti_tiling.strength,
            anti_tiling_cell_size_m: blend.anti_tiling.cell_size_m,
            macro_enabled: blend.macro_variation.enabled,
            macro_strength: blend.macro_variation.strength,
            macro_frequency: blend.macro_variation.frequency,
            intensity_near: blend.intensity.near,
            intensity_far: blend.intensity.far,

            humidity_dry_max: blend.humidity.dry_max,
            humidity_wet_min: blend.humidity.wet_min,
            humidity_band_width: blend.humidity.band_width,
            humidity_edge_noise: blend.humidity.edge_noise_strength,

            mask_seed: mask.seed,
            mask_resolution: mask.width,
            mask_half_extent_m: mask.half_extent_m,
            mask_cell_size_m: mask.cell_size_m,
            mask_transition_width_m: mask.transition_width_m,
            mask_humidity_frequency: mask.humidity_frequency,

            debug_mode: DebugMode::BiomeId,
            isolation_pair: (1, 2),
        }
    }
}

impl UiState {
    /// Terrain spec, clamped.
    pub fn terrain_spec(&self) -> TerrainSpec {
        TerrainSpec {
            tile_size_m: self.tile_size_m,
            tiles_x: self.tiles_x,
            tiles_z: self.tiles_z,
            min_tile_x: self.min_tile_x,
            min_tile_z: self.min_tile_z,
            subdivisions: self.subdivisions,
            seed: self.terrain_seed,
            slope: SlopeSpec {
                left_deg: self.slope_left_deg,
                right_deg: self.slope_right_deg,
                end_deg: self.slope_end_deg,
                bottom_curve_m: self.bottom_curve_m,
                top_flat_m: self.top_flat_m,
                end_slope_offset_tiles: self.end_slope_offset_tiles,
            },
            road: RoadSpec {
                enabled: self.road_enabled,
                half_width_m: self.road_half_width_m,
                z_start_m: self.road_z_start_m,
                z_end_m: self.road_z_end_m,
                base_elevation_m: self.road_base_elevation_m,
                edge_blend_m: self.road_edge_blend_m,
                longitudinal_blend_m: self.road_longitudinal_blend_m,
            },
            cloud: CloudSpec {
                enabled: self.cloud_enabled,
                amplitude_m: self.cloud_amplitude_m,
                frequency: self.cloud_frequency,
                affected_tiles: self.cloud_affected_tiles,
                blend_width_m: self.cloud_blend_width_m,
            },
        }
        .clamped()
    }

    /// Blend parameters, clamped.
    pub fn blend_parameters(&self) -> BlendParameters {
        BlendParameters {
            tiling: DistanceTiling {
                enabled: self.tiling_enabled,
                near_scale: self.tiling_near_scale,
                far_scale: self.tiling_far_scale,
                blend_start_m: self.tiling_blend_start_m,
                blend_end_m: self.tiling_blend_end_m,
                blend_curve: self.tiling_blend_curve,
                debug_view: self.tiling_debug_view,
            },
            anti_tiling: AntiTiling {
                enabled: self.anti_tiling_enabled,
                strength: self.anti_tiling_strength,
                cell_size_m: self.anti_tiling_cell_size_m,
            },
            macro_variation: MacroVariation {
                enabled: self.macro_enabled,
                strength: self.macro_strength,
                frequency: self.macro_frequency,
            },
            intensity: VariationIntensity {
                near: self.intensity_near,
                far: self.intensity_far,
            },
            humidity: HumidityThresholds {
                dry_max: self.humidity_dry_max,
                wet_min: self.humidity_wet_min,
                band_width: self.humidity_band_width,
                edge_noise_strength: self.humidity_edge_noise,
            },
        }
        .clamped()
    }

    /// Mask export configuration key.
    pub fn mask_config_key(&self) -> MaskConfigKey {
        let resolution = self.mask_resolution.clamp(16, 4096);
        MaskConfigKey {
            seed: self.mask_seed,
            width: resolution,
            height: resolution,
            half_extent_m: self.mask_half_extent_m.clamp(1.0, 100_000.0),
            cell_size_m: self.mask_cell_size_m.clamp(1.0, 10_000.0),
            transition_width_m: self.mask_transition_width_m.clamp(0.0, 1_000.0),
            humidity_frequency: self.mask_humidity_frequency.clamp(1e-6, 1.0),
            biome_weights: [1.0, 1.0, 1.0],
        }
    }

    /// Options for the debug decoders, kept consistent with the
    /// humidity thresholds the shader uses.
    pub fn decode_options(&self) -> DecodeOptions {
        let humidity = self.blend_parameters().humidity;
        DecodeOptions {
            dry_max: humidity.dry_max,
            wet_min: humidity.wet_min,
            band_width: humidity.band_width,
            isolation_pair: self.isolation_pair,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_maps_to_default_specs() {
        let ui = UiState::default();
        assert_eq!(ui.terrain_spec(), TerrainSpec::default().clamped());
        assert_eq!(ui.blend_parameters(), BlendParameters::default().clamped());
        assert_eq!(ui.mask_config_key(), MaskConfigKey::default());
    }

    #[test]
    fn test_mapping_clamps_hostile_input() {
        let ui = UiState {
            tiles_x: 0,
            subdivisions: 0,
            slope_left_deg: 1e9,
            humidity_dry_max: 5.0,
            humidity_wet_min: -5.0,
            mask_resolution: 1,
            ..Default::default()
        };
        let spec = ui.terrain_spec();
        assert!(spec.tiles_x >= 1);
        assert!(spec.subdivisions >= 1);
        assert!(spec.slope.left_deg < 90.0);

        let blend = ui.blend_parameters();
        assert!(blend.humidity.wet_min >= blend.humidity.dry_max + 0.02);

        assert!(ui.mask_config_key().width >= 16);
    }

    #[test]
    fn test_structural_change_detection_via_eq() {
        let a = UiState::default();
        let mut b = a.clone();
        assert_eq!(a.terrain_spec(), b.terrain_spec());

        b.subdivisions += 1;
        assert_ne!(
            a.terrain_spec(),
            b.terrain_spec(),
            "Grid changes must compare unequal so the mesh rebuilds"
        );

        // Blend-only edits leave the terrain spec untouched.
        let mut c = a.clone();
        c.tiling_near_scale = 3.0;
        assert_eq!(a.terrain_spec(), c.terrain_spec());
        assert_ne!(a.blend_parameters(), c.blend_parameters());
    }

    #[test]
    fn test_decode_options_track_humidity_thresholds() {
        let mut ui = UiState::default();
        ui.humidity_dry_max = 0.2;
        ui.humidity_wet_min = 0.8;
        let opts = ui.decode_options();
        assert_eq!(opts.dry_max, 0.2);
        assert_eq!(opts.wet_min, 0.8);
    }
}
