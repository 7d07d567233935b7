//! Translation from the persisted config to the scene's panel state.

use terrascope_config::Config;
use terrascope_mask::DebugMode;
use terrascope_material::TilingDebugView;
use terrascope_scene::UiState;
use tracing::warn;

/// Parse a debug mode name from config or CLI. Unknown names fall back
/// to `BiomeId` with a warning rather than failing startup.
pub fn parse_debug_mode(name: &str) -> DebugMode {
    match name {
        "biome_id" => DebugMode::BiomeId,
        "humidity" => DebugMode::Humidity,
        "transition_band" => DebugMode::TransitionBand,
        "transition_result" => DebugMode::TransitionResult,
        "transition_weight" => DebugMode::TransitionWeight,
        "transition_falloff" => DebugMode::TransitionFalloff,
        "transition_noise" => DebugMode::TransitionNoise,
        "pair_isolation" => DebugMode::PairIsolation,
        "patch_ids" => DebugMode::PatchIds,
        other => {
            warn!("unknown debug mode {other:?}, falling back to biome_id");
            DebugMode::BiomeId
        }
    }
}

fn parse_tiling_view(name: &str) -> TilingDebugView {
    match name {
        "blended" => TilingDebugView::Blended,
        "near_only" => TilingDebugView::NearOnly,
        "far_only" => TilingDebugView::FarOnly,
        other => {
            warn!("unknown tiling debug view {other:?}, falling back to blended");
            TilingDebugView::Blended
        }
    }
}

/// Build the panel state the scene consumes from a loaded config.
/// Out-of-range values pass through; the scene's mappers clamp them.
pub fn ui_state_from_config(config: &Config) -> UiState {
    UiState {
        tile_size_m: config.terrain.tile_size_m,
        tiles_x: config.terrain.tiles_x,
        tiles_z: config.terrain.tiles_z,
        min_tile_x: config.terrain.min_tile_x,
        min_tile_z: config.terrain.min_tile_z,
        subdivisions: config.terrain.subdivisions,
        terrain_seed: config.terrain.seed,

        slope_left_deg: config.terrain.slope_left_deg,
        slope_right_deg: config.terrain.slope_right_deg,
        slope_end_deg: config.terrain.slope_end_deg,
        bottom_curve_m: config.terrain.bottom_curve_m,
        top_flat_m: config.terrain.top_flat_m,
        end_slope_offset_tiles: config.terrain.end_slope_offset_tiles,

        road_enabled: config.road.enabled,
        road_half_width_m: config.road.half_width_m,
        road_z_start_m: config.road.z_start_m,
        road_z_end_m: config.road.z_end_m,
        road_base_elevation_m: config.road.base_elevation_m,
        road_edge_blend_m: config.road.edge_blend_m,
        road_longitudinal_blend_m: config.road.longitudinal_blend_m,

        cloud_enabled: config.cloud.enabled,
        cloud_amplitude_m: config.cloud.amplitude_m,
        cloud_frequency: config.cloud.frequency,
        cloud_affected_tiles: config.cloud.affected_tiles,
        cloud_blend_width_m: config.cloud.blend_width_m,

        tiling_enabled: config.blend.tiling_enabled,
        tiling_near_scale: config.blend.tiling_near_scale,
        tiling_far_scale: config.blend.tiling_far_scale,
        tiling_blend_start_m: config.blend.tiling_blend_start_m,
        tiling_blend_end_m: config.blend.tiling_blend_end_m,
        tiling_blend_curve: config.blend.tiling_blend_curve,
        tiling_debug_view: parse_tiling_view(&config.blend.tiling_debug_view),

        anti_tiling_enabled: config.blend.anti_tiling_enabled,
        anti_tiling_strength: config.blend.anti_tiling_strength,
        anti_tiling_cell_size_m: config.blend.anti_tiling_cell_size_m,
        macro_enabled: config.blend.macro_enabled,
        macro_strength: config.blend.macro_strength,
        macro_frequency: config.blend.macro_frequency,
        intensity_near: config.blend.intensity_near,
        intensity_far: config.blend.intensity_far,

        humidity_dry_max: config.humidity.dry_max,
        humidity_wet_min: config.humidity.wet_min,
        humidity_band_width: config.humidity.band_width,
        humidity_edge_noise: config.humidity.edge_noise_strength,

        mask_seed: config.mask.seed,
        mask_resolution: config.mask.resolution,
        mask_half_extent_m: config.mask.half_extent_m,
        mask_cell_size_m: config.mask.cell_size_m,
        mask_transition_width_m: config.mask.transition_width_m,
        mask_humidity_frequency: config.mask.humidity_frequency,

        debug_mode: parse_debug_mode(&config.debug.debug_mode),
        isolation_pair: config.debug.isolation_pair,
    }
}
