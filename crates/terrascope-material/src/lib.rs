//! Biome-material blending: binding table, blend parameters, WGSL shader
//! composition, and the uniform set feeding it.
//!
//! The shader samples a biome/humidity mask per fragment and blends up to
//! nine textures (3 biomes × 3 humidity bands) with distance-adaptive
//! tiling and anti-tiling variation. The CPU side here mirrors the WGSL
//! math closely enough that the blend logic is testable without a GPU.

mod binding;
mod blend;
mod params;
mod shader;
mod uniforms;

pub use binding::{BiomeBinding, BiomeBindingTable, BiomeId, HumidityBand};
pub use blend::{
    anti_tile_cell, blend_colors, distance_blend_factor, humidity_weights, linear_to_srgb,
    smoothstep, srgb_to_linear,
};
pub use params::{
    AntiTiling, BlendParameters, DistanceTiling, HumidityThresholds, MacroVariation, ShaderShape,
    TilingDebugView, VariationIntensity,
};
pub use shader::{SHADER_VERSION, compose_terrain_shader};
pub use uniforms::{
    HumidityUniform, MaskUniform, TerrainBlendUniforms, TileScaleUniform, TilingUniform,
    VariationUniform,
};
