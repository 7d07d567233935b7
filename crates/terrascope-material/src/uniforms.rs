//! GPU uniform mirrors of the blend parameters.
//!
//! Field order and padding match the `TerrainParams` WGSL struct in
//! `shader.rs` exactly; the const asserts below hold the Rust side to
//! the WGSL layout. All scalars are f32 so the packed struct is a flat
//! sequence of vec4-sized rows.

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;

use crate::binding::{BiomeBindingTable, BiomeId};
use crate::params::{BlendParameters, HumidityThresholds, TilingDebugView};

/// World rectangle of the mask texture: min_x, min_z, max_x, max_z.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MaskUniform {
    pub bounds: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct HumidityUniform {
    pub dry_max: f32,
    pub wet_min: f32,
    pub band_width: f32,
    pub edge_noise_strength: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TilingUniform {
    pub near_scale: f32,
    pub far_scale: f32,
    pub blend_start_m: f32,
    pub blend_end_m: f32,
    pub blend_curve: f32,
    /// 0 = blended, 1 = near only, 2 = far only.
    pub debug_view: f32,
    pub enabled: f32,
    pub _pad: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct VariationUniform {
    pub anti_enabled: f32,
    pub anti_strength: f32,
    pub anti_cell_size_m: f32,
    pub macro_enabled: f32,
    pub macro_strength: f32,
    pub macro_frequency: f32,
    pub intensity_near: f32,
    pub intensity_far: f32,
}

/// Per-biome tile sizes, one vec4 row per biome (dry, neutral, wet, pad).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TileScaleUniform {
    pub scales: [[f32; 4]; 3],
}

/// The complete uniform block uploaded to `@group(2) @binding(2)`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TerrainBlendUniforms {
    pub mask: MaskUniform,
    pub humidity: HumidityUniform,
    pub tiling: TilingUniform,
    pub variation: VariationUniform,
    pub tile_scale: TileScaleUniform,
}

const_assert_eq!(std::mem::size_of::<MaskUniform>(), 16);
const_assert_eq!(std::mem::size_of::<HumidityUniform>(), 16);
const_assert_eq!(std::mem::size_of::<TilingUniform>(), 32);
const_assert_eq!(std::mem::size_of::<VariationUniform>(), 32);
const_assert_eq!(std::mem::size_of::<TileScaleUniform>(), 48);
const_assert_eq!(std::mem::size_of::<TerrainBlendUniforms>(), 144);

impl TerrainBlendUniforms {
    /// Pack clamped parameters and the binding table into the GPU
    /// layout. `mask_bounds` is the world rectangle of the current mask
    /// export as (min_x, min_z, max_x, max_z).
    pub fn pack(
        params: &BlendParameters,
        table: &BiomeBindingTable,
        mask_bounds: [f32; 4],
    ) -> Self {
        let p = params.clamped();
        let t: HumidityThresholds = p.humidity;

        let debug_view = match p.tiling.debug_view {
            TilingDebugView::Blended => 0.0,
            TilingDebugView::NearOnly => 1.0,
            TilingDebugView::FarOnly => 2.0,
        };

        let scales = BiomeId::ALL.map(|biome| {
            let [dry, neutral, wet] = table.tile_sizes(biome);
            [dry, neutral, wet, 0.0]
        });

        Self {
            mask: MaskUniform {
                bounds: mask_bounds,
            },
            humidity: HumidityUniform {
                dry_max: t.dry_max,
                wet_min: t.wet_min,
                band_width: t.band_width,
                edge_noise_strength: t.edge_noise_strength,
            },
            tiling: TilingUniform {
                near_scale: p.tiling.near_scale,
                far_scale: p.tiling.far_scale,
                blend_start_m: p.tiling.blend_start_m,
                blend_end_m: p.tiling.blend_end_m,
                blend_curve: p.tiling.blend_curve,
                debug_view,
                enabled: p.tiling.enabled as u32 as f32,
                _pad: 0.0,
            },
            variation: VariationUniform {
                anti_enabled: p.anti_tiling.enabled as u32 as f32,
                anti_strength: p.anti_tiling.strength,
                anti_cell_size_m: p.anti_tiling.cell_size_m,
                macro_enabled: p.macro_variation.enabled as u32 as f32,
                macro_strength: p.macro_variation.strength,
                macro_frequency: p.macro_variation.frequency,
                intensity_near: p.intensity.near,
                intensity_far: p.intensity.far,
            },
            tile_scale: TileScaleUniform { scales },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_applies_parameter_clamps() {
        let params = BlendParameters {
            humidity: HumidityThresholds {
                dry_max: 0.9,
                wet_min: 0.1,
                ..Default::default()
            },
            ..Default::default()
        };
        let packed = TerrainBlendUniforms::pack(
            &params,
            &BiomeBindingTable::default(),
            [0.0, 0.0, 1.0, 1.0],
        );
        assert!(packed.humidity.wet_min >= packed.humidity.dry_max + 0.02);
    }

    #[test]
    fn test_pack_is_deterministic_pod() {
        let params = BlendParameters::default();
        let table = BiomeBindingTable::default();
        let a = TerrainBlendUniforms::pack(&params, &table, [-100.0, -100.0, 100.0, 100.0]);
        let b = TerrainBlendUniforms::pack(&params, &table, [-100.0, -100.0, 100.0, 100.0]);
        assert_eq!(bytemuck::bytes_of(&a), bytemuck::bytes_of(&b));
        assert_eq!(bytemuck::bytes_of(&a).len(), 144);
    }

    #[test]
    fn test_uniform_block_is_nine_vec4_rows() {
        // The WGSL TerrainParams struct is nine vec4<f32> rows; the Rust
        // side must pack to exactly that, with no implicit padding.
        let component_sum = std::mem::size_of::<MaskUniform>()
            + std::mem::size_of::<HumidityUniform>()
            + std::mem::size_of::<TilingUniform>()
            + std::mem::size_of::<VariationUniform>()
            + std::mem::size_of::<TileScaleUniform>();
        assert_eq!(component_sum, 9 * 16);
        assert_eq!(std::mem::size_of::<TerrainBlendUniforms>(), component_sum);
    }

    #[test]
    fn test_tile_scales_follow_binding_table_layer_order() {
        let table = BiomeBindingTable::default();
        let packed = TerrainBlendUniforms::pack(
            &BlendParameters::default(),
            &table,
            [0.0, 0.0, 1.0, 1.0],
        );
        for (i, biome) in BiomeId::ALL.into_iter().enumerate() {
            let expected = table.tile_sizes(biome);
            assert_eq!(&packed.tile_scale.scales[i][..3], &expected);
        }
    }
}
