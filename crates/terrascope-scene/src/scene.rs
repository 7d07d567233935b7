//! The frame-tick orchestrator.

use glam::DVec2;
use tracing::debug;

use terrascope_heightfield::{TerrainGeometry, TerrainSpec, build_terrain_geometry};
use terrascope_mask::{
    DebugImage, MaskEngine, MaskSample, PackedMaskExport, decode_debug_texture,
};
use terrascope_material::{BiomeBindingTable, BlendParameters, ShaderShape, TerrainBlendUniforms};

use crate::params::UiState;

/// What changed during a [`TerrainScene::tick`], so the render layer
/// knows which GPU resources to re-upload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Geometry was rebuilt; vertex and index buffers must be replaced.
    pub geometry_rebuilt: bool,
    /// The mask export was refreshed; the mask texture must be rewritten.
    pub mask_refreshed: bool,
    /// The packed uniform block changed; write it to the uniform buffer.
    pub uniforms_updated: bool,
}

/// Single-threaded frame orchestrator.
///
/// Everything happens synchronously inside `tick`, in a fixed order:
/// geometry rebuild first, then the mask manager, then the uniform
/// repack. A mask re-export therefore always completes before the
/// uniforms that reference its bounds are rebuilt in the same tick, and
/// a rebuilt grid is fully replaced before the next render reads it.
pub struct TerrainScene {
    engine: Box<dyn MaskEngine>,
    manager: terrascope_mask::MaskTextureManager,
    binding_table: BiomeBindingTable,

    spec: TerrainSpec,
    geometry: TerrainGeometry,
    params: BlendParameters,
    uniforms: TerrainBlendUniforms,
}

impl TerrainScene {
    pub fn new(ui: &UiState, engine: Box<dyn MaskEngine>) -> Self {
        let spec = ui.terrain_spec();
        let geometry = build_terrain_geometry(&spec);
        let params = ui.blend_parameters();
        let binding_table = BiomeBindingTable::default();
        // Real bounds arrive with the first mask export.
        let uniforms =
            TerrainBlendUniforms::pack(&params, &binding_table, [0.0, 0.0, 1.0, 1.0]);

        Self {
            engine,
            manager: terrascope_mask::MaskTextureManager::new(),
            binding_table,
            spec,
            geometry,
            params,
            uniforms,
        }
    }

    /// Advance one frame. `view_origin` is the camera's world XZ.
    pub fn tick(&mut self, ui: &UiState, view_origin: DVec2) -> TickReport {
        let mut report = TickReport::default();

        let new_spec = ui.terrain_spec();
        if new_spec != self.spec {
            debug!(
                columns = new_spec.columns(),
                rows = new_spec.rows(),
                "terrain spec changed, rebuilding grid"
            );
            self.geometry = build_terrain_geometry(&new_spec);
            self.spec = new_spec;
            report.geometry_rebuilt = true;
        }

        let key = ui.mask_config_key();
        let (refreshed, bounds) = {
            let tick =
                self.manager
                    .tick(self.engine.as_mut(), &key, view_origin, ui.debug_mode);
            (tick.refreshed, tick.export.bounds)
        };
        report.mask_refreshed = refreshed;

        let new_params = ui.blend_parameters();
        let new_uniforms = TerrainBlendUniforms::pack(
            &new_params,
            &self.binding_table,
            [
                bounds.min_x as f32,
                bounds.min_z as f32,
                bounds.max_x as f32,
                bounds.max_z as f32,
            ],
        );
        if new_uniforms != self.uniforms {
            self.uniforms = new_uniforms;
            report.uniforms_updated = true;
        }
        self.params = new_params;

        report
    }

    pub fn geometry(&self) -> &TerrainGeometry {
        &self.geometry
    }

    /// Current terrain height range, for camera framing and overlays.
    pub fn height_bounds(&self) -> (f32, f32) {
        (self.geometry.min_y, self.geometry.max_y)
    }

    /// The mask export backing the current frame, if one exists yet.
    pub fn current_mask(&self) -> Option<&PackedMaskExport> {
        self.manager.current()
    }

    /// Decode the current mask into the active debug visualization.
    pub fn debug_image(&self, ui: &UiState) -> Option<DebugImage> {
        self.manager
            .current()
            .map(|export| decode_debug_texture(export, ui.debug_mode, &ui.decode_options()))
    }

    /// Point-query pass-through for cursor inspection.
    pub fn sample(&self, x: f64, z: f64) -> MaskSample {
        self.engine.sample(x, z)
    }

    pub fn blend_uniforms(&self) -> &TerrainBlendUniforms {
        &self.uniforms
    }

    pub fn shape_key(&self) -> ShaderShape {
        self.params.shape_key()
    }

    pub fn binding_table(&self) -> &BiomeBindingTable {
        &self.binding_table
    }
}
