//! GPU plumbing for the terrain debug tool: device/surface management,
//! terrain mesh buffers, mask and biome textures, and the shape-keyed
//! terrain pipeline cache.

mod context;
mod depth;
mod mesh;
mod pipeline;
mod texture;

pub use context::{GpuContext, GpuContextError, SurfaceAcquireError, init_gpu_context_blocking};
pub use depth::DepthBuffer;
pub use mesh::{TerrainMeshBuffers, terrain_vertex_layout};
pub use pipeline::{CameraUniform, TerrainPipeline, TerrainPipelineCache};
pub use texture::{BiomeArrayTexture, MaskTexture, TextureError, solid_color_texture};
