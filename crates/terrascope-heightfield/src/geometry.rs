//! Terrain grid construction: vertices, indices, normals, height bounds.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::height::HeightSampler;
use crate::spec::TerrainSpec;

/// One terrain vertex as uploaded to the GPU.
///
/// `uv` carries the unnormalized world XZ of the vertex; the material
/// shader divides by per-layer tile sizes itself, so texture density is
/// independent of grid resolution.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// A built terrain mesh plus the metadata the scene needs: grid
/// dimensions for row-major addressing and the height range for camera
/// framing.
#[derive(Clone, Debug)]
pub struct TerrainGeometry {
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u32>,
    /// Vertex columns (along X).
    pub columns: u32,
    /// Vertex rows (along Z).
    pub rows: u32,
    pub min_y: f32,
    pub max_y: f32,
}

/// Build the full terrain grid for a spec.
///
/// Pure and deterministic: the same spec always yields the same
/// geometry. Vertices are laid out row-major (X fastest), each quad
/// split into two CCW triangles, normals accumulated per face and
/// normalized afterwards.
pub fn build_terrain_geometry(spec: &TerrainSpec) -> TerrainGeometry {
    let sampler = HeightSampler::new(spec);
    let spec = *sampler.spec();

    let columns = spec.columns();
    let rows = spec.rows();
    let step = spec.tile_size_m / spec.subdivisions as f64;
    let min_x = spec.min_x();
    let min_z = spec.min_z();

    let mut vertices = Vec::with_capacity((columns * rows) as usize);
    let mut min_y = f32::INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for row in 0..rows {
        let z = min_z + row as f64 * step;
        for col in 0..columns {
            let x = min_x + col as f64 * step;
            let y = sampler.height_at(x, z) as f32;
            min_y = min_y.min(y);
            max_y = max_y.max(y);
            vertices.push(TerrainVertex {
                position: [x as f32, y, z as f32],
                normal: [0.0, 0.0, 0.0],
                uv: [x as f32, z as f32],
            });
        }
    }

    let quad_cols = columns - 1;
    let quad_rows = rows - 1;
    let mut indices = Vec::with_capacity((quad_cols * quad_rows * 6) as usize);
    for row in 0..quad_rows {
        for col in 0..quad_cols {
            let i0 = row * columns + col;
            let i1 = i0 + 1;
            let i2 = i0 + columns;
            let i3 = i2 + 1;
            // Two CCW triangles per quad, viewed from +Y.
            indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }

    accumulate_normals(&mut vertices, &indices);

    TerrainGeometry {
        vertices,
        indices,
        columns,
        rows,
        min_y,
        max_y,
    }
}

/// Area-weighted face normals summed into each vertex, then normalized.
/// Degenerate sums fall back to +Y.
fn accumulate_normals(vertices: &mut [TerrainVertex], indices: &[u32]) {
    for tri in indices.chunks_exact(3) {
        let a = Vec3::from(vertices[tri[0] as usize].position);
        let b = Vec3::from(vertices[tri[1] as usize].position);
        let c = Vec3::from(vertices[tri[2] as usize].position);
        let face = (b - a).cross(c - a);
        for &i in tri {
            let n = &mut vertices[i as usize].normal;
            n[0] += face.x;
            n[1] += face.y;
            n[2] += face.z;
        }
    }
    for v in vertices {
        let n = Vec3::from(v.normal);
        v.normal = if n.length_squared() > 1e-12 {
            n.normalize().to_array()
        } else {
            [0.0, 1.0, 0.0]
        };
    }
}
