//! Procedural heightfield synthesis for the terrain debug scene.
//!
//! [`build_terrain_geometry`] turns a [`TerrainSpec`] into a row-major
//! vertex grid with world-space UVs and derived normals. The height at each
//! vertex is composed from four contributions, in order: hill slope, end
//! slope, cloud displacement, and a final road-flattening blend that
//! overrides the others inside the road footprint.
//!
//! Everything here is pure and deterministic: the same spec always yields
//! the same grid, and all numeric inputs are clamped to safe ranges before
//! use, so no spec can produce NaN or infinite heights.

mod geometry;
mod height;
mod spec;

pub use geometry::{TerrainGeometry, TerrainVertex, build_terrain_geometry};
pub use height::{HeightSampler, smoothstep};
pub use spec::{CloudSpec, RoadSpec, SlopeSpec, TerrainSpec};
