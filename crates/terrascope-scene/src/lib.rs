//! Frame-synchronous scene orchestration.
//!
//! [`TerrainScene`] ties the heightfield, mask manager, and blend
//! parameters together on a single thread: one `tick` per frame, no
//! background work, strict ordering (geometry, then mask, then
//! uniforms). [`UiState`] is the flat panel state the debug tool edits;
//! the mapper turns it into the typed specs the subsystems consume.

mod params;
mod scene;

pub use params::UiState;
pub use scene::{TerrainScene, TickReport};
