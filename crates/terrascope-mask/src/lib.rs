//! Biome/humidity mask plumbing.
//!
//! The biome assignment engine lives outside this workspace; this crate
//! owns the narrow interface to it ([`MaskEngine`]), the packed RGBA8
//! export format it produces ([`PackedMaskExport`]), the caching manager
//! that decides when a re-export is actually needed
//! ([`MaskTextureManager`]), and the false-color debug decoders that turn
//! an export into something a human can read ([`decode_debug_texture`]).

mod debug;
mod engine;
mod export;
mod manager;

pub use debug::{
    DebugImage, DebugMode, DecodeOptions, decode_debug_texture, decode_pair_compare,
};
pub use engine::{MaskEngine, ProceduralMaskEngine, ProceduralMaskParams};
pub use export::{MaskBounds, MaskError, MaskSample, PackedMaskExport, TransitionDebug};
pub use manager::{MaskConfigKey, MaskTextureManager, MaskTick, ViewKey};

/// Number of biomes in the mask id space (stone, grass, land).
pub const BIOME_COUNT: usize = 3;
