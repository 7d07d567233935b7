//! Deterministic 2D value noise and fractal Brownian motion.
//!
//! The heightfield's cloud displacement and the procedural mask engine's
//! humidity field both sample this primitive, so it must be seeded,
//! platform-stable, and bounded: [`ValueNoise::sample`] always returns a
//! value in `[0, 1)` and [`Fbm::max_amplitude`] gives the exact peak of the
//! octave sum, which callers use to normalize displacement amplitudes.

mod fbm;
mod value;

pub use fbm::{Fbm, FbmParams};
pub use value::ValueNoise;
