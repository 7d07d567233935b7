//! Seeded hash-based lattice value noise.

/// Deterministic 2D value noise over an integer lattice.
///
/// Each lattice corner is hashed together with the seed to a value in
/// `[0, 1)`, and samples between corners are blended with a quintic fade.
/// The same seed and coordinates produce the same value on every platform:
/// the hash uses only integer wrapping arithmetic.
#[derive(Clone, Debug)]
pub struct ValueNoise {
    seed: u64,
}

impl ValueNoise {
    /// Create a noise source with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Sample the noise at a 2D coordinate. Returns a value in `[0, 1)`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;

        let ix = x0 as i64;
        let iy = y0 as i64;

        let c00 = self.corner(ix, iy);
        let c10 = self.corner(ix + 1, iy);
        let c01 = self.corner(ix, iy + 1);
        let c11 = self.corner(ix + 1, iy + 1);

        let u = fade(fx);
        let v = fade(fy);

        let top = c00 + (c10 - c00) * u;
        let bottom = c01 + (c11 - c01) * u;
        top + (bottom - top) * v
    }

    /// Hash one lattice corner to `[0, 1)`.
    fn corner(&self, ix: i64, iy: i64) -> f64 {
        let h = mix(self.seed, ix as u64, iy as u64);
        // Top 53 bits into the f64 mantissa range, strictly below 1.0.
        (h >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Quintic fade `6t^5 - 15t^4 + 10t^3`: zero first and second derivative at
/// the lattice lines, so gradients stay continuous across cells.
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Integer mix of seed and lattice coordinates (SplitMix64-style finalizer).
fn mix(seed: u64, x: u64, y: u64) -> u64 {
    let mut h = seed
        .wrapping_add(x.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(y.wrapping_mul(0xC2B2_AE3D_27D4_EB4F));
    h ^= h >> 30;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 27;
    h = h.wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^ (h >> 31)
}
