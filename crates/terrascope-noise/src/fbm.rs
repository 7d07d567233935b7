//! Multi-octave fractal Brownian motion over value noise.

use crate::ValueNoise;

/// Octave composition parameters for [`Fbm`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FbmParams {
    /// Number of octaves to composite. Typical range: 3–6.
    pub octaves: u32,
    /// Amplitude multiplier between successive octaves. Default: 0.5.
    pub gain: f64,
    /// Frequency multiplier between successive octaves. Default: 2.0.
    pub lacunarity: f64,
    /// Amplitude of the first octave. Default: 0.5.
    pub initial_amplitude: f64,
}

impl Default for FbmParams {
    fn default() -> Self {
        Self {
            octaves: 4,
            gain: 0.5,
            lacunarity: 2.0,
            initial_amplitude: 0.5,
        }
    }
}

/// Fractal Brownian motion: octaves of [`ValueNoise`] at doubling frequency
/// and halving amplitude.
///
/// The octave sum of `[0, 1)` noise is bounded by [`Fbm::max_amplitude`],
/// the geometric series of the octave amplitudes. With the default
/// parameters (4 octaves, gain 0.5, initial amplitude 0.5) that bound is
/// exactly 0.9375, which the heightfield uses to normalize cloud
/// displacement to a configured peak.
#[derive(Clone, Debug)]
pub struct Fbm {
    noise: ValueNoise,
    params: FbmParams,
}

impl Fbm {
    /// Create an FBM sampler with the given seed and parameters.
    pub fn new(seed: u64, params: FbmParams) -> Self {
        Self {
            noise: ValueNoise::new(seed),
            params,
        }
    }

    /// Sample the octave sum at a 2D coordinate.
    ///
    /// Returns a value in `[0, max_amplitude()]`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = self.params.initial_amplitude;

        for _ in 0..self.params.octaves {
            total += self.noise.sample(x * frequency, y * frequency) * amplitude;
            frequency *= self.params.lacunarity;
            amplitude *= self.params.gain;
        }

        total
    }

    /// The exact upper bound of [`Fbm::sample`]: the geometric sum of all
    /// octave amplitudes.
    pub fn max_amplitude(&self) -> f64 {
        let mut sum = 0.0;
        let mut amp = self.params.initial_amplitude;
        for _ in 0..self.params.octaves {
            sum += amp;
            amp *= self.params.gain;
        }
        sum
    }

    /// The parameters this sampler was built with.
    pub fn params(&self) -> &FbmParams {
        &self.params
    }
}
