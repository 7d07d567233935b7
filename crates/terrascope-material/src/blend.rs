//! CPU mirrors of the WGSL blend math.
//!
//! These exist so the numerically interesting parts of the shader are
//! testable without a GPU; the WGSL in `shader.rs` implements the same
//! formulas. Keep the two in sync when editing either side.

use crate::params::HumidityThresholds;

/// Hermite smoothstep matching WGSL's built-in.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Three-bucket humidity partition: (dry, neutral, wet) weights.
///
/// Below `dry_max − band/2` the result is pure dry; above
/// `wet_min + band/2` pure wet; inside each band a smoothstep
/// cross-fade. `noise` (in [-1, 1]) perturbs the effective humidity, but
/// only near a threshold: an edge mask zeroes it on the plateau
/// interiors so noise roughens boundaries without speckling the flats.
///
/// The weights always sum to exactly 1.
pub fn humidity_weights(humidity: f32, thresholds: &HumidityThresholds, noise: f32) -> [f32; 3] {
    let t = thresholds.clamped();
    let half_band = t.band_width * 0.5;

    let edge_mask = {
        let near_dry = 1.0 - (humidity - t.dry_max).abs() / t.band_width;
        let near_wet = 1.0 - (humidity - t.wet_min).abs() / t.band_width;
        near_dry.max(near_wet).clamp(0.0, 1.0)
    };
    let h = (humidity + noise * t.edge_noise_strength * edge_mask).clamp(0.0, 1.0);

    let dry = 1.0 - smoothstep(t.dry_max - half_band, t.dry_max + half_band, h);
    let wet = smoothstep(t.wet_min - half_band, t.wet_min + half_band, h);
    let neutral = (1.0 - dry - wet).max(0.0);
    [dry, neutral, wet]
}

/// Normalized distance-tiling blend factor: 0 at `start` (pure near),
/// 1 at `end` (pure far), shaped by `pow(t, curve)` in between.
///
/// `dist` is the planar XZ distance from the camera to the sampled
/// point; camera height must not push the blend boundaries outward.
pub fn distance_blend_factor(dist: f32, start: f32, end: f32, curve: f32) -> f32 {
    if end <= start {
        return if dist < end { 0.0 } else { 1.0 };
    }
    let t = ((dist - start) / (end - start)).clamp(0.0, 1.0);
    t.powf(curve.max(1e-6))
}

/// Per-cell rotation (radians) and UV offset for anti-tiling.
/// Deterministic per cell so the pattern is stable frame to frame.
pub fn anti_tile_cell(cell_x: i32, cell_y: i32) -> (f32, [f32; 2]) {
    let h = hash_cell(cell_x, cell_y);
    let rotation = (h & 0xFFFF) as f32 / 65536.0 * std::f32::consts::TAU;
    let offset = [
        ((h >> 16) & 0xFFFF) as f32 / 65536.0,
        ((h >> 32) & 0xFFFF) as f32 / 65536.0,
    ];
    (rotation, offset)
}

fn hash_cell(x: i32, y: i32) -> u64 {
    let mut h = (x as u32 as u64)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add((y as u32 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F));
    h ^= h >> 30;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^ (h >> 27)
}

/// sRGB transfer function decode, per channel.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB transfer function encode, per channel.
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// The final albedo override: `primary·(1−b) + secondary·b`, in linear
/// space.
pub fn blend_colors(primary: [f32; 3], secondary: [f32; 3], blend: f32) -> [f32; 3] {
    let b = blend.clamp(0.0, 1.0);
    std::array::from_fn(|i| primary[i] * (1.0 - b) + secondary[i] * b)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_humidity_partition_sums_to_one_everywhere() {
        let configs = [
            HumidityThresholds::default(),
            HumidityThresholds {
                dry_max: 0.1,
                wet_min: 0.9,
                band_width: 0.4,
                edge_noise_strength: 0.5,
            },
            HumidityThresholds {
                dry_max: 0.5,
                wet_min: 0.5, // clamped up to 0.52
                band_width: 0.001,
                edge_noise_strength: 0.0,
            },
        ];
        for thresholds in &configs {
            for i in 0..=1000 {
                let h = i as f32 / 1000.0;
                for noise in [-1.0, -0.3, 0.0, 0.7, 1.0] {
                    let w = humidity_weights(h, thresholds, noise);
                    let sum: f32 = w.iter().sum();
                    assert!(
                        (sum - 1.0).abs() < EPSILON,
                        "Partition must sum to 1, got {sum} at h={h} noise={noise}"
                    );
                    assert!(w.iter().all(|&x| (0.0..=1.0 + EPSILON).contains(&x)));
                }
            }
        }
    }

    #[test]
    fn test_humidity_extremes_are_pure_buckets() {
        let t = HumidityThresholds::default();
        assert_eq!(humidity_weights(0.0, &t, 0.0), [1.0, 0.0, 0.0]);
        assert_eq!(humidity_weights(1.0, &t, 0.0), [0.0, 0.0, 1.0]);
        let mid = humidity_weights(0.5, &t, 0.0);
        assert!((mid[1] - 1.0).abs() < EPSILON, "Mid humidity is pure neutral");
    }

    #[test]
    fn test_edge_noise_does_not_reach_plateau_interiors() {
        let t = HumidityThresholds::default();
        // 0.5 is far from both thresholds (band 0.1), so even maximal
        // noise must not move the weights.
        let clean = humidity_weights(0.5, &t, 0.0);
        let noisy = humidity_weights(0.5, &t, 1.0);
        assert_eq!(clean, noisy, "Noise must be masked away from thresholds");
    }

    #[test]
    fn test_edge_noise_moves_the_boundary() {
        let t = HumidityThresholds::default();
        let clean = humidity_weights(t.dry_max, &t, 0.0);
        let noisy = humidity_weights(t.dry_max, &t, 1.0);
        assert_ne!(clean, noisy, "On a threshold, noise must perturb the fade");
    }

    #[test]
    fn test_distance_blend_endpoints_for_various_curves() {
        for curve in [0.2, 0.5, 1.0, 2.0, 7.5] {
            assert_eq!(distance_blend_factor(30.0, 30.0, 180.0, curve), 0.0);
            assert_eq!(distance_blend_factor(180.0, 30.0, 180.0, curve), 1.0);
            assert_eq!(distance_blend_factor(0.0, 30.0, 180.0, curve), 0.0);
            assert_eq!(distance_blend_factor(500.0, 30.0, 180.0, curve), 1.0);
        }
    }

    #[test]
    fn test_distance_blend_is_monotonic() {
        let mut prev = 0.0;
        for i in 0..=100 {
            let d = i as f32 * 2.0;
            let f = distance_blend_factor(d, 30.0, 180.0, 2.0);
            assert!(f >= prev);
            prev = f;
        }
    }

    #[test]
    fn test_anti_tile_cell_is_stable_and_varied() {
        let (rot_a, off_a) = anti_tile_cell(3, -7);
        let (rot_b, off_b) = anti_tile_cell(3, -7);
        assert_eq!(rot_a, rot_b);
        assert_eq!(off_a, off_b);

        let mut rotations = Vec::new();
        for x in 0..16 {
            for y in 0..16 {
                rotations.push(anti_tile_cell(x, y).0);
            }
        }
        rotations.sort_by(|a, b| a.partial_cmp(b).unwrap());
        rotations.dedup();
        assert!(
            rotations.len() > 200,
            "Neighboring cells should get distinct rotations, got {} unique",
            rotations.len()
        );
    }

    #[test]
    fn test_srgb_round_trip() {
        for i in 0..=100 {
            let c = i as f32 / 100.0;
            let rt = linear_to_srgb(srgb_to_linear(c));
            assert!((rt - c).abs() < 1e-4, "Round trip drifted at {c}: {rt}");
        }
    }

    #[test]
    fn test_blend_colors_endpoints() {
        let a = [1.0, 0.0, 0.2];
        let b = [0.0, 1.0, 0.8];
        assert_eq!(blend_colors(a, b, 0.0), a);
        assert_eq!(blend_colors(a, b, 1.0), b);
        let mid = blend_colors(a, b, 0.5);
        assert!((mid[0] - 0.5).abs() < EPSILON);
        assert!((mid[2] - 0.5).abs() < EPSILON);
    }
}
