//! Interface to the external biome assignment engine, plus a
//! self-contained procedural stand-in so the tool runs without it.

use glam::DVec2;
use terrascope_noise::{Fbm, FbmParams};

use crate::export::{MaskBounds, MaskSample, PackedMaskExport, TransitionDebug};
use crate::BIOME_COUNT;

/// The narrow surface this tool consumes from the assignment engine.
///
/// The engine decides, per world position, which biome pair and humidity
/// apply. Everything else here (caching, decoding, uploading) treats the
/// engine as a black box behind this trait.
pub trait MaskEngine {
    /// Push the current export configuration into the engine. The
    /// default is a no-op for engines configured out of band.
    fn reconfigure(&mut self, _key: &crate::MaskConfigKey) {}

    /// Tell the engine where the camera is; exports are centered on it.
    fn set_view_origin(&mut self, origin: DVec2);

    /// Produce a packed RGBA8 mask at the requested resolution, centered
    /// on the view origin.
    fn export_packed_mask_rgba8(
        &mut self,
        width: u32,
        height: u32,
        view_origin: DVec2,
    ) -> PackedMaskExport;

    /// Point query for cursor/hover inspection.
    fn sample(&self, x: f64, z: f64) -> MaskSample;
}

/// Tunables for [`ProceduralMaskEngine`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProceduralMaskParams {
    pub seed: u64,
    /// Half-extent of the exported world rectangle, meters.
    pub half_extent_m: f64,
    /// Voronoi patch cell size, meters.
    pub cell_size_m: f64,
    /// Width of the blend band along patch boundaries, meters.
    pub transition_width_m: f64,
    /// Humidity noise frequency, cycles per meter.
    pub humidity_frequency: f64,
}

impl Default for ProceduralMaskParams {
    fn default() -> Self {
        Self {
            seed: 0,
            half_extent_m: 200.0,
            cell_size_m: 60.0,
            transition_width_m: 18.0,
            humidity_frequency: 0.004,
        }
    }
}

/// Deterministic noise-driven mask engine.
///
/// Patches are Voronoi cells over a jittered grid; each cell hashes to a
/// stable patch id and biome. The blend weight rises toward 0.5 at cell
/// boundaries, driven by the distance difference between the two nearest
/// cell centers. Humidity is low-frequency FBM. Good enough to exercise
/// every debug mode and the full texture path without the production
/// engine.
pub struct ProceduralMaskEngine {
    params: ProceduralMaskParams,
    humidity: Fbm,
    humidity_norm: f64,
    view_origin: DVec2,
}

impl ProceduralMaskEngine {
    pub fn new(params: ProceduralMaskParams) -> Self {
        let humidity = Fbm::new(params.seed ^ 0xA5A5_5A5A, FbmParams::default());
        let peak = humidity.max_amplitude();
        Self {
            params,
            humidity_norm: if peak > 0.0 { 1.0 / peak } else { 0.0 },
            humidity,
            view_origin: DVec2::ZERO,
        }
    }

    pub fn params(&self) -> &ProceduralMaskParams {
        &self.params
    }

    /// Jittered center of one Voronoi cell.
    fn cell_center(&self, cx: i64, cz: i64) -> DVec2 {
        let h = hash2(self.params.seed, cx, cz);
        let jx = (h & 0xFFFF) as f64 / 65536.0;
        let jz = ((h >> 16) & 0xFFFF) as f64 / 65536.0;
        let size = self.params.cell_size_m;
        DVec2::new(
            (cx as f64 + 0.2 + 0.6 * jx) * size,
            (cz as f64 + 0.2 + 0.6 * jz) * size,
        )
    }

    fn cell_patch_id(&self, cx: i64, cz: i64) -> u32 {
        (hash2(self.params.seed.wrapping_add(1), cx, cz) >> 32) as u32
    }

    fn cell_biome(&self, cx: i64, cz: i64) -> u8 {
        (hash2(self.params.seed.wrapping_add(2), cx, cz) % BIOME_COUNT as u64) as u8
    }

    /// The two nearest cells to a world point, searched over the 3x3
    /// neighborhood (sufficient for jitter confined to the cell).
    fn nearest_two(&self, p: DVec2) -> ((i64, i64, f64), (i64, i64, f64)) {
        let size = self.params.cell_size_m;
        let cx = (p.x / size).floor() as i64;
        let cz = (p.y / size).floor() as i64;

        let mut best = (cx, cz, f64::INFINITY);
        let mut second = (cx, cz, f64::INFINITY);
        for dz in -1..=1 {
            for dx in -1..=1 {
                let (nx, nz) = (cx + dx, cz + dz);
                let d = p.distance(self.cell_center(nx, nz));
                if d < best.2 {
                    second = best;
                    best = (nx, nz, d);
                } else if d < second.2 {
                    second = (nx, nz, d);
                }
            }
        }
        (best, second)
    }

    /// Falloff weight in [0, 1]: 1 on the boundary, 0 a transition-width
    /// away from it.
    fn falloff(&self, d_best: f64, d_second: f64) -> f64 {
        let w = self.params.transition_width_m.max(1e-6);
        (1.0 - (d_second - d_best) / w).clamp(0.0, 1.0)
    }

    fn humidity_at(&self, x: f64, z: f64) -> f64 {
        let f = self.params.humidity_frequency;
        (self.humidity.sample(x * f, z * f) * self.humidity_norm).clamp(0.0, 1.0)
    }
}

impl MaskEngine for ProceduralMaskEngine {
    fn reconfigure(&mut self, key: &crate::MaskConfigKey) {
        let params = ProceduralMaskParams {
            seed: key.seed,
            half_extent_m: key.half_extent_m,
            cell_size_m: key.cell_size_m,
            transition_width_m: key.transition_width_m,
            humidity_frequency: key.humidity_frequency,
        };
        if params != self.params {
            *self = Self::new(params);
        }
    }

    fn set_view_origin(&mut self, origin: DVec2) {
        self.view_origin = origin;
    }

    fn export_packed_mask_rgba8(
        &mut self,
        width: u32,
        height: u32,
        view_origin: DVec2,
    ) -> PackedMaskExport {
        self.view_origin = view_origin;
        let half = self.params.half_extent_m;
        let bounds = MaskBounds {
            min_x: view_origin.x - half,
            min_z: view_origin.y - half,
            max_x: view_origin.x + half,
            max_z: view_origin.y + half,
        };

        let texels = width as usize * height as usize;
        let mut rgba = Vec::with_capacity(texels * 4);
        let mut patch_ids = Vec::with_capacity(texels);
        let mut falloff_weight = Vec::with_capacity(texels);
        let mut noise_offset_m = Vec::with_capacity(texels);

        for ty in 0..height {
            // Texel centers, so a 1-texel export samples the middle.
            let v = (ty as f64 + 0.5) / height as f64;
            let z = bounds.min_z + v * bounds.depth();
            for tx in 0..width {
                let u = (tx as f64 + 0.5) / width as f64;
                let x = bounds.min_x + u * bounds.width();

                let s = self.sample(x, z);
                rgba.extend_from_slice(&[
                    s.primary_biome,
                    s.secondary_biome,
                    (s.biome_blend * 255.0).round() as u8,
                    (s.humidity * 255.0).round() as u8,
                ]);
                patch_ids.push(s.patch_id);

                let (best, second) = self.nearest_two(DVec2::new(x, z));
                let falloff = self.falloff(best.2, second.2);
                falloff_weight.push(falloff as f32);
                // Signed boundary offset: how far the noise-free boundary
                // would move, scaled by humidity detail for variety.
                let offset = (self.humidity_at(x * 3.0, z * 3.0) - 0.5)
                    * self.params.transition_width_m
                    * falloff;
                noise_offset_m.push(offset as f32);
            }
        }

        PackedMaskExport {
            width,
            height,
            rgba,
            patch_ids,
            bounds,
            transition_debug: Some(TransitionDebug {
                falloff_weight,
                noise_offset_m,
            }),
        }
    }

    fn sample(&self, x: f64, z: f64) -> MaskSample {
        let p = DVec2::new(x, z);
        let (best, second) = self.nearest_two(p);
        let primary = self.cell_biome(best.0, best.1);
        let secondary = self.cell_biome(second.0, second.1);
        // Weight toward the neighbor peaks at 0.5 on the boundary itself.
        let blend = if primary == secondary {
            0.0
        } else {
            0.5 * self.falloff(best.2, second.2)
        };
        MaskSample {
            patch_id: self.cell_patch_id(best.0, best.1),
            primary_biome: primary,
            secondary_biome: secondary,
            biome_blend: blend as f32,
            humidity: self.humidity_at(x, z) as f32,
        }
    }
}

fn hash2(seed: u64, x: i64, y: i64) -> u64 {
    let mut h = seed
        .wrapping_add((x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add((y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F));
    h ^= h >> 30;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 27;
    h.wrapping_mul(0x94D0_49BB_1331_11EB)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_is_deterministic() {
        let mut a = ProceduralMaskEngine::new(ProceduralMaskParams::default());
        let mut b = ProceduralMaskEngine::new(ProceduralMaskParams::default());
        let ea = a.export_packed_mask_rgba8(32, 32, DVec2::new(10.0, -5.0));
        let eb = b.export_packed_mask_rgba8(32, 32, DVec2::new(10.0, -5.0));
        assert_eq!(ea.rgba, eb.rgba);
        assert_eq!(ea.patch_ids, eb.patch_ids);
    }

    #[test]
    fn test_export_validates_and_is_centered_on_view() {
        let mut engine = ProceduralMaskEngine::new(ProceduralMaskParams::default());
        let export = engine.export_packed_mask_rgba8(16, 8, DVec2::new(100.0, 50.0));
        assert!(export.validate().is_ok());
        assert_eq!(export.bounds.min_x, -100.0);
        assert_eq!(export.bounds.max_x, 300.0);
        assert_eq!(export.bounds.min_z, -150.0);
        assert_eq!(export.bounds.max_z, 250.0);
    }

    #[test]
    fn test_biome_ids_in_range() {
        let mut engine = ProceduralMaskEngine::new(ProceduralMaskParams::default());
        let export = engine.export_packed_mask_rgba8(64, 64, DVec2::ZERO);
        for texel in export.rgba.chunks_exact(4) {
            assert!((texel[0] as usize) < BIOME_COUNT);
            assert!((texel[1] as usize) < BIOME_COUNT);
        }
    }

    #[test]
    fn test_sample_matches_export_texel_biomes() {
        let mut engine = ProceduralMaskEngine::new(ProceduralMaskParams::default());
        let export = engine.export_packed_mask_rgba8(32, 32, DVec2::ZERO);
        // Recompute a few texels via the point API at the texel centers.
        for (tx, ty) in [(0u32, 0u32), (15, 7), (31, 31), (8, 20)] {
            let u = (tx as f64 + 0.5) / 32.0;
            let v = (ty as f64 + 0.5) / 32.0;
            let x = export.bounds.min_x + u * export.bounds.width();
            let z = export.bounds.min_z + v * export.bounds.depth();
            let s = engine.sample(x, z);
            let t = export.texel(tx, ty);
            assert_eq!(s.primary_biome, t.primary_biome);
            assert_eq!(s.patch_id, t.patch_id);
        }
    }

    #[test]
    fn test_distinct_seeds_change_patch_layout() {
        let mut a = ProceduralMaskEngine::new(ProceduralMaskParams::default());
        let mut b = ProceduralMaskEngine::new(ProceduralMaskParams {
            seed: 77,
            ..Default::default()
        });
        let ea = a.export_packed_mask_rgba8(32, 32, DVec2::ZERO);
        let eb = b.export_packed_mask_rgba8(32, 32, DVec2::ZERO);
        assert_ne!(ea.patch_ids, eb.patch_ids);
    }

    #[test]
    fn test_blend_peaks_at_half_on_boundaries() {
        let mut engine = ProceduralMaskEngine::new(ProceduralMaskParams::default());
        let export = engine.export_packed_mask_rgba8(64, 64, DVec2::ZERO);
        for texel in export.rgba.chunks_exact(4) {
            assert!(texel[2] <= 128, "Blend channel caps at 0.5, got {}", texel[2]);
        }
    }
}
