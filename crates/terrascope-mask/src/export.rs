//! Packed mask export format.
//!
//! One texel per mask sample: R = primary biome id, G = secondary biome
//! id, B = blend weight toward secondary, A = humidity. The `bounds`
//! rectangle maps texel space to world XZ.

use thiserror::Error;

/// Mask-layer errors. Shape mismatches are the only fallible case; all
/// numeric inputs are clamped, never rejected.
#[derive(Debug, Error)]
pub enum MaskError {
    #[error("mask export {buffer} buffer has {actual} elements, expected {expected} for {width}x{height}")]
    ShapeMismatch {
        buffer: &'static str,
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// World-space rectangle covered by a mask export.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MaskBounds {
    pub min_x: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_z: f64,
}

/// Guard against zero-size bounds producing a divide-by-zero when
/// mapping world coordinates to texels.
const MIN_SPAN: f64 = 1e-6;

impl MaskBounds {
    pub fn width(&self) -> f64 {
        (self.max_x - self.min_x).max(MIN_SPAN)
    }

    pub fn depth(&self) -> f64 {
        (self.max_z - self.min_z).max(MIN_SPAN)
    }

    /// Normalized [0,1] position of a world point inside the bounds,
    /// clamped at the edges like the shader's mask lookup.
    pub fn normalize(&self, x: f64, z: f64) -> (f64, f64) {
        let u = ((x - self.min_x) / self.width()).clamp(0.0, 1.0);
        let v = ((z - self.min_z) / self.depth()).clamp(0.0, 1.0);
        (u, v)
    }
}

/// Auxiliary per-texel channels some debug modes visualize.
#[derive(Clone, Debug, Default)]
pub struct TransitionDebug {
    /// Transition falloff weight per texel, in [0, 1].
    pub falloff_weight: Vec<f32>,
    /// Signed boundary noise offset per texel, meters.
    pub noise_offset_m: Vec<f32>,
}

/// One decoded mask texel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaskSample {
    pub patch_id: u32,
    pub primary_biome: u8,
    pub secondary_biome: u8,
    /// Blend weight toward the secondary biome, in [0, 1].
    pub biome_blend: f32,
    /// Humidity, in [0, 1].
    pub humidity: f32,
}

/// A complete packed export from the mask engine.
#[derive(Clone, Debug)]
pub struct PackedMaskExport {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8, `width · height · 4` bytes.
    pub rgba: Vec<u8>,
    /// Row-major patch ids, `width · height` entries.
    pub patch_ids: Vec<u32>,
    pub bounds: MaskBounds,
    pub transition_debug: Option<TransitionDebug>,
}

impl PackedMaskExport {
    /// Check every buffer against the declared resolution.
    ///
    /// A failed validation means the export must be discarded and the
    /// previous one kept; indexing a short buffer would panic later.
    pub fn validate(&self) -> Result<(), MaskError> {
        let texels = self.width as usize * self.height as usize;
        let mismatch = |buffer, expected, actual| MaskError::ShapeMismatch {
            buffer,
            width: self.width,
            height: self.height,
            expected,
            actual,
        };

        if self.rgba.len() != texels * 4 {
            return Err(mismatch("rgba", texels * 4, self.rgba.len()));
        }
        if self.patch_ids.len() != texels {
            return Err(mismatch("patch_ids", texels, self.patch_ids.len()));
        }
        if let Some(debug) = &self.transition_debug {
            if debug.falloff_weight.len() != texels {
                return Err(mismatch("falloff_weight", texels, debug.falloff_weight.len()));
            }
            if debug.noise_offset_m.len() != texels {
                return Err(mismatch("noise_offset_m", texels, debug.noise_offset_m.len()));
            }
        }
        Ok(())
    }

    /// Decode the texel at (x, y). Callers must have validated the
    /// export; coordinates are clamped into range.
    pub fn texel(&self, x: u32, y: u32) -> MaskSample {
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        let i = (y * self.width + x) as usize;
        let p = &self.rgba[i * 4..i * 4 + 4];
        MaskSample {
            patch_id: self.patch_ids[i],
            primary_biome: p[0],
            secondary_biome: p[1],
            biome_blend: p[2] as f32 / 255.0,
            humidity: p[3] as f32 / 255.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn export_2x2() -> PackedMaskExport {
        PackedMaskExport {
            width: 2,
            height: 2,
            rgba: vec![
                0, 1, 0, 255, // stone/grass, no blend, fully wet
                1, 2, 128, 0, // grass/land, half blend, dry
                2, 0, 255, 64, //
                0, 0, 0, 0,
            ],
            patch_ids: vec![7, 7, 9, 9],
            bounds: MaskBounds {
                min_x: -10.0,
                min_z: -10.0,
                max_x: 10.0,
                max_z: 10.0,
            },
            transition_debug: None,
        }
    }

    #[test]
    fn test_validate_accepts_consistent_buffers() {
        assert!(export_2x2().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_rgba() {
        let mut export = export_2x2();
        export.rgba.truncate(12);
        assert!(export.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_short_patch_ids() {
        let mut export = export_2x2();
        export.patch_ids.pop();
        assert!(export.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_short_debug_channels() {
        let mut export = export_2x2();
        export.transition_debug = Some(TransitionDebug {
            falloff_weight: vec![0.5; 3],
            noise_offset_m: vec![0.0; 4],
        });
        assert!(export.validate().is_err());
    }

    #[test]
    fn test_texel_decodes_channels() {
        let export = export_2x2();
        let s = export.texel(1, 0);
        assert_eq!(s.primary_biome, 1);
        assert_eq!(s.secondary_biome, 2);
        assert!((s.biome_blend - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(s.humidity, 0.0);
        assert_eq!(s.patch_id, 7);
    }

    #[test]
    fn test_bounds_normalize_clamps() {
        let bounds = export_2x2().bounds;
        assert_eq!(bounds.normalize(-10.0, -10.0), (0.0, 0.0));
        assert_eq!(bounds.normalize(10.0, 10.0), (1.0, 1.0));
        assert_eq!(bounds.normalize(-100.0, 100.0), (0.0, 1.0));
        let (u, v) = bounds.normalize(0.0, 5.0);
        assert!((u - 0.5).abs() < 1e-12);
        assert!((v - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_bounds_have_positive_span() {
        let bounds = MaskBounds::default();
        assert!(bounds.width() > 0.0);
        assert!(bounds.depth() > 0.0);
    }
}
