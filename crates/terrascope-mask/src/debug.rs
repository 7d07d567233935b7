//! False-color debug renderings of a packed mask export.
//!
//! Each mode reads the export and produces a standalone RGBA8 image;
//! none of them touch the export or the mesh. The images are meant for
//! human eyes (overlay or inspector panel), not for the shader.

use crate::export::PackedMaskExport;

/// Representative colors per biome id: stone gray, grass green, land tan.
pub const REPRESENTATIVE_COLORS: [[u8; 3]; 3] = [
    [128, 128, 128],
    [96, 160, 72],
    [196, 172, 120],
];

/// Humidity ramp endpoints: dry ochre, neutral green, wet blue.
const HUMIDITY_DRY: [u8; 3] = [181, 137, 60];
const HUMIDITY_NEUTRAL: [u8; 3] = [120, 158, 92];
const HUMIDITY_WET: [u8; 3] = [58, 112, 181];

/// Intensity factor for texels outside the isolated pair.
const ISOLATION_DIM: f32 = 0.18;

/// A row-major RGBA8 image produced by the debug decoders.
#[derive(Clone, Debug, PartialEq)]
pub struct DebugImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl DebugImage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x < self.width && y < self.height {
            let i = (y * self.width + x) as usize * 4;
            self.pixels[i..i + 4].copy_from_slice(&rgba);
        }
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y * self.width + x) as usize * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

/// The supported false-color visualizations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DebugMode {
    BiomeId,
    Humidity,
    TransitionBand,
    TransitionResult,
    TransitionWeight,
    TransitionFalloff,
    TransitionNoise,
    PairIsolation,
    PatchIds,
}

impl DebugMode {
    /// Whether camera movement alone should trigger a mask re-export.
    /// Modes that visualize the live export around the camera need fresh
    /// data as the view moves; the rest are stable for a fixed config.
    pub fn is_view_dependent(&self) -> bool {
        matches!(
            self,
            DebugMode::PatchIds | DebugMode::TransitionFalloff | DebugMode::TransitionNoise
        )
    }
}

/// Decode parameters shared across modes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodeOptions {
    /// Humidity below this is fully dry.
    pub dry_max: f32,
    /// Humidity above this is fully wet.
    pub wet_min: f32,
    /// Width of the humidity cross-fade band.
    pub band_width: f32,
    /// Biome pair highlighted by [`DebugMode::PairIsolation`].
    pub isolation_pair: (u8, u8),
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            dry_max: 0.35,
            wet_min: 0.65,
            band_width: 0.1,
            isolation_pair: (1, 2),
        }
    }
}

/// Render one export in the requested mode.
pub fn decode_debug_texture(
    export: &PackedMaskExport,
    mode: DebugMode,
    options: &DecodeOptions,
) -> DebugImage {
    let mut image = DebugImage::new(export.width, export.height);

    // TransitionNoise normalizes against the largest magnitude actually
    // present, so the ramp always uses its full range.
    let noise_scale = match (mode, &export.transition_debug) {
        (DebugMode::TransitionNoise, Some(debug)) => {
            let max = debug
                .noise_offset_m
                .iter()
                .fold(0.0f32, |m, v| m.max(v.abs()));
            if max > 0.0 { 1.0 / max } else { 0.0 }
        }
        _ => 0.0,
    };

    for y in 0..export.height {
        for x in 0..export.width {
            let rgba = decode_texel(export, x, y, mode, options, noise_scale);
            image.set_pixel(x, y, rgba);
        }
    }
    image
}

fn decode_texel(
    export: &PackedMaskExport,
    x: u32,
    y: u32,
    mode: DebugMode,
    options: &DecodeOptions,
    noise_scale: f32,
) -> [u8; 4] {
    let s = export.texel(x, y);
    let index = (y * export.width + x) as usize;

    match mode {
        DebugMode::BiomeId => opaque(representative(s.primary_biome)),
        DebugMode::Humidity => opaque(humidity_ramp(s.humidity)),
        DebugMode::TransitionBand => {
            let biome_edge = 4.0 * s.biome_blend * (1.0 - s.biome_blend);
            let humidity_edge = humidity_edge_intensity(s.humidity, options);
            grayscale(biome_edge.max(humidity_edge))
        }
        DebugMode::TransitionResult => opaque(pair_blend(s.primary_biome, s.secondary_biome, s.biome_blend)),
        DebugMode::TransitionWeight => grayscale(s.biome_blend),
        DebugMode::TransitionFalloff => match &export.transition_debug {
            Some(debug) => grayscale(debug.falloff_weight[index]),
            None => [0, 0, 0, 255],
        },
        DebugMode::TransitionNoise => match &export.transition_debug {
            Some(debug) => diverging(debug.noise_offset_m[index] * noise_scale),
            None => [0, 0, 0, 255],
        },
        DebugMode::PairIsolation => {
            let color = pair_blend(s.primary_biome, s.secondary_biome, s.biome_blend);
            let (a, b) = options.isolation_pair;
            let matches = (s.primary_biome, s.secondary_biome) == (a, b)
                || (s.primary_biome, s.secondary_biome) == (b, a);
            if matches {
                opaque(color)
            } else {
                opaque(color.map(|c| (c as f32 * ISOLATION_DIM) as u8))
            }
        }
        DebugMode::PatchIds => {
            let boundary = (x > 0 && export.texel(x - 1, y).patch_id != s.patch_id)
                || (y > 0 && export.texel(x, y - 1).patch_id != s.patch_id);
            if boundary {
                [0, 0, 0, 255]
            } else {
                opaque(patch_color(s.patch_id))
            }
        }
    }
}

/// Render two exports side by side, baseline left, current right,
/// separated by a single white column. Both halves use the transition
/// result rendering so profile changes show as color shifts.
pub fn decode_pair_compare(
    baseline: &PackedMaskExport,
    current: &PackedMaskExport,
    options: &DecodeOptions,
) -> DebugImage {
    let left = decode_debug_texture(baseline, DebugMode::TransitionResult, options);
    let right = decode_debug_texture(current, DebugMode::TransitionResult, options);

    let (lw, lh) = left.dimensions();
    let (rw, rh) = right.dimensions();
    let height = lh.max(rh);
    let mut image = DebugImage::new(lw + 1 + rw, height);

    for y in 0..height {
        for x in 0..lw {
            if y < lh {
                image.set_pixel(x, y, left.get_pixel(x, y));
            }
        }
        image.set_pixel(lw, y, [255, 255, 255, 255]);
        for x in 0..rw {
            if y < rh {
                image.set_pixel(lw + 1 + x, y, right.get_pixel(x, y));
            }
        }
    }
    image
}

fn representative(biome: u8) -> [u8; 3] {
    REPRESENTATIVE_COLORS[(biome as usize).min(REPRESENTATIVE_COLORS.len() - 1)]
}

fn opaque(rgb: [u8; 3]) -> [u8; 4] {
    [rgb[0], rgb[1], rgb[2], 255]
}

fn grayscale(v: f32) -> [u8; 4] {
    let g = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    [g, g, g, 255]
}

fn lerp_rgb(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    std::array::from_fn(|i| (a[i] as f32 + (b[i] as f32 - a[i] as f32) * t).round() as u8)
}

/// Two-segment ramp: dry at 0, neutral at 0.5, wet at 1.
fn humidity_ramp(h: f32) -> [u8; 3] {
    if h < 0.5 {
        lerp_rgb(HUMIDITY_DRY, HUMIDITY_NEUTRAL, h * 2.0)
    } else {
        lerp_rgb(HUMIDITY_NEUTRAL, HUMIDITY_WET, (h - 0.5) * 2.0)
    }
}

/// 1 at a humidity threshold, falling to 0 half a band away.
fn humidity_edge_intensity(h: f32, options: &DecodeOptions) -> f32 {
    let half_band = (options.band_width * 0.5).max(1e-6);
    let near_dry = 1.0 - (h - options.dry_max).abs() / half_band;
    let near_wet = 1.0 - (h - options.wet_min).abs() / half_band;
    near_dry.max(near_wet).clamp(0.0, 1.0)
}

/// Blend the representative colors of a biome pair, ordered by the
/// canonical (sorted) pair key so swapping primary and secondary yields
/// the same color.
fn pair_blend(primary: u8, secondary: u8, blend: f32) -> [u8; 3] {
    if primary <= secondary {
        lerp_rgb(representative(primary), representative(secondary), blend)
    } else {
        lerp_rgb(representative(secondary), representative(primary), 1.0 - blend)
    }
}

/// Diverging red/blue ramp over [-1, 1]: blue negative, red positive.
fn diverging(t: f32) -> [u8; 4] {
    let t = t.clamp(-1.0, 1.0);
    if t >= 0.0 {
        opaque(lerp_rgb([30, 30, 30], [230, 50, 40], t))
    } else {
        opaque(lerp_rgb([30, 30, 30], [50, 90, 230], -t))
    }
}

/// Stable pseudo-random color for a patch id.
fn patch_color(id: u32) -> [u8; 3] {
    let mut h = (id as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    h ^= h >> 29;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 32;
    // Keep channels out of the darkest range so cells read against the
    // black boundaries.
    [
        64 + (h & 0x7F) as u8 + ((h >> 21) & 0x3F) as u8,
        64 + ((h >> 7) & 0x7F) as u8 + ((h >> 27) & 0x3F) as u8,
        64 + ((h >> 14) & 0x7F) as u8 + ((h >> 33) & 0x3F) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{MaskBounds, TransitionDebug};

    fn export_with(rgba: Vec<u8>, patch_ids: Vec<u32>, width: u32, height: u32) -> PackedMaskExport {
        PackedMaskExport {
            width,
            height,
            rgba,
            patch_ids,
            bounds: MaskBounds {
                min_x: 0.0,
                min_z: 0.0,
                max_x: 1.0,
                max_z: 1.0,
            },
            transition_debug: None,
        }
    }

    #[test]
    fn test_biome_id_depends_only_on_r_channel() {
        let a = export_with(vec![1, 0, 0, 0, 2, 0, 0, 0], vec![0, 0], 2, 1);
        // Same R channel, scrambled G/B/A.
        let b = export_with(vec![1, 2, 200, 17, 2, 1, 9, 250], vec![5, 9], 2, 1);
        let opts = DecodeOptions::default();
        let img_a = decode_debug_texture(&a, DebugMode::BiomeId, &opts);
        let img_b = decode_debug_texture(&b, DebugMode::BiomeId, &opts);
        assert_eq!(
            img_a, img_b,
            "biome_id must depend only on the primary id channel"
        );
    }

    #[test]
    fn test_biome_id_is_idempotent() {
        let export = export_with(vec![0, 1, 40, 200, 1, 2, 90, 10], vec![1, 2], 2, 1);
        let opts = DecodeOptions::default();
        let first = decode_debug_texture(&export, DebugMode::BiomeId, &opts);
        let second = decode_debug_texture(&export, DebugMode::BiomeId, &opts);
        assert_eq!(first.pixels(), second.pixels());
    }

    #[test]
    fn test_biome_id_uses_representative_colors() {
        let export = export_with(vec![0, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0], vec![0; 3], 3, 1);
        let img = decode_debug_texture(&export, DebugMode::BiomeId, &DecodeOptions::default());
        for biome in 0..3u32 {
            let px = img.get_pixel(biome, 0);
            let expected = REPRESENTATIVE_COLORS[biome as usize];
            assert_eq!([px[0], px[1], px[2]], expected);
        }
    }

    #[test]
    fn test_humidity_ramp_endpoints_and_midpoint() {
        let export = export_with(
            vec![0, 0, 0, 0, 0, 0, 0, 128, 0, 0, 0, 255],
            vec![0; 3],
            3,
            1,
        );
        let img = decode_debug_texture(&export, DebugMode::Humidity, &DecodeOptions::default());
        let dry = img.get_pixel(0, 0);
        let wet = img.get_pixel(2, 0);
        assert_eq!([dry[0], dry[1], dry[2]], HUMIDITY_DRY);
        assert_eq!([wet[0], wet[1], wet[2]], HUMIDITY_WET);
        // Midpoint sits near the neutral color (128/255 is just past 0.5).
        let mid = img.get_pixel(1, 0);
        for (c, n) in mid.iter().take(3).zip(HUMIDITY_NEUTRAL) {
            assert!((*c as i32 - n as i32).abs() <= 2, "mid {mid:?} vs neutral");
        }
    }

    #[test]
    fn test_transition_weight_is_grayscale_blend() {
        let export = export_with(vec![0, 1, 0, 0, 0, 1, 255, 0], vec![0; 2], 2, 1);
        let img =
            decode_debug_texture(&export, DebugMode::TransitionWeight, &DecodeOptions::default());
        assert_eq!(img.get_pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(1, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_transition_band_peaks_at_half_blend() {
        // Humidity far from both thresholds so only the biome edge term
        // contributes: 4·0.5·0.5 = 1 at blend 128.
        let export = export_with(vec![0, 1, 128, 128, 0, 1, 0, 128], vec![0; 2], 2, 1);
        let img =
            decode_debug_texture(&export, DebugMode::TransitionBand, &DecodeOptions::default());
        let peak = img.get_pixel(0, 0)[0];
        let flat = img.get_pixel(1, 0)[0];
        assert!(peak >= 254, "Edge intensity at blend=0.5 should be ~1, got {peak}");
        assert_eq!(flat, 0);
    }

    #[test]
    fn test_transition_result_is_order_stable() {
        // (grass, land, 0.25) and (land, grass, 0.75) describe the same
        // physical mix and must render identically.
        let export = export_with(
            vec![1, 2, 64, 0, 2, 1, 191, 0],
            vec![0; 2],
            2,
            1,
        );
        let img =
            decode_debug_texture(&export, DebugMode::TransitionResult, &DecodeOptions::default());
        let a = img.get_pixel(0, 0);
        let b = img.get_pixel(1, 0);
        for i in 0..3 {
            assert!(
                (a[i] as i32 - b[i] as i32).abs() <= 1,
                "Swapped pair must render the same color: {a:?} vs {b:?}"
            );
        }
    }

    #[test]
    fn test_pair_isolation_dims_non_matching_texels() {
        // Texel 0: the isolated (grass, land) pair. Texel 1: same colors
        // possible but a (stone, stone) pair, must be dimmed.
        let export = export_with(vec![1, 2, 0, 0, 0, 0, 0, 0], vec![0; 2], 2, 1);
        let img =
            decode_debug_texture(&export, DebugMode::PairIsolation, &DecodeOptions::default());
        let kept = img.get_pixel(0, 0);
        let dimmed = img.get_pixel(1, 0);
        let undimmed_stone = REPRESENTATIVE_COLORS[0];
        for i in 0..3 {
            let ceiling = (undimmed_stone[i] as f32 * (ISOLATION_DIM + 0.01)) as u8;
            assert!(
                dimmed[i] <= ceiling,
                "Dimmed channel {} exceeds 18% of its own color: {} > {}",
                i,
                dimmed[i],
                ceiling
            );
        }
        assert_eq!([kept[0], kept[1], kept[2]], REPRESENTATIVE_COLORS[1]);
    }

    #[test]
    fn test_pair_isolation_is_order_independent() {
        let export = export_with(vec![1, 2, 10, 0, 2, 1, 10, 0], vec![0; 2], 2, 1);
        let img =
            decode_debug_texture(&export, DebugMode::PairIsolation, &DecodeOptions::default());
        // Both orderings of the isolated pair stay at full intensity.
        assert!(img.get_pixel(0, 0)[1] > 100);
        assert!(img.get_pixel(1, 0)[1] > 100);
    }

    #[test]
    fn test_patch_ids_marks_boundaries_black() {
        let export = export_with(vec![0u8; 16], vec![1, 1, 1, 2], 2, 2);
        let img = decode_debug_texture(&export, DebugMode::PatchIds, &DecodeOptions::default());
        // (1,1) has patch 2 with both neighbors in patch 1.
        assert_eq!(img.get_pixel(1, 1), [0, 0, 0, 255]);
        // (0,0) has no differing neighbor.
        assert_ne!(img.get_pixel(0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn test_patch_colors_are_stable_per_id() {
        let export = export_with(vec![0, 0, 0, 0, 0, 0, 0, 0], vec![42, 42], 2, 1);
        let img = decode_debug_texture(&export, DebugMode::PatchIds, &DecodeOptions::default());
        assert_eq!(img.get_pixel(0, 0), img.get_pixel(1, 0));
    }

    #[test]
    fn test_transition_noise_uses_observed_max() {
        let mut export = export_with(vec![0, 0, 0, 0, 0, 0, 0, 0], vec![0; 2], 2, 1);
        export.transition_debug = Some(TransitionDebug {
            falloff_weight: vec![0.0, 0.0],
            noise_offset_m: vec![2.0, -2.0],
        });
        let img =
            decode_debug_texture(&export, DebugMode::TransitionNoise, &DecodeOptions::default());
        let pos = img.get_pixel(0, 0);
        let neg = img.get_pixel(1, 0);
        assert!(pos[0] > pos[2], "Positive offsets render red: {pos:?}");
        assert!(neg[2] > neg[0], "Negative offsets render blue: {neg:?}");
    }

    #[test]
    fn test_pair_compare_has_white_divider_column() {
        let left = export_with(vec![0, 0, 0, 0, 1, 1, 0, 0], vec![0; 2], 2, 1);
        let right = export_with(vec![2, 2, 0, 0, 1, 2, 128, 0], vec![0; 2], 2, 1);
        let img = decode_pair_compare(&left, &right, &DecodeOptions::default());
        assert_eq!(img.dimensions(), (5, 1));
        assert_eq!(img.get_pixel(2, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_view_dependent_modes() {
        assert!(DebugMode::PatchIds.is_view_dependent());
        assert!(DebugMode::TransitionNoise.is_view_dependent());
        assert!(!DebugMode::BiomeId.is_view_dependent());
        assert!(!DebugMode::Humidity.is_view_dependent());
    }
}
