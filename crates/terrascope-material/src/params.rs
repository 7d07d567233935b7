//! Blend parameter structs and the parameter-shape cache key.

use crate::shader::SHADER_VERSION;

/// Which half of the distance-tiling blend to display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TilingDebugView {
    #[default]
    Blended,
    NearOnly,
    FarOnly,
}

/// Distance-adaptive UV tiling: a near scale up close, a far scale in
/// the distance, cross-faded over a configurable range with a power
/// curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceTiling {
    pub enabled: bool,
    /// UV scale multiplier near the camera.
    pub near_scale: f32,
    /// UV scale multiplier far away (usually < near for fewer repeats).
    pub far_scale: f32,
    /// Camera distance where the blend starts, meters.
    pub blend_start_m: f32,
    /// Camera distance where the blend ends, meters.
    pub blend_end_m: f32,
    /// Power applied to the normalized blend factor; > 0.
    pub blend_curve: f32,
    pub debug_view: TilingDebugView,
}

impl Default for DistanceTiling {
    fn default() -> Self {
        Self {
            enabled: true,
            near_scale: 1.0,
            far_scale: 0.25,
            blend_start_m: 30.0,
            blend_end_m: 180.0,
            blend_curve: 1.0,
            debug_view: TilingDebugView::Blended,
        }
    }
}

impl DistanceTiling {
    pub fn clamped(&self) -> Self {
        let mut t = *self;
        t.near_scale = t.near_scale.clamp(0.01, 64.0);
        t.far_scale = t.far_scale.clamp(0.01, 64.0);
        t.blend_start_m = t.blend_start_m.clamp(0.0, 10_000.0);
        t.blend_end_m = t.blend_end_m.max(t.blend_start_m + 0.1);
        t.blend_curve = t.blend_curve.clamp(0.01, 8.0);
        t
    }
}

/// Per-cell UV rotation and offset that de-correlates texture repeats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AntiTiling {
    pub enabled: bool,
    /// Cross-blend strength between original and transformed samples.
    pub strength: f32,
    /// De-correlation cell size, meters.
    pub cell_size_m: f32,
}

impl Default for AntiTiling {
    fn default() -> Self {
        Self {
            enabled: true,
            strength: 0.6,
            cell_size_m: 12.0,
        }
    }
}

impl AntiTiling {
    pub fn clamped(&self) -> Self {
        let mut a = *self;
        a.strength = a.strength.clamp(0.0, 1.0);
        a.cell_size_m = a.cell_size_m.clamp(0.5, 1000.0);
        a
    }
}

/// Low-frequency brightness modulation hiding large-scale repetition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MacroVariation {
    pub enabled: bool,
    pub strength: f32,
    /// Noise frequency, cycles per meter.
    pub frequency: f32,
}

impl Default for MacroVariation {
    fn default() -> Self {
        Self {
            enabled: true,
            strength: 0.25,
            frequency: 0.01,
        }
    }
}

impl MacroVariation {
    pub fn clamped(&self) -> Self {
        let mut m = *self;
        m.strength = m.strength.clamp(0.0, 1.0);
        m.frequency = m.frequency.clamp(1e-5, 1.0);
        m
    }
}

/// How strongly the variation effects apply near vs. far.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VariationIntensity {
    pub near: f32,
    pub far: f32,
}

impl Default for VariationIntensity {
    fn default() -> Self {
        Self { near: 1.0, far: 0.5 }
    }
}

impl VariationIntensity {
    pub fn clamped(&self) -> Self {
        Self {
            near: self.near.clamp(0.0, 2.0),
            far: self.far.clamp(0.0, 2.0),
        }
    }
}

/// Humidity partition thresholds.
///
/// `wet_min` is clamped to stay at least 0.02 above `dry_max`. What the
/// partition "should" do when a user drags the two thresholds on top of
/// each other is implementation-defined; the clamp just keeps the three
/// buckets ordered and the cross-fades non-overlapping in intent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HumidityThresholds {
    /// Humidity at the center of the dry→neutral cross-fade.
    pub dry_max: f32,
    /// Humidity at the center of the neutral→wet cross-fade.
    pub wet_min: f32,
    /// Full width of each cross-fade band.
    pub band_width: f32,
    /// Strength of the boundary-roughening noise, in humidity units.
    pub edge_noise_strength: f32,
}

impl Default for HumidityThresholds {
    fn default() -> Self {
        Self {
            dry_max: 0.35,
            wet_min: 0.65,
            band_width: 0.1,
            edge_noise_strength: 0.05,
        }
    }
}

impl HumidityThresholds {
    pub fn clamped(&self) -> Self {
        let mut t = *self;
        t.dry_max = t.dry_max.clamp(0.0, 0.95);
        t.wet_min = t.wet_min.clamp(t.dry_max + 0.02, 1.0);
        t.band_width = t.band_width.clamp(0.001, 0.5);
        t.edge_noise_strength = t.edge_noise_strength.clamp(0.0, 0.5);
        t
    }
}

/// Everything the blend shader is parameterized by.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BlendParameters {
    pub tiling: DistanceTiling,
    pub anti_tiling: AntiTiling,
    pub macro_variation: MacroVariation,
    pub intensity: VariationIntensity,
    pub humidity: HumidityThresholds,
}

impl BlendParameters {
    pub fn clamped(&self) -> Self {
        Self {
            tiling: self.tiling.clamped(),
            anti_tiling: self.anti_tiling.clamped(),
            macro_variation: self.macro_variation.clamped(),
            intensity: self.intensity.clamped(),
            humidity: self.humidity.clamped(),
        }
    }

    /// The parameter *shape*: the subset of state that changes the
    /// composed shader source. Value edits (sliders) share a shape and
    /// only rewrite uniforms; toggling a feature or the shader version
    /// produces a new shape and forces recompilation.
    pub fn shape_key(&self) -> ShaderShape {
        ShaderShape {
            tiling_enabled: self.tiling.enabled,
            anti_tiling_enabled: self.anti_tiling.enabled,
            macro_enabled: self.macro_variation.enabled,
            debug_view: self.tiling.debug_view,
            shader_version: SHADER_VERSION,
        }
    }
}

/// Pipeline cache key; see [`BlendParameters::shape_key`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShaderShape {
    pub tiling_enabled: bool,
    pub anti_tiling_enabled: bool,
    pub macro_enabled: bool,
    pub debug_view: TilingDebugView,
    pub shader_version: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wet_min_stays_above_dry_max() {
        let t = HumidityThresholds {
            dry_max: 0.6,
            wet_min: 0.1,
            ..Default::default()
        }
        .clamped();
        assert!(
            t.wet_min >= t.dry_max + 0.02,
            "Thresholds must stay ordered: dry_max {} wet_min {}",
            t.dry_max,
            t.wet_min
        );
    }

    #[test]
    fn test_blend_end_stays_past_blend_start() {
        let t = DistanceTiling {
            blend_start_m: 100.0,
            blend_end_m: 50.0,
            ..Default::default()
        }
        .clamped();
        assert!(t.blend_end_m > t.blend_start_m);
    }

    #[test]
    fn test_value_changes_share_a_shape() {
        let a = BlendParameters::default();
        let mut b = a;
        b.tiling.near_scale = 4.0;
        b.humidity.dry_max = 0.2;
        b.anti_tiling.strength = 0.9;
        assert_eq!(
            a.shape_key(),
            b.shape_key(),
            "Slider edits must not force shader recompilation"
        );
    }

    #[test]
    fn test_feature_toggles_change_the_shape() {
        let a = BlendParameters::default();
        let mut b = a;
        b.anti_tiling.enabled = !b.anti_tiling.enabled;
        assert_ne!(a.shape_key(), b.shape_key());

        let mut c = a;
        c.tiling.debug_view = TilingDebugView::FarOnly;
        assert_ne!(a.shape_key(), c.shape_key());
    }

    #[test]
    fn test_clamped_is_idempotent() {
        let p = BlendParameters {
            tiling: DistanceTiling {
                near_scale: -5.0,
                blend_curve: 100.0,
                ..Default::default()
            },
            humidity: HumidityThresholds {
                dry_max: 2.0,
                wet_min: -1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let once = p.clamped();
        assert_eq!(once, once.clamped());
    }
}
