//! Caching layer between the mask engine and the GPU texture.
//!
//! Exports are expensive, so the manager only calls the engine when the
//! configuration actually changed, a dirty flag was raised, or (for
//! view-dependent debug modes) the camera moved far enough, throttled so
//! pure view movement cannot trigger more than ~4 exports per second.

use std::time::{Duration, Instant};

use glam::DVec2;
use tracing::warn;

use crate::debug::{DebugMode, REPRESENTATIVE_COLORS};
use crate::engine::MaskEngine;
use crate::export::{MaskBounds, PackedMaskExport};

/// Minimum delay between exports triggered by view movement alone.
const VIEW_THROTTLE: Duration = Duration::from_millis(250);

/// Camera quantization step: view movement below this never triggers a
/// re-export.
const VIEW_QUANTIZE_M: f64 = 25.0;

/// Every parameter that affects the engine's output, compared by
/// structural equality. Two keys that compare equal are guaranteed to
/// produce the same export, so equality doubles as the cache-hit test.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskConfigKey {
    pub seed: u64,
    /// Export resolution.
    pub width: u32,
    pub height: u32,
    pub half_extent_m: f64,
    pub cell_size_m: f64,
    pub transition_width_m: f64,
    pub humidity_frequency: f64,
    pub biome_weights: [f32; 3],
}

impl Default for MaskConfigKey {
    fn default() -> Self {
        Self {
            seed: 0,
            width: 256,
            height: 256,
            half_extent_m: 200.0,
            cell_size_m: 60.0,
            transition_width_m: 18.0,
            humidity_frequency: 0.004,
            biome_weights: [1.0, 1.0, 1.0],
        }
    }
}

/// Camera XZ snapped to a coarse grid. Consulted only for
/// view-dependent debug modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewKey {
    qx: i64,
    qz: i64,
}

impl ViewKey {
    pub fn quantize(origin: DVec2, step_m: f64) -> Self {
        let step = step_m.max(1e-6);
        Self {
            qx: (origin.x / step).floor() as i64,
            qz: (origin.y / step).floor() as i64,
        }
    }
}

/// Result of one manager tick: the export to render from, and whether
/// it was refreshed this tick (so the render layer knows to re-upload).
pub struct MaskTick<'a> {
    pub export: &'a PackedMaskExport,
    pub refreshed: bool,
}

pub struct MaskTextureManager {
    config_key: Option<MaskConfigKey>,
    view_key: Option<ViewKey>,
    dirty: bool,
    cached: Option<PackedMaskExport>,
    last_export: Option<Instant>,
    /// Per-biome RGBA fallback colors for slots whose texture failed to
    /// load. Owned here so their lifetime is the manager's, not the
    /// process's.
    fallback_colors: [[u8; 4]; 3],
}

impl Default for MaskTextureManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MaskTextureManager {
    pub fn new() -> Self {
        let fallback_colors =
            REPRESENTATIVE_COLORS.map(|[r, g, b]| [r, g, b, 255]);
        Self {
            config_key: None,
            view_key: None,
            dirty: false,
            cached: None,
            last_export: None,
            fallback_colors,
        }
    }

    /// Force a re-export on the next tick regardless of keys (source
    /// maps changed, engine reconfigured behind our back).
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Solid fallback color for a biome slot.
    pub fn fallback_color(&self, biome: u8) -> [u8; 4] {
        self.fallback_colors[(biome as usize).min(self.fallback_colors.len() - 1)]
    }

    /// The last valid export, if any tick has produced one.
    pub fn current(&self) -> Option<&PackedMaskExport> {
        self.cached.as_ref()
    }

    /// Per-frame entry point. At most one engine export per call.
    pub fn tick(
        &mut self,
        engine: &mut dyn MaskEngine,
        key: &MaskConfigKey,
        view_origin: DVec2,
        mode: DebugMode,
    ) -> MaskTick<'_> {
        self.tick_at(Instant::now(), engine, key, view_origin, mode)
    }

    /// [`Self::tick`] with an explicit clock, which is what tests drive.
    pub fn tick_at(
        &mut self,
        now: Instant,
        engine: &mut dyn MaskEngine,
        key: &MaskConfigKey,
        view_origin: DVec2,
        mode: DebugMode,
    ) -> MaskTick<'_> {
        let view_key = ViewKey::quantize(view_origin, VIEW_QUANTIZE_M);

        let config_changed = self.config_key.as_ref() != Some(key);
        let view_changed = mode.is_view_dependent() && self.view_key != Some(view_key);
        let throttle_open = self
            .last_export
            .is_none_or(|t| now.duration_since(t) >= VIEW_THROTTLE);

        let needs_export = self.cached.is_none()
            || config_changed
            || self.dirty
            || (view_changed && throttle_open);

        if needs_export {
            if config_changed {
                engine.reconfigure(key);
            }
            engine.set_view_origin(view_origin);
            let export = engine.export_packed_mask_rgba8(key.width, key.height, view_origin);
            match export.validate() {
                Ok(()) => {
                    self.store(export);
                    self.last_export = Some(now);
                }
                Err(e) => {
                    // Keep the previous texture; a torn export must never
                    // reach the GPU.
                    warn!(error = %e, "rejected mask export, keeping previous");
                    if self.cached.is_none() {
                        self.cached = Some(self.fallback_export());
                    }
                }
            }
            self.config_key = Some(key.clone());
            self.view_key = Some(view_key);
            self.dirty = false;

            return MaskTick {
                export: self.cached.as_ref().unwrap(),
                refreshed: true,
            };
        }

        MaskTick {
            export: self.cached.as_ref().unwrap(),
            refreshed: false,
        }
    }

    /// Replace the cached export, reusing the existing buffers when the
    /// resolution is unchanged so view-dependent modes don't churn
    /// allocations every export.
    fn store(&mut self, export: PackedMaskExport) {
        match &mut self.cached {
            Some(cached)
                if cached.width == export.width
                    && cached.height == export.height
                    && cached.transition_debug.is_some() == export.transition_debug.is_some() =>
            {
                cached.rgba.copy_from_slice(&export.rgba);
                cached.patch_ids.copy_from_slice(&export.patch_ids);
                cached.bounds = export.bounds;
                if let (Some(dst), Some(src)) =
                    (&mut cached.transition_debug, &export.transition_debug)
                {
                    dst.falloff_weight.copy_from_slice(&src.falloff_weight);
                    dst.noise_offset_m.copy_from_slice(&src.noise_offset_m);
                }
            }
            _ => self.cached = Some(export),
        }
    }

    /// Single stone-gray texel used only when the very first export is
    /// rejected, so the render path always has a valid texture.
    fn fallback_export(&self) -> PackedMaskExport {
        PackedMaskExport {
            width: 1,
            height: 1,
            rgba: vec![0, 0, 0, 128],
            patch_ids: vec![0],
            bounds: MaskBounds {
                min_x: -1.0,
                min_z: -1.0,
                max_x: 1.0,
                max_z: 1.0,
            },
            transition_debug: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ProceduralMaskEngine, ProceduralMaskParams};
    use crate::export::MaskSample;

    fn engine() -> ProceduralMaskEngine {
        ProceduralMaskEngine::new(ProceduralMaskParams::default())
    }

    fn key_64() -> MaskConfigKey {
        MaskConfigKey {
            width: 64,
            height: 64,
            ..Default::default()
        }
    }

    #[test]
    fn test_unchanged_keys_return_same_allocation() {
        let mut manager = MaskTextureManager::new();
        let mut engine = engine();
        let key = key_64();
        let t0 = Instant::now();

        let ptr_first = {
            let tick = manager.tick_at(t0, &mut engine, &key, DVec2::ZERO, DebugMode::BiomeId);
            assert!(tick.refreshed, "First tick must export");
            tick.export.rgba.as_ptr()
        };
        let tick = manager.tick_at(t0, &mut engine, &key, DVec2::ZERO, DebugMode::BiomeId);
        assert!(!tick.refreshed, "Unchanged key must not re-export");
        assert_eq!(
            tick.export.rgba.as_ptr(),
            ptr_first,
            "Cache hit must return the same pixel buffer, not a copy"
        );
    }

    #[test]
    fn test_config_change_triggers_reexport() {
        let mut manager = MaskTextureManager::new();
        let mut engine = engine();
        let t0 = Instant::now();

        manager.tick_at(t0, &mut engine, &key_64(), DVec2::ZERO, DebugMode::BiomeId);
        let changed = MaskConfigKey {
            seed: 5,
            ..key_64()
        };
        let tick = manager.tick_at(t0, &mut engine, &changed, DVec2::ZERO, DebugMode::BiomeId);
        assert!(tick.refreshed, "Seed change must invalidate the cache");
    }

    #[test]
    fn test_dirty_flag_forces_single_reexport() {
        let mut manager = MaskTextureManager::new();
        let mut engine = engine();
        let key = key_64();
        let t0 = Instant::now();

        manager.tick_at(t0, &mut engine, &key, DVec2::ZERO, DebugMode::BiomeId);
        manager.mark_dirty();
        let tick = manager.tick_at(t0, &mut engine, &key, DVec2::ZERO, DebugMode::BiomeId);
        assert!(tick.refreshed, "Dirty flag must force an export");
        let tick = manager.tick_at(t0, &mut engine, &key, DVec2::ZERO, DebugMode::BiomeId);
        assert!(!tick.refreshed, "Dirty flag clears after one export");
    }

    #[test]
    fn test_view_movement_ignored_for_view_independent_modes() {
        let mut manager = MaskTextureManager::new();
        let mut engine = engine();
        let key = key_64();
        let t0 = Instant::now();

        manager.tick_at(t0, &mut engine, &key, DVec2::ZERO, DebugMode::BiomeId);
        let far = DVec2::new(10_000.0, 10_000.0);
        let tick = manager.tick_at(
            t0 + Duration::from_secs(10),
            &mut engine,
            &key,
            far,
            DebugMode::BiomeId,
        );
        assert!(
            !tick.refreshed,
            "biome_id is view-independent; camera movement must not export"
        );
    }

    #[test]
    fn test_view_movement_throttled_for_view_dependent_modes() {
        let mut manager = MaskTextureManager::new();
        let mut engine = engine();
        let key = key_64();
        let t0 = Instant::now();

        manager.tick_at(t0, &mut engine, &key, DVec2::ZERO, DebugMode::PatchIds);

        // Big move immediately afterwards: view key changed, throttle shut.
        let moved = DVec2::new(500.0, 0.0);
        let tick = manager.tick_at(
            t0 + Duration::from_millis(50),
            &mut engine,
            &key,
            moved,
            DebugMode::PatchIds,
        );
        assert!(!tick.refreshed, "Within 250 ms view moves must coalesce");

        // Same move after the throttle window: export.
        let tick = manager.tick_at(
            t0 + Duration::from_millis(300),
            &mut engine,
            &key,
            moved,
            DebugMode::PatchIds,
        );
        assert!(tick.refreshed, "After the throttle the view change exports");
    }

    #[test]
    fn test_small_view_movement_below_quantization_never_exports() {
        let mut manager = MaskTextureManager::new();
        let mut engine = engine();
        let key = key_64();
        let t0 = Instant::now();

        manager.tick_at(t0, &mut engine, &key, DVec2::new(1.0, 1.0), DebugMode::PatchIds);
        let tick = manager.tick_at(
            t0 + Duration::from_secs(5),
            &mut engine,
            &key,
            DVec2::new(2.0, 3.0),
            DebugMode::PatchIds,
        );
        assert!(
            !tick.refreshed,
            "Sub-quantization camera jitter must not trigger exports"
        );
    }

    /// Engine double that always returns a torn buffer.
    struct BrokenEngine;

    impl MaskEngine for BrokenEngine {
        fn set_view_origin(&mut self, _origin: DVec2) {}

        fn export_packed_mask_rgba8(
            &mut self,
            width: u32,
            height: u32,
            _view_origin: DVec2,
        ) -> PackedMaskExport {
            PackedMaskExport {
                width,
                height,
                rgba: vec![0; 8], // wrong length for any real resolution
                patch_ids: vec![0; 2],
                bounds: MaskBounds::default(),
                transition_debug: None,
            }
        }

        fn sample(&self, _x: f64, _z: f64) -> MaskSample {
            MaskSample {
                patch_id: 0,
                primary_biome: 0,
                secondary_biome: 0,
                biome_blend: 0.0,
                humidity: 0.5,
            }
        }
    }

    #[test]
    fn test_rejected_export_keeps_previous_texture() {
        let mut manager = MaskTextureManager::new();
        let key = key_64();
        let t0 = Instant::now();

        let good_pixels = {
            let mut good = engine();
            let tick = manager.tick_at(t0, &mut good, &key, DVec2::ZERO, DebugMode::BiomeId);
            tick.export.rgba.clone()
        };

        manager.mark_dirty();
        let tick = manager.tick_at(t0, &mut BrokenEngine, &key, DVec2::ZERO, DebugMode::BiomeId);
        assert_eq!(
            tick.export.rgba, good_pixels,
            "A shape-mismatched export must leave the previous texture in place"
        );
    }

    #[test]
    fn test_rejected_first_export_falls_back_to_valid_texture() {
        let mut manager = MaskTextureManager::new();
        let key = key_64();
        let tick = manager.tick_at(
            Instant::now(),
            &mut BrokenEngine,
            &key,
            DVec2::ZERO,
            DebugMode::BiomeId,
        );
        assert!(tick.export.validate().is_ok(), "Fallback must be a valid export");
    }
}
