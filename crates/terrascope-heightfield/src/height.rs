//! Per-vertex height evaluation.
//!
//! Heights are composed from four contributions, evaluated in a fixed
//! order: hill slope, end slope, cloud displacement, road flattening.
//! The road blend runs last so the footprint is exactly flat regardless
//! of what the other stages produced there.

use terrascope_noise::{Fbm, FbmParams};

use crate::spec::TerrainSpec;

/// Hermite smoothstep from `edge0` to `edge1`.
///
/// A degenerate interval (`edge1 <= edge0`) collapses to a step
/// function: 0 below `edge0`, 1 at and above it. This keeps zero-width
/// blend settings well defined instead of dividing by zero.
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Evaluates the composed terrain height at any world (x, z).
///
/// Construction clamps the spec and precomputes slope tangents, side
/// ranges, and the noise sampler, so `height_at` is cheap enough to
/// call once per vertex on every rebuild.
pub struct HeightSampler {
    spec: TerrainSpec,
    tan_left: f64,
    tan_right: f64,
    tan_end: f64,
    /// Lateral distance from x=0 where the hill starts rising.
    shoulder: f64,
    /// Shoulder-to-grid-edge span on the −X side.
    left_range: f64,
    /// Shoulder-to-grid-edge span on the +X side.
    right_range: f64,
    /// World Z where the end slope begins.
    end_z: f64,
    /// World Z where cloud displacement starts fading in.
    cloud_start: f64,
    cloud_noise: Fbm,
    /// Reciprocal of the FBM peak, for normalizing to `amplitude_m`.
    cloud_norm: f64,
}

impl HeightSampler {
    pub fn new(spec: &TerrainSpec) -> Self {
        let spec = spec.clamped();

        let shoulder = if spec.road.enabled {
            spec.road.half_width_m
        } else {
            0.0
        };
        let left_range = (-spec.min_x() - shoulder).max(0.0);
        let right_range = (spec.max_x() - shoulder).max(0.0);

        let end_z =
            spec.road.z_end_m + spec.slope.end_slope_offset_tiles * spec.tile_size_m;
        let cloud_start = spec.max_z() - spec.cloud.affected_tiles * spec.tile_size_m;

        let cloud_noise = Fbm::new(spec.seed, FbmParams::default());
        let peak = cloud_noise.max_amplitude();
        let cloud_norm = if peak > 0.0 { 1.0 / peak } else { 0.0 };

        Self {
            tan_left: spec.slope.left_deg.to_radians().tan(),
            tan_right: spec.slope.right_deg.to_radians().tan(),
            tan_end: spec.slope.end_deg.to_radians().tan(),
            shoulder,
            left_range,
            right_range,
            end_z,
            cloud_start,
            cloud_noise,
            cloud_norm,
            spec,
        }
    }

    /// The clamped spec this sampler was built from.
    pub fn spec(&self) -> &TerrainSpec {
        &self.spec
    }

    /// Composed height at world (x, z), meters.
    pub fn height_at(&self, x: f64, z: f64) -> f64 {
        let mut h = self.hill_height(x);
        h += self.end_slope_height(z);
        h += self.cloud_displacement(x, z);

        if self.spec.road.enabled {
            let w = self.road_weight(x, z);
            h += (self.spec.road.base_elevation_m - h) * w;
        }
        h
    }

    /// Stage 1: lateral hill rising away from the road shoulder.
    ///
    /// A cubic-Hermite ease over `bottom_curve_m` meters blends from the
    /// flat valley floor into a straight slope: zero height and zero
    /// gradient at the shoulder, matching the linear section's value and
    /// gradient at the ease's far end. `top_flat_m` caps the rise short
    /// of the grid edge to leave a flat plateau.
    fn hill_height(&self, x: f64) -> f64 {
        let (tan, range) = if x < 0.0 {
            (self.tan_left, self.left_range)
        } else {
            (self.tan_right, self.right_range)
        };
        let d = x.abs() - self.shoulder;
        if d <= 0.0 || tan == 0.0 {
            return 0.0;
        }

        let plateau_start = (range - self.spec.slope.top_flat_m).max(0.0);
        let d = d.min(plateau_start);

        let curve = self.spec.slope.bottom_curve_m;
        if d < curve {
            let t = d / curve;
            tan * curve * (t * t * t - 0.5 * t * t * t * t)
        } else {
            tan * (d - 0.5 * curve)
        }
    }

    /// Stage 2: additive tilt along +Z past the end of the road, faded in
    /// over two tiles so it doesn't crease the valley floor.
    fn end_slope_height(&self, z: f64) -> f64 {
        if self.tan_end == 0.0 || z <= self.end_z {
            return 0.0;
        }
        let fade = smoothstep(
            self.end_z,
            self.end_z + 2.0 * self.spec.tile_size_m,
            z,
        );
        self.tan_end * (z - self.end_z) * fade
    }

    /// Stage 3: FBM bumps over the far rows of the grid.
    ///
    /// The raw octave sum is divided by the FBM peak so `amplitude_m` is
    /// the exact maximum displacement. The weight fades in over
    /// `blend_width_m` at the near edge of the affected region and drops
    /// to zero over the road footprint.
    fn cloud_displacement(&self, x: f64, z: f64) -> f64 {
        let cloud = &self.spec.cloud;
        if !cloud.enabled || cloud.amplitude_m <= 0.0 {
            return 0.0;
        }

        let far_fade = smoothstep(self.cloud_start, self.cloud_start + cloud.blend_width_m, z);
        if far_fade <= 0.0 {
            return 0.0;
        }

        let road_keep = if self.spec.road.enabled {
            smoothstep(
                self.spec.road.half_width_m,
                self.spec.road.half_width_m + self.spec.road.edge_blend_m,
                x.abs(),
            )
        } else {
            1.0
        };

        let noise =
            self.cloud_noise.sample(x * cloud.frequency, z * cloud.frequency) * self.cloud_norm;
        cloud.amplitude_m * noise * far_fade * road_keep
    }

    /// Stage 4 weight: 1 inside the road footprint, easing to 0 across
    /// the lateral and longitudinal blend margins.
    ///
    /// Exactly 1 everywhere inside the closed footprint and exactly 0
    /// outside it when both blend widths are zero, so the carve has hard
    /// edges rather than an epsilon-wide smear.
    fn road_weight(&self, x: f64, z: f64) -> f64 {
        let road = &self.spec.road;

        let ax = x.abs();
        let lateral = if ax <= road.half_width_m {
            1.0
        } else if road.edge_blend_m <= 0.0 {
            0.0
        } else {
            1.0 - smoothstep(
                road.half_width_m,
                road.half_width_m + road.edge_blend_m,
                ax,
            )
        };
        if lateral <= 0.0 {
            return 0.0;
        }

        let longitudinal = if z >= road.z_start_m && z <= road.z_end_m {
            1.0
        } else if road.longitudinal_blend_m <= 0.0 {
            0.0
        } else if z < road.z_start_m {
            smoothstep(
                road.z_start_m - road.longitudinal_blend_m,
                road.z_start_m,
                z,
            )
        } else {
            1.0 - smoothstep(road.z_end_m, road.z_end_m + road.longitudinal_blend_m, z)
        };

        lateral * longitudinal
    }
}
