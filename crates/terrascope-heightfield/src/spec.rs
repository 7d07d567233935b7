//! Terrain build parameters with documented safe ranges.

/// Maximum slope magnitude in degrees. Kept well away from 90° so
/// `tan` stays finite.
const MAX_SLOPE_DEG: f64 = 89.9;

/// Hill, end-slope, and easing parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlopeSpec {
    /// Hill slope angle on the −X side, degrees. Clamped to (−89.9, 89.9).
    pub left_deg: f64,
    /// Hill slope angle on the +X side, degrees. Clamped to (−89.9, 89.9).
    pub right_deg: f64,
    /// End slope angle along +Z, degrees. Clamped to (−89.9, 89.9).
    pub end_deg: f64,
    /// Length of the cubic ease at the bottom of the hill, meters. ≥ 0.
    pub bottom_curve_m: f64,
    /// Length of the flat plateau at the top of the hill, meters. ≥ 0.
    pub top_flat_m: f64,
    /// Offset of the end-slope start beyond the road's far edge, in tiles.
    pub end_slope_offset_tiles: f64,
}

impl Default for SlopeSpec {
    fn default() -> Self {
        Self {
            left_deg: 30.0,
            right_deg: 30.0,
            end_deg: 0.0,
            bottom_curve_m: 20.0,
            top_flat_m: 0.0,
            end_slope_offset_tiles: 1.0,
        }
    }
}

/// Road carve parameters. The road is a flattened strip along Z centered
/// on x = 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoadSpec {
    /// Whether the road carve is applied at all.
    pub enabled: bool,
    /// Half-width of the flat strip, meters. ≥ 0.
    pub half_width_m: f64,
    /// Near end of the road along Z, meters.
    pub z_start_m: f64,
    /// Far end of the road along Z, meters. Swapped with `z_start_m` if
    /// given out of order.
    pub z_end_m: f64,
    /// Elevation the footprint is flattened to, meters.
    pub base_elevation_m: f64,
    /// Lateral blend width from the shoulder outward, meters. ≥ 0.
    pub edge_blend_m: f64,
    /// Longitudinal blend width beyond each end, meters. ≥ 0.
    pub longitudinal_blend_m: f64,
}

impl Default for RoadSpec {
    fn default() -> Self {
        Self {
            enabled: true,
            half_width_m: 5.0,
            z_start_m: -50.0,
            z_end_m: 50.0,
            base_elevation_m: 0.0,
            edge_blend_m: 8.0,
            longitudinal_blend_m: 12.0,
        }
    }
}

/// Cloud-displacement parameters: low-frequency FBM bumps over the far
/// portion of the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CloudSpec {
    /// Whether cloud displacement is applied.
    pub enabled: bool,
    /// Peak displacement, meters. The FBM sum is normalized so this is the
    /// true maximum. ≥ 0.
    pub amplitude_m: f64,
    /// World-space noise frequency (cycles per meter). Clamped to
    /// (0, 1.0].
    pub frequency: f64,
    /// Number of tiles from the far (+Z) end that receive displacement.
    pub affected_tiles: f64,
    /// Width of the fade into the affected region, meters. ≥ 0.
    pub blend_width_m: f64,
}

impl Default for CloudSpec {
    fn default() -> Self {
        Self {
            enabled: false,
            amplitude_m: 6.0,
            frequency: 0.015,
            affected_tiles: 3.0,
            blend_width_m: 30.0,
        }
    }
}

/// Immutable description of one terrain build.
///
/// The grid spans `tiles_x × tiles_z` tiles of `tile_size_m` meters,
/// starting at tile offsets (`min_tile_x`, `min_tile_z`), with
/// `subdivisions` quads per tile edge. The mesh is rebuilt wholesale
/// whenever any field changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainSpec {
    /// Edge length of one tile, meters. Clamped to [0.1, 10 000].
    pub tile_size_m: f64,
    /// Grid extent along X in tiles. Floored to 1.
    pub tiles_x: u32,
    /// Grid extent along Z in tiles. Floored to 1.
    pub tiles_z: u32,
    /// Signed tile offset of the grid's min-X edge.
    pub min_tile_x: i32,
    /// Signed tile offset of the grid's min-Z edge.
    pub min_tile_z: i32,
    /// Subdivisions per tile edge. Clamped to [1, 256].
    pub subdivisions: u32,
    /// Hill and end-slope parameters.
    pub slope: SlopeSpec,
    /// Road carve parameters.
    pub road: RoadSpec,
    /// Cloud displacement parameters.
    pub cloud: CloudSpec,
    /// Seed for the cloud displacement noise.
    pub seed: u64,
}

impl Default for TerrainSpec {
    fn default() -> Self {
        Self {
            tile_size_m: 50.0,
            tiles_x: 4,
            tiles_z: 4,
            min_tile_x: -2,
            min_tile_z: -2,
            subdivisions: 16,
            slope: SlopeSpec::default(),
            road: RoadSpec::default(),
            cloud: CloudSpec::default(),
            seed: 0,
        }
    }
}

impl TerrainSpec {
    /// Return a copy with every field clamped to its safe range.
    ///
    /// Degenerate extents are floored to one tile and one subdivision;
    /// angles are pulled inside (−89.9°, 89.9°); all widths and lengths
    /// are floored to zero. Out-of-range input is never an error.
    pub fn clamped(&self) -> Self {
        let mut s = *self;
        s.tile_size_m = s.tile_size_m.clamp(0.1, 10_000.0);
        s.tiles_x = s.tiles_x.max(1);
        s.tiles_z = s.tiles_z.max(1);
        s.subdivisions = s.subdivisions.clamp(1, 256);

        s.slope.left_deg = s.slope.left_deg.clamp(-MAX_SLOPE_DEG, MAX_SLOPE_DEG);
        s.slope.right_deg = s.slope.right_deg.clamp(-MAX_SLOPE_DEG, MAX_SLOPE_DEG);
        s.slope.end_deg = s.slope.end_deg.clamp(-MAX_SLOPE_DEG, MAX_SLOPE_DEG);
        s.slope.bottom_curve_m = s.slope.bottom_curve_m.max(0.0);
        s.slope.top_flat_m = s.slope.top_flat_m.max(0.0);

        s.road.half_width_m = s.road.half_width_m.max(0.0);
        s.road.edge_blend_m = s.road.edge_blend_m.max(0.0);
        s.road.longitudinal_blend_m = s.road.longitudinal_blend_m.max(0.0);
        if s.road.z_end_m < s.road.z_start_m {
            std::mem::swap(&mut s.road.z_start_m, &mut s.road.z_end_m);
        }

        s.cloud.amplitude_m = s.cloud.amplitude_m.max(0.0);
        s.cloud.frequency = s.cloud.frequency.clamp(1e-6, 1.0);
        s.cloud.affected_tiles = s.cloud.affected_tiles.max(0.0);
        s.cloud.blend_width_m = s.cloud.blend_width_m.max(0.0);

        s
    }

    /// World X of the grid's min edge.
    pub fn min_x(&self) -> f64 {
        self.min_tile_x as f64 * self.tile_size_m
    }

    /// World X of the grid's max edge.
    pub fn max_x(&self) -> f64 {
        (self.min_tile_x as f64 + self.tiles_x as f64) * self.tile_size_m
    }

    /// World Z of the grid's min edge.
    pub fn min_z(&self) -> f64 {
        self.min_tile_z as f64 * self.tile_size_m
    }

    /// World Z of the grid's max edge.
    pub fn max_z(&self) -> f64 {
        (self.min_tile_z as f64 + self.tiles_z as f64) * self.tile_size_m
    }

    /// Vertex columns in the grid: `tiles_x · subdivisions + 1`.
    pub fn columns(&self) -> u32 {
        self.tiles_x * self.subdivisions + 1
    }

    /// Vertex rows in the grid: `tiles_z · subdivisions + 1`.
    pub fn rows(&self) -> u32 {
        self.tiles_z * self.subdivisions + 1
    }
}
