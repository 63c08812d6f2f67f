//! CPU flood fill kernels
//!
//! One iteration is two dependent phases:
//!
//! 1. **Reseed**: `source[seed] = max(source[seed], seed_value)`
//! 2. **Propagate**: every voxel of `destination` is computed from `source`
//!    alone, so voxels can be processed in any order
//!
//! The propagate rule takes the strongest of the voxel's own value and each
//! open face neighbour's value minus one, then caps the result by an
//! ellipsoid falloff around the seed. The cap scales with the seed value, so
//! the plume grows as the seed ramps up and never exceeds it.
//!
//! The WGSL shader in `gpu/shaders/flood_fill.wgsl` implements the same rule
//! with the same rounding.

use crate::grid::{GridCoord, GridIndex};
use crate::kernel::GridKernel;
use crate::voxel::OccupancyGrid;

/// Per-iteration inputs shared by every voxel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagateParams {
    /// Seed voxel coordinate
    pub seed: GridCoord,
    /// Current seed value (>= 1)
    pub seed_value: i32,
    /// Horizontal ellipsoid radius factor
    pub radius_xz: f32,
    /// Vertical ellipsoid radius factor
    pub radius_y: f32,
}

impl PropagateParams {
    /// Normalized ellipsoid distance of `coord` from the seed
    ///
    /// `(dx / (s * rxz))² + (dy / (s * ry))² + (dz / (s * rxz))²`; values above
    /// 1 lie outside the plume.
    #[inline]
    #[must_use]
    pub fn ellipsoid_distance(&self, coord: GridCoord) -> f32 {
        let s = self.seed_value as f32;
        let rx = s * self.radius_xz;
        let ry = s * self.radius_y;
        let dx = (coord.x as f32 - self.seed.x as f32) / rx;
        let dy = (coord.y as f32 - self.seed.y as f32) / ry;
        let dz = (coord.z as f32 - self.seed.z as f32) / rx;
        dx * dx + dy * dy + dz * dz
    }
}

/// Reseed phase: raise the seed voxel to at least `seed_value`
#[inline]
pub fn reseed_cpu(source: &mut [i32], seed_index: usize, seed_value: i32) {
    if let Some(cell) = source.get_mut(seed_index) {
        *cell = (*cell).max(seed_value);
    }
}

/// Propagate rule for a single voxel
///
/// Reads only `source`; the result goes to the destination buffer.
#[inline]
#[must_use]
pub fn propagate_cell(
    index: usize,
    source: &[i32],
    occupancy: &OccupancyGrid,
    params: &PropagateParams,
) -> i32 {
    if occupancy.is_solid_index(index) {
        return 0;
    }

    let grid = occupancy.grid();
    let coord = grid.coord_of(index);

    let ellipsoid = params.ellipsoid_distance(coord);
    if ellipsoid > 1.0 {
        return 0;
    }

    let mut max_val = source[index];
    for_each_face_neighbor(grid, coord, |n| {
        if !occupancy.is_solid_index(n) {
            max_val = max_val.max((source[n] - 1).max(0));
        }
    });

    if max_val <= 0 {
        return 0;
    }

    let falloff = params.seed_value as f32 * (1.0 - ellipsoid.sqrt());
    ((falloff + 0.5).floor() as i32).max(1)
}

/// Propagate phase over the whole grid: `destination[i] = propagate_cell(i)`
///
/// # Arguments
///
/// * `kernel` - Dispatch backend
/// * `source` - Density read buffer (after reseed)
/// * `destination` - Density write buffer
/// * `occupancy` - Static solid/empty grid of the same size
/// * `params` - Seed position, value and ellipsoid radii
pub fn step_propagate_cpu<K: GridKernel>(
    kernel: &K,
    source: &[i32],
    destination: &mut [i32],
    occupancy: &OccupancyGrid,
    params: &PropagateParams,
) {
    debug_assert_eq!(source.len(), destination.len());
    debug_assert_eq!(source.len(), occupancy.len());
    kernel.dispatch(destination, |i| propagate_cell(i, source, occupancy, params));
}

/// Call `f` with the flat index of every in-bounds face neighbour
#[inline(always)]
fn for_each_face_neighbor(grid: &GridIndex, c: GridCoord, mut f: impl FnMut(usize)) {
    let stride_y = grid.nx;
    let stride_z = grid.nx * grid.ny;
    let i = grid.flat_index(c);

    if c.x > 0 {
        f(i - 1);
    }
    if c.x + 1 < grid.nx {
        f(i + 1);
    }
    if c.y > 0 {
        f(i - stride_y);
    }
    if c.y + 1 < grid.ny {
        f(i + stride_y);
    }
    if c.z > 0 {
        f(i - stride_z);
    }
    if c.z + 1 < grid.nz {
        f(i + stride_z);
    }
}
