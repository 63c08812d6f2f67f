//! Flat indexing and world/grid conversion for dense voxel grids
//!
//! All voxel buffers in the crate share one layout: x varies fastest, then y,
//! then z (`x + y * nx + z * nx * ny`). [`GridIndex`] carries the dimensions
//! together with the world-space origin and voxel edge length so kernels can
//! move between flat indices, integer coordinates and world positions.

use crate::Vec3;
use serde::{Deserialize, Serialize};

/// Integer voxel coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl GridCoord {
    #[must_use]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }
}

/// Dimensions, origin and voxel size of a dense 3D grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridIndex {
    /// Cells along x
    pub nx: usize,
    /// Cells along y
    pub ny: usize,
    /// Cells along z
    pub nz: usize,
    /// World-space position of the minimum corner of cell (0, 0, 0)
    pub bounds_min: Vec3,
    /// World units per voxel edge
    pub voxel_size: f32,
}

impl GridIndex {
    /// Create a grid description
    ///
    /// # Arguments
    ///
    /// * `dims` - Cell counts `(nx, ny, nz)`
    /// * `bounds_min` - World position of the grid's minimum corner
    /// * `voxel_size` - Edge length of one voxel in world units
    #[must_use]
    pub fn new(dims: (usize, usize, usize), bounds_min: Vec3, voxel_size: f32) -> Self {
        Self {
            nx: dims.0,
            ny: dims.1,
            nz: dims.2,
            bounds_min,
            voxel_size,
        }
    }

    /// Total number of cells
    #[inline]
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Cell count, or `None` if it overflows `usize`
    #[must_use]
    pub fn checked_cell_count(&self) -> Option<usize> {
        self.nx.checked_mul(self.ny)?.checked_mul(self.nz)
    }

    /// Grid dimensions as a tuple
    #[must_use]
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    /// World position of the maximum corner of the grid
    #[must_use]
    pub fn bounds_max(&self) -> Vec3 {
        self.bounds_min
            + Vec3::new(self.nx as f32, self.ny as f32, self.nz as f32) * self.voxel_size
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.x < self.nx && coord.y < self.ny && coord.z < self.nz
    }

    /// Flat index of a coordinate (caller guarantees it is in range)
    #[inline]
    #[must_use]
    pub fn flat_index(&self, coord: GridCoord) -> usize {
        coord.x + coord.y * self.nx + coord.z * self.nx * self.ny
    }

    /// Flat index of a coordinate, `None` when out of range
    #[inline]
    #[must_use]
    pub fn checked_flat_index(&self, coord: GridCoord) -> Option<usize> {
        self.contains(coord).then(|| self.flat_index(coord))
    }

    /// Inverse of [`GridIndex::flat_index`]
    #[inline]
    #[must_use]
    pub fn coord_of(&self, index: usize) -> GridCoord {
        let plane = self.nx * self.ny;
        let z = index / plane;
        let rem = index - z * plane;
        let y = rem / self.nx;
        GridCoord::new(rem - y * self.nx, y, z)
    }

    /// World-space centre of a voxel
    #[must_use]
    pub fn cell_center(&self, coord: GridCoord) -> Vec3 {
        self.bounds_min
            + Vec3::new(
                coord.x as f32 + 0.5,
                coord.y as f32 + 0.5,
                coord.z as f32 + 0.5,
            ) * self.voxel_size
    }

    /// Unclamped signed grid coordinate containing a world position
    ///
    /// Uses `floor`, so positions below the origin map to negative cells.
    #[must_use]
    pub fn world_to_signed(&self, position: &Vec3) -> [i64; 3] {
        let local = (position - self.bounds_min) / self.voxel_size;
        [
            local.x.floor() as i64,
            local.y.floor() as i64,
            local.z.floor() as i64,
        ]
    }

    /// Grid coordinate containing a world position, clamped into the grid
    ///
    /// NaN components map to cell 0.
    #[must_use]
    pub fn world_to_grid_clamped(&self, position: &Vec3) -> GridCoord {
        let signed = self.world_to_signed(position);
        GridCoord::new(
            clamp_axis(signed[0], self.nx),
            clamp_axis(signed[1], self.ny),
            clamp_axis(signed[2], self.nz),
        )
    }

    /// Grid coordinate containing a world position, `None` if outside
    #[must_use]
    pub fn world_to_grid(&self, position: &Vec3) -> Option<GridCoord> {
        let signed = self.world_to_signed(position);
        let in_range = |v: i64, n: usize| v >= 0 && (v as u64) < n as u64;
        if in_range(signed[0], self.nx) && in_range(signed[1], self.ny) && in_range(signed[2], self.nz)
        {
            Some(GridCoord::new(
                signed[0] as usize,
                signed[1] as usize,
                signed[2] as usize,
            ))
        } else {
            None
        }
    }

    /// Signed coordinate range clamped to `[0, n - 1]` on each axis
    pub(crate) fn clamp_range(&self, lo: [i64; 3], hi: [i64; 3]) -> (GridCoord, GridCoord) {
        (
            GridCoord::new(
                clamp_axis(lo[0], self.nx),
                clamp_axis(lo[1], self.ny),
                clamp_axis(lo[2], self.nz),
            ),
            GridCoord::new(
                clamp_axis(hi[0], self.nx),
                clamp_axis(hi[1], self.ny),
                clamp_axis(hi[2], self.nz),
            ),
        )
    }
}

#[inline]
fn clamp_axis(value: i64, n: usize) -> usize {
    let max = n.saturating_sub(1) as i64;
    value.clamp(0, max) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_grid(nx: usize, ny: usize, nz: usize) -> GridIndex {
        GridIndex::new((nx, ny, nz), Vec3::zeros(), 1.0)
    }

    #[test]
    fn test_flat_index_layout() {
        let grid = unit_grid(4, 3, 2);
        assert_eq!(grid.flat_index(GridCoord::new(0, 0, 0)), 0);
        assert_eq!(grid.flat_index(GridCoord::new(1, 0, 0)), 1);
        assert_eq!(grid.flat_index(GridCoord::new(0, 1, 0)), 4);
        assert_eq!(grid.flat_index(GridCoord::new(0, 0, 1)), 12);
        assert_eq!(grid.flat_index(GridCoord::new(3, 2, 1)), 23);
        assert_eq!(grid.cell_count(), 24);
    }

    #[test]
    fn test_coord_of_inverts_flat_index() {
        let grid = unit_grid(5, 4, 3);
        for i in 0..grid.cell_count() {
            assert_eq!(grid.flat_index(grid.coord_of(i)), i);
        }
    }

    #[test]
    fn test_world_conversion_with_offset_origin() {
        let grid = GridIndex::new((10, 10, 10), Vec3::new(-1.0, -1.0, -1.0), 0.5);
        let coord = grid.world_to_grid(&Vec3::new(0.1, -0.9, 3.9)).unwrap();
        assert_eq!(coord, GridCoord::new(2, 0, 9));
        assert!(grid.world_to_grid(&Vec3::new(4.0, 0.0, 0.0)).is_none());
        assert!(grid.world_to_grid(&Vec3::new(-1.01, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_world_to_grid_clamped() {
        let grid = unit_grid(4, 4, 4);
        assert_eq!(
            grid.world_to_grid_clamped(&Vec3::new(-5.0, 2.5, 100.0)),
            GridCoord::new(0, 2, 3)
        );
    }

    #[test]
    fn test_cell_center_and_bounds() {
        let grid = GridIndex::new((2, 2, 2), Vec3::new(1.0, 0.0, 0.0), 2.0);
        assert_eq!(grid.cell_center(GridCoord::new(1, 0, 0)), Vec3::new(4.0, 1.0, 1.0));
        assert_eq!(grid.bounds_max(), Vec3::new(5.0, 4.0, 4.0));
    }

    #[test]
    fn test_checked_cell_count_overflow() {
        let grid = unit_grid(usize::MAX, 2, 1);
        assert!(grid.checked_cell_count().is_none());
    }
}
