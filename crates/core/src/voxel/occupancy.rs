//! Static solid/empty voxel grid produced by the voxelizer

use crate::grid::{GridCoord, GridIndex};
use crate::Vec3;

/// Immutable occupancy grid (`1` = solid, `0` = empty)
///
/// Built once by [`crate::voxel::Voxelizer`] and then shared read-only by the
/// flood fill and any renderer. Cells use the layout of [`GridIndex`].
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyGrid {
    grid: GridIndex,
    bounds_max: Vec3,
    cells: Vec<u32>,
}

impl OccupancyGrid {
    /// Wrap a finished cell buffer
    ///
    /// `bounds_max` is the padded mesh maximum, which may sit inside the last
    /// voxel since the grid rounds its extent up.
    pub(crate) fn from_parts(grid: GridIndex, bounds_max: Vec3, cells: Vec<u32>) -> Self {
        debug_assert_eq!(cells.len(), grid.cell_count());
        Self {
            grid,
            bounds_max,
            cells,
        }
    }

    /// Build a grid from explicit cells, for callers that already have a
    /// voxelized scene (and for tests)
    ///
    /// Any non-zero cell is treated as solid and stored as `1`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SimError::GridMismatch`] if `cells` does not match the grid size.
    pub fn from_cells(grid: GridIndex, cells: Vec<u32>) -> crate::SimResult<Self> {
        if cells.len() != grid.cell_count() {
            return Err(crate::SimError::GridMismatch {
                expected: grid.cell_count(),
                actual: cells.len(),
            });
        }
        let cells = cells.into_iter().map(|c| u32::from(c != 0)).collect();
        Ok(Self::from_parts(grid, grid.bounds_max(), cells))
    }

    /// An all-empty grid of the given shape
    #[must_use]
    pub fn empty(grid: GridIndex) -> Self {
        Self::from_parts(grid, grid.bounds_max(), vec![0; grid.cell_count()])
    }

    /// Grid dimensions, origin and voxel size
    #[must_use]
    pub fn grid(&self) -> &GridIndex {
        &self.grid
    }

    /// Padded mesh bounds maximum
    #[must_use]
    pub fn bounds_max(&self) -> Vec3 {
        self.bounds_max
    }

    /// Flat cell array in `x + y*nx + z*nx*ny` order
    #[must_use]
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Solid test by flat index (out of range reads as empty)
    #[inline]
    #[must_use]
    pub fn is_solid_index(&self, index: usize) -> bool {
        self.cells.get(index).is_some_and(|&c| c != 0)
    }

    /// Solid test by coordinate (out of range reads as empty)
    #[must_use]
    pub fn is_solid(&self, coord: GridCoord) -> bool {
        self.grid
            .checked_flat_index(coord)
            .is_some_and(|i| self.cells[i] != 0)
    }

    /// Number of solid voxels
    #[must_use]
    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }
}
