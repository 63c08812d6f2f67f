//! Mesh to occupancy grid conversion
//!
//! The grid covers the mesh AABB padded by one voxel on every side. Each
//! triangle is processed independently: its own AABB selects the candidate
//! voxels, and each candidate is confirmed with the SAT box test. Many
//! triangles touch the same voxel, so marks are written with an atomic OR,
//! which makes the result independent of dispatch order.

use super::occupancy::OccupancyGrid;
use super::sat::triangle_intersects_box;
use crate::error::{SimError, SimResult};
use crate::grid::{GridCoord, GridIndex};
use crate::kernel::{GridKernel, KernelBackend};
use crate::mesh::{self, Triangle};
use crate::Vec3;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, info};

/// Builds [`OccupancyGrid`]s from triangle lists
#[derive(Debug, Clone, Copy, Default)]
pub struct Voxelizer {
    kernel: KernelBackend,
}

impl Voxelizer {
    /// Create a voxelizer running on the given backend
    #[must_use]
    pub fn new(kernel: KernelBackend) -> Self {
        Self { kernel }
    }

    /// Voxelize a mesh into a solid/empty grid
    ///
    /// # Arguments
    ///
    /// * `triangles` - World-space triangles (at least one)
    /// * `voxel_size` - Voxel edge length in world units
    ///
    /// # Errors
    ///
    /// - [`SimError::EmptyMesh`] if `triangles` is empty
    /// - [`SimError::InvalidVoxelSize`] if `voxel_size` is not finite and positive
    /// - [`SimError::DegenerateBounds`] if the mesh has non-finite coordinates
    ///   or the padded extent collapses
    /// - [`SimError::AllocationFailed`] if the grid is too large to allocate
    pub fn voxelize(&self, triangles: &[Triangle], voxel_size: f32) -> SimResult<OccupancyGrid> {
        let (grid, bounds_max) = plan_grid(triangles, voxel_size)?;
        let cell_count = grid.cell_count();

        info!(
            "Voxelizer: {} triangles, grid {}x{}x{} = {} voxels",
            triangles.len(),
            grid.nx,
            grid.ny,
            grid.nz,
            cell_count
        );

        let mut marks: Vec<AtomicU32> = Vec::new();
        marks
            .try_reserve_exact(cell_count)
            .map_err(|_| SimError::AllocationFailed { cells: cell_count })?;
        marks.extend((0..cell_count).map(|_| AtomicU32::new(0)));

        let half = Vec3::repeat(voxel_size * 0.5);
        self.kernel.dispatch_indices(triangles.len(), |t| {
            mark_triangle(&triangles[t], &grid, &half, &marks);
        });

        let cells: Vec<u32> = marks.into_iter().map(AtomicU32::into_inner).collect();
        let occupancy = OccupancyGrid::from_parts(grid, bounds_max, cells);

        info!("Voxelizer: {} filled voxels", occupancy.solid_count());
        Ok(occupancy)
    }
}

/// Compute the padded grid for a mesh without allocating it
///
/// # Errors
///
/// Same validation errors as [`Voxelizer::voxelize`], except allocation.
pub fn plan_grid(triangles: &[Triangle], voxel_size: f32) -> SimResult<(GridIndex, Vec3)> {
    if !voxel_size.is_finite() || voxel_size <= 0.0 {
        return Err(SimError::InvalidVoxelSize(voxel_size));
    }
    let (lo, hi) = mesh::bounds(triangles).ok_or(SimError::EmptyMesh)?;

    let padding = Vec3::repeat(voxel_size);
    let bounds_min = lo - padding;
    let bounds_max = hi + padding;
    let extent = bounds_max - bounds_min;

    let collapsed = extent.iter().any(|e| !e.is_finite() || *e <= 0.0);
    if collapsed || !triangles.iter().all(Triangle::is_finite) {
        return Err(SimError::DegenerateBounds {
            extent: [extent.x, extent.y, extent.z],
        });
    }

    let cells_along = |e: f32| ((e / voxel_size).ceil() as usize).max(1);
    let grid = GridIndex::new(
        (cells_along(extent.x), cells_along(extent.y), cells_along(extent.z)),
        bounds_min,
        voxel_size,
    );
    if grid.checked_cell_count().is_none() {
        return Err(SimError::AllocationFailed { cells: usize::MAX });
    }

    debug!(
        "Voxelizer bounds ({:.3}, {:.3}, {:.3}) - ({:.3}, {:.3}, {:.3})",
        bounds_min.x, bounds_min.y, bounds_min.z, bounds_max.x, bounds_max.y, bounds_max.z
    );
    Ok((grid, bounds_max))
}

/// Per-triangle kernel: SAT-test every voxel under the triangle's AABB
fn mark_triangle(tri: &Triangle, grid: &GridIndex, half: &Vec3, marks: &[AtomicU32]) {
    let lo = grid.world_to_signed(&tri.min());
    let hi = grid.world_to_signed(&tri.max());
    let (g_min, g_max) = grid.clamp_range(lo, hi);

    for z in g_min.z..=g_max.z {
        for y in g_min.y..=g_max.y {
            for x in g_min.x..=g_max.x {
                let coord = GridCoord::new(x, y, z);
                let local = tri.relative_to(&grid.cell_center(coord));
                if triangle_intersects_box(&local.a, &local.b, &local.c, half) {
                    marks[grid.flat_index(coord)].fetch_or(1, Ordering::Relaxed);
                }
            }
        }
    }
}
