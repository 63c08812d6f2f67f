//! Mesh voxelization
//!
//! Converts a triangle mesh into a static [`OccupancyGrid`] using a
//! per-triangle SAT test against every voxel in the triangle's AABB.

pub mod occupancy;
pub mod sat;
pub mod voxelizer;

pub use occupancy::OccupancyGrid;
pub use sat::triangle_intersects_box;
pub use voxelizer::{plan_grid, Voxelizer};
