//! Error types for the voxel smoke pipeline
//!
//! Every fallible operation in the crate reports a [`SimError`]. The variants
//! separate configuration mistakes (empty mesh, bad voxel size, invalid
//! parameters) from the single fatal runtime condition, failure to allocate
//! the voxel buffers.

use std::fmt;

/// Errors that can occur while building or running the simulation
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Voxelization was given no triangles
    EmptyMesh,
    /// Voxel edge length was zero, negative or not finite
    InvalidVoxelSize(f32),
    /// Mesh bounds have zero/negative extent or contain non-finite coordinates
    DegenerateBounds {
        /// Padded mesh extent per axis (world units)
        extent: [f32; 3],
    },
    /// A voxel buffer could not be allocated
    AllocationFailed {
        /// Number of cells requested
        cells: usize,
    },
    /// A grid handed to an operation does not match the allocated buffers
    GridMismatch {
        /// Cell count of the allocated buffers
        expected: usize,
        /// Cell count of the grid that was passed in
        actual: usize,
    },
    /// The occupancy grid differs from the grid the seed was placed in
    SeedGridMismatch {
        /// Dimensions of the grid passed to `seed`
        seeded: (usize, usize, usize),
        /// Dimensions of the occupancy grid passed to `propagate`
        actual: (usize, usize, usize),
    },
    /// A configuration value is out of range
    InvalidConfig(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::EmptyMesh => write!(f, "Cannot voxelize: triangle list is empty"),
            SimError::InvalidVoxelSize(size) => {
                write!(f, "Voxel size must be finite and positive, got {size}")
            }
            SimError::DegenerateBounds { extent } => write!(
                f,
                "Mesh bounds are degenerate: extent ({}, {}, {})",
                extent[0], extent[1], extent[2]
            ),
            SimError::AllocationFailed { cells } => {
                write!(f, "Failed to allocate voxel buffer of {cells} cells")
            }
            SimError::GridMismatch { expected, actual } => write!(
                f,
                "Grid has {actual} cells but buffers were allocated for {expected}"
            ),
            SimError::SeedGridMismatch { seeded, actual } => write!(
                f,
                "Seed was placed in a {}x{}x{} grid but occupancy is {}x{}x{}",
                seeded.0, seeded.1, seeded.2, actual.0, actual.1, actual.2
            ),
            SimError::InvalidConfig(msg) => write!(f, "Invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for SimError {}

/// Convenience alias used throughout the crate
pub type SimResult<T> = Result<T, SimError>;

/// Allocate a zero-filled buffer, reporting allocation failure instead of aborting
///
/// # Errors
///
/// Returns [`SimError::AllocationFailed`] if the allocator refuses the request.
pub(crate) fn try_zeroed<T: Clone + Default>(cells: usize) -> SimResult<Vec<T>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(cells)
        .map_err(|_| SimError::AllocationFailed { cells })?;
    buffer.resize(cells, T::default());
    Ok(buffer)
}
