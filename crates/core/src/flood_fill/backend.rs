//! Density field storage and iteration backends
//!
//! [`DensityBackend`] owns the ping-pong density buffers and runs whole flood
//! fill iterations on them. The simulator only tracks the seed and the ramp;
//! where the buffers live (host memory or GPU storage buffers) is up to the
//! backend.
//!
//! # Backend Selection
//!
//! [`create_density_backend`] picks the best available backend:
//! 1. GPU, if the `gpu` feature is enabled, requested, and an adapter initializes
//! 2. CPU via [`CpuDensityBackend`] otherwise

use super::cpu::CpuDensityBackend;
use super::kernels::PropagateParams;
use crate::error::SimResult;
use crate::kernel::KernelBackend;
use crate::voxel::OccupancyGrid;
use std::borrow::Cow;
use tracing::info;

#[cfg(feature = "gpu")]
use tracing::warn;

/// Backend-agnostic owner of the two density buffers
///
/// Exactly one buffer is current at any time. An iteration reads the current
/// buffer, writes the other one and then makes it current.
pub trait DensityBackend: Send + Sync {
    /// (Re)allocate both buffers zero-filled and make slot 0 current
    ///
    /// # Errors
    ///
    /// Returns [`crate::SimError::AllocationFailed`] if the buffers cannot be allocated.
    fn allocate(&mut self, cells: usize) -> SimResult<()>;

    /// Zero both buffers and make slot 0 current
    fn clear(&mut self);

    /// Run `iterations` rounds of reseed, propagate and swap
    ///
    /// # Arguments
    ///
    /// * `occupancy` - Static solid/empty grid, same cell count as the buffers
    /// * `params` - Seed position, value and ellipsoid radii
    /// * `iterations` - Number of reseed/propagate/swap rounds
    ///
    /// # Errors
    ///
    /// Returns [`crate::SimError::GridMismatch`] if `occupancy` does not match the
    /// allocated buffers.
    fn iterate(
        &mut self,
        occupancy: &OccupancyGrid,
        params: &PropagateParams,
        iterations: usize,
    ) -> SimResult<()>;

    /// Read the current density buffer
    ///
    /// # Returns
    ///
    /// Flat density field. CPU backend returns a borrowed slice, GPU backend
    /// returns an owned `Vec` read back from the device.
    fn read_density(&self) -> Cow<'_, [i32]>;

    /// Cells per buffer (0 before `allocate`)
    fn cell_count(&self) -> usize;

    /// Index of the current slot (0 or 1)
    fn current_slot(&self) -> usize;

    /// `true` if iterations run on the GPU
    fn is_gpu_accelerated(&self) -> bool;
}

/// Create a density backend with automatic selection
///
/// # Arguments
///
/// * `kernel` - CPU dispatch backend used when the GPU is not selected
/// * `prefer_gpu` - Try the GPU first (only honoured with the `gpu` feature)
///
/// # Returns
///
/// A boxed [`DensityBackend`] using the best available backend. Buffers are
/// not allocated yet.
pub fn create_density_backend(kernel: KernelBackend, prefer_gpu: bool) -> Box<dyn DensityBackend> {
    #[cfg(feature = "gpu")]
    {
        use crate::gpu::{GpuContext, GpuDensityBackend, GpuInitResult};

        if prefer_gpu {
            match GpuContext::new() {
                GpuInitResult::Success(context) => {
                    info!("Using GPU density backend: {}", context.adapter_name());
                    return Box::new(GpuDensityBackend::new(context));
                }
                GpuInitResult::NoGpuFound => {
                    info!("No GPU found, using CPU density backend");
                }
                GpuInitResult::InitFailed {
                    adapter_name,
                    error,
                } => {
                    warn!(
                        "GPU '{}' found but failed to initialize: {}. Falling back to CPU.",
                        adapter_name, error
                    );
                }
            }
        }
    }

    #[cfg(not(feature = "gpu"))]
    {
        if prefer_gpu {
            info!("GPU feature disabled, using CPU density backend");
        }
    }

    info!("Density backend: cpu ({})", crate::kernel::GridKernel::name(&kernel));
    Box::new(CpuDensityBackend::new(kernel))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_selected_without_gpu_preference() {
        let backend = create_density_backend(KernelBackend::Serial, false);
        assert!(!backend.is_gpu_accelerated());
        assert_eq!(backend.cell_count(), 0);
    }

    #[test]
    fn test_gpu_preference_always_yields_a_backend() {
        // Falls back to CPU when no adapter (or no `gpu` feature) is present
        let mut backend = create_density_backend(KernelBackend::Rayon, true);
        backend.allocate(27).unwrap();
        assert_eq!(backend.read_density().len(), 27);
    }
}
