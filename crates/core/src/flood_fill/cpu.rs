//! Host-memory density backend
//!
//! Stores both density buffers as `Vec<i32>` and runs the kernels from
//! [`super::kernels`] through a [`KernelBackend`]. Always available, and the
//! reference the GPU backend is checked against.

use super::backend::DensityBackend;
use super::kernels::{reseed_cpu, step_propagate_cpu, PropagateParams};
use crate::error::{try_zeroed, SimError, SimResult};
use crate::kernel::KernelBackend;
use crate::voxel::OccupancyGrid;
use std::borrow::Cow;

/// CPU density backend with ping-pong `Vec<i32>` buffers
#[derive(Debug, Clone, Default)]
pub struct CpuDensityBackend {
    buffers: [Vec<i32>; 2],
    current: usize,
    kernel: KernelBackend,
}

impl CpuDensityBackend {
    /// Create an unallocated backend dispatching through `kernel`
    #[must_use]
    pub fn new(kernel: KernelBackend) -> Self {
        Self {
            buffers: [Vec::new(), Vec::new()],
            current: 0,
            kernel,
        }
    }

    /// Borrow the current buffer without going through `Cow`
    #[must_use]
    pub fn current(&self) -> &[i32] {
        &self.buffers[self.current]
    }
}

impl DensityBackend for CpuDensityBackend {
    fn allocate(&mut self, cells: usize) -> SimResult<()> {
        // Build both before replacing so a failure leaves the old state intact
        let front = try_zeroed(cells)?;
        let back = try_zeroed(cells)?;
        self.buffers = [front, back];
        self.current = 0;
        Ok(())
    }

    fn clear(&mut self) {
        for buffer in &mut self.buffers {
            buffer.fill(0);
        }
        self.current = 0;
    }

    fn iterate(
        &mut self,
        occupancy: &OccupancyGrid,
        params: &PropagateParams,
        iterations: usize,
    ) -> SimResult<()> {
        let cells = self.cell_count();
        if occupancy.len() != cells {
            return Err(SimError::GridMismatch {
                expected: cells,
                actual: occupancy.len(),
            });
        }
        let seed_index = occupancy.grid().flat_index(params.seed);

        for _ in 0..iterations {
            let [a, b] = &mut self.buffers;
            let (source, destination) = if self.current == 0 { (a, b) } else { (b, a) };

            reseed_cpu(source, seed_index, params.seed_value);
            step_propagate_cpu(&self.kernel, source, destination, occupancy, params);

            self.current ^= 1;
        }
        Ok(())
    }

    fn read_density(&self) -> Cow<'_, [i32]> {
        Cow::Borrowed(self.current())
    }

    fn cell_count(&self) -> usize {
        self.buffers[0].len()
    }

    fn current_slot(&self) -> usize {
        self.current
    }

    fn is_gpu_accelerated(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridCoord, GridIndex};
    use crate::Vec3;

    fn line_grid(n: usize) -> OccupancyGrid {
        OccupancyGrid::empty(GridIndex::new((n, 1, 1), Vec3::zeros(), 1.0))
    }

    fn params(seed_value: i32) -> PropagateParams {
        PropagateParams {
            seed: GridCoord::new(0, 0, 0),
            seed_value,
            radius_xz: 100.0,
            radius_y: 100.0,
        }
    }

    #[test]
    fn test_allocate_zero_fills() {
        let mut backend = CpuDensityBackend::new(KernelBackend::Serial);
        backend.allocate(16).unwrap();
        assert_eq!(backend.cell_count(), 16);
        assert!(backend.read_density().iter().all(|&v| v == 0));
        assert!(!backend.is_gpu_accelerated());
    }

    #[test]
    fn test_iterate_swaps_slots() {
        let occ = line_grid(4);
        let mut backend = CpuDensityBackend::new(KernelBackend::Serial);
        backend.allocate(occ.len()).unwrap();

        backend.iterate(&occ, &params(5), 1).unwrap();
        assert_eq!(backend.current_slot(), 1);
        backend.iterate(&occ, &params(5), 3).unwrap();
        assert_eq!(backend.current_slot(), 0);
    }

    #[test]
    fn test_wavefront_advances_one_voxel_per_iteration() {
        let occ = line_grid(6);
        let mut backend = CpuDensityBackend::new(KernelBackend::Serial);
        backend.allocate(occ.len()).unwrap();

        for step in 1..=3 {
            backend.iterate(&occ, &params(5), 1).unwrap();
            let field = backend.read_density();
            let reached = field.iter().take_while(|&&v| v > 0).count();
            assert_eq!(reached, step + 1, "after {step} iterations: {field:?}");
        }
    }

    #[test]
    fn test_clear_resets() {
        let occ = line_grid(4);
        let mut backend = CpuDensityBackend::new(KernelBackend::Rayon);
        backend.allocate(occ.len()).unwrap();
        backend.iterate(&occ, &params(3), 1).unwrap();
        assert!(backend.read_density().iter().any(|&v| v > 0));

        backend.clear();
        assert_eq!(backend.current_slot(), 0);
        assert!(backend.read_density().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_mismatched_grid_rejected() {
        let mut backend = CpuDensityBackend::new(KernelBackend::Serial);
        backend.allocate(3).unwrap();
        let err = backend.iterate(&line_grid(4), &params(1), 1).unwrap_err();
        assert_eq!(
            err,
            SimError::GridMismatch {
                expected: 3,
                actual: 4
            }
        );
    }

    #[test]
    fn test_empty_grid_only_swaps_slots() {
        let mut backend = CpuDensityBackend::new(KernelBackend::Serial);
        backend.allocate(0).unwrap();
        backend.iterate(&line_grid(0), &params(4), 3).unwrap();
        assert_eq!(backend.current_slot(), 1);
        assert!(backend.read_density().is_empty());
    }
}
