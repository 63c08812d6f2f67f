//! Seeded smoke wavefront over a voxel grid
//!
//! # State
//!
//! ```text
//!            seed()               seed()
//! Inactive ---------> Active <------------+
//!    ^                  |  propagate()    |
//!    |     clear()      +-----------------+
//!    +------------------+
//! ```
//!
//! `propagate` never changes the state. While inactive it does nothing.
//!
//! # Seed Ramp
//!
//! Each `propagate` call advances `elapsed_time` by `dt` and recomputes the
//! seed value from the easing curve. Once `elapsed_time` passes
//! `fill_duration` the seed holds at `max_seed_value` and the plume keeps
//! propagating at full strength.

use super::backend::{create_density_backend, DensityBackend};
use super::config::FloodFillConfig;
use super::cpu::CpuDensityBackend;
use super::kernels::PropagateParams;
use crate::error::{SimError, SimResult};
use crate::grid::{GridCoord, GridIndex};
use crate::kernel::KernelBackend;
use crate::voxel::OccupancyGrid;
use crate::Vec3;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::{debug, info};

/// Whether a seed is driving the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FillState {
    /// No seed; `propagate` is a no-op
    #[default]
    Inactive,
    /// Seeded; `propagate` grows the plume
    Active,
}

/// Seed location and ramp clock
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SeedState {
    /// Flat index of the seed voxel
    pub seed_index: usize,
    /// Seed voxel coordinate
    pub seed_coord: GridCoord,
    /// Grid the seed was placed in, `None` before the first `seed`
    pub seed_grid: Option<GridIndex>,
    /// Seconds since the last `seed`
    pub elapsed_time: f32,
    /// Seed value used by the most recent `propagate`
    pub seed_value: i32,
}

/// Drives the density field from a single seed point
pub struct FloodFillSimulator {
    config: FloodFillConfig,
    backend: Box<dyn DensityBackend>,
    seed: SeedState,
    state: FillState,
}

impl std::fmt::Debug for FloodFillSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FloodFillSimulator")
            .field("config", &self.config)
            .field("seed", &self.seed)
            .field("state", &self.state)
            .field("cells", &self.backend.cell_count())
            .field("gpu", &self.backend.is_gpu_accelerated())
            .finish()
    }
}

impl FloodFillSimulator {
    /// Create a simulator on the CPU backend
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: FloodFillConfig, kernel: KernelBackend) -> SimResult<Self> {
        Self::with_backend(config, Box::new(CpuDensityBackend::new(kernel)))
    }

    /// Create a simulator, trying the GPU backend first when `prefer_gpu` is set
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if `config` fails validation.
    pub fn with_auto_backend(
        config: FloodFillConfig,
        kernel: KernelBackend,
        prefer_gpu: bool,
    ) -> SimResult<Self> {
        Self::with_backend(config, create_density_backend(kernel, prefer_gpu))
    }

    /// Create a simulator on an explicit backend
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if `config` fails validation.
    pub fn with_backend(config: FloodFillConfig, backend: Box<dyn DensityBackend>) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            backend,
            seed: SeedState::default(),
            state: FillState::Inactive,
        })
    }

    /// Allocate both density buffers zero-filled
    ///
    /// Resets the simulator to [`FillState::Inactive`].
    ///
    /// # Errors
    ///
    /// Returns [`SimError::AllocationFailed`] if the buffers cannot be allocated.
    pub fn initialize(&mut self, total_voxel_count: usize) -> SimResult<()> {
        self.backend.allocate(total_voxel_count)?;
        self.seed = SeedState::default();
        self.state = FillState::Inactive;
        info!(
            "Flood fill initialized: {} voxels, {} backend",
            total_voxel_count,
            if self.backend.is_gpu_accelerated() { "gpu" } else { "cpu" }
        );
        Ok(())
    }

    /// Start (or restart) the plume at a world position
    ///
    /// The position is floored to a voxel and clamped into the grid. Both
    /// buffers are zeroed and the ramp clock restarts.
    pub fn seed(&mut self, world_position: &Vec3, grid: &GridIndex) {
        let coord = grid.world_to_grid_clamped(world_position);
        self.backend.clear();
        self.seed = SeedState {
            seed_index: grid.flat_index(coord),
            seed_coord: coord,
            seed_grid: Some(*grid),
            elapsed_time: 0.0,
            seed_value: 0,
        };
        self.state = FillState::Active;
        info!(
            "Smoke seeded at voxel ({}, {}, {}) from ({:.2}, {:.2}, {:.2})",
            coord.x, coord.y, coord.z, world_position.x, world_position.y, world_position.z
        );
    }

    /// Advance the ramp by `dt` and run `steps` propagation iterations
    ///
    /// Does nothing while [`FillState::Inactive`].
    ///
    /// # Errors
    ///
    /// - [`SimError::GridMismatch`] if `occupancy` does not match the
    ///   allocated buffers
    /// - [`SimError::SeedGridMismatch`] if `occupancy` is not the grid the
    ///   seed was placed in
    pub fn propagate(&mut self, steps: usize, occupancy: &OccupancyGrid, dt: f32) -> SimResult<()> {
        if self.state == FillState::Inactive {
            return Ok(());
        }
        let cells = self.backend.cell_count();
        if occupancy.len() != cells {
            return Err(SimError::GridMismatch {
                expected: cells,
                actual: occupancy.len(),
            });
        }
        if let Some(seeded) = self.seed.seed_grid {
            if seeded != *occupancy.grid() {
                return Err(SimError::SeedGridMismatch {
                    seeded: seeded.dims(),
                    actual: occupancy.grid().dims(),
                });
            }
        }

        self.seed.elapsed_time += dt;
        self.seed.seed_value = self.config.seed_value_at(self.seed.elapsed_time);

        let params = PropagateParams {
            seed: self.seed.seed_coord,
            seed_value: self.seed.seed_value,
            radius_xz: self.config.radius_xz,
            radius_y: self.config.radius_y,
        };
        debug!(
            "Flood fill: t={:.3}s seed_value={} steps={}",
            self.seed.elapsed_time, self.seed.seed_value, steps
        );
        self.backend.iterate(occupancy, &params, steps)
    }

    /// Zero both buffers and return to [`FillState::Inactive`]
    pub fn clear(&mut self) {
        self.backend.clear();
        self.seed.elapsed_time = 0.0;
        self.seed.seed_value = 0;
        self.state = FillState::Inactive;
    }

    /// The most recently written density buffer
    #[must_use]
    pub fn current_field(&self) -> Cow<'_, [i32]> {
        self.backend.read_density()
    }

    #[must_use]
    pub fn state(&self) -> FillState {
        self.state
    }

    #[must_use]
    pub fn seed_state(&self) -> &SeedState {
        &self.seed
    }

    #[must_use]
    pub fn elapsed_time(&self) -> f32 {
        self.seed.elapsed_time
    }

    /// Seed value applied by the last `propagate` (0 before the first)
    #[must_use]
    pub fn current_seed_value(&self) -> i32 {
        self.seed.seed_value
    }

    #[must_use]
    pub fn config(&self) -> &FloodFillConfig {
        &self.config
    }

    /// `true` if the density buffers live on the GPU
    #[must_use]
    pub fn is_gpu_accelerated(&self) -> bool {
        self.backend.is_gpu_accelerated()
    }
}
