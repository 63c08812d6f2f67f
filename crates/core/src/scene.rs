//! Scene orchestration
//!
//! [`SmokeScene`] owns the three pipeline stages and wires them together:
//! the occupancy grid is built once from the mesh, then every frame the
//! noise field is regenerated and the flood fill advances. Input handling
//! (mouse picks, keyboard) lives with the caller, which holds the scene and
//! calls [`SmokeScene::ignite`] directly.

use crate::error::{SimError, SimResult};
use crate::flood_fill::{FloodFillConfig, FloodFillSimulator};
use crate::kernel::KernelBackend;
use crate::mesh::Triangle;
use crate::noise::{WorleyConfig, WorleyNoiseField};
use crate::voxel::{OccupancyGrid, Voxelizer};
use crate::Vec3;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::info;

/// Resolution presets trading detail for speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QualityPreset {
    /// 0.3 world-unit voxels, 64³ noise
    Low,
    /// 0.15 world-unit voxels, 128³ noise
    #[default]
    Medium,
    /// 0.075 world-unit voxels, 192³ noise
    High,
}

impl QualityPreset {
    /// Voxel edge length in world units
    #[must_use]
    pub const fn voxel_size(&self) -> f32 {
        match self {
            Self::Low => 0.3,
            Self::Medium => 0.15,
            Self::High => 0.075,
        }
    }

    /// Noise samples per axis
    #[must_use]
    pub const fn noise_resolution(&self) -> usize {
        match self {
            Self::Low => 64,
            Self::Medium => 128,
            Self::High => 192,
        }
    }
}

/// Everything needed to build a [`SmokeScene`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Voxel edge length in world units
    pub voxel_size: f32,
    /// Flood fill iterations per `advance`
    pub steps_per_frame: usize,
    pub flood_fill: FloodFillConfig,
    pub noise: WorleyConfig,
    /// CPU dispatch backend for every stage
    pub backend: KernelBackend,
    /// Try the GPU density backend first (needs the `gpu` feature)
    pub prefer_gpu: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::from_preset(QualityPreset::default())
    }
}

impl SceneConfig {
    /// Defaults with voxel size and noise resolution taken from `preset`
    #[must_use]
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            voxel_size: preset.voxel_size(),
            steps_per_frame: 1,
            flood_fill: FloodFillConfig::default(),
            noise: WorleyConfig {
                resolution: preset.noise_resolution(),
                ..WorleyConfig::default()
            },
            backend: KernelBackend::default(),
            prefer_gpu: false,
        }
    }

    /// Validate every nested config
    ///
    /// # Errors
    ///
    /// Returns the first validation error found.
    pub fn validate(&self) -> SimResult<()> {
        if !self.voxel_size.is_finite() || self.voxel_size <= 0.0 {
            return Err(SimError::InvalidVoxelSize(self.voxel_size));
        }
        self.flood_fill.validate()?;
        self.noise.validate()
    }
}

/// Summary of the current density field
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DensityStats {
    /// Voxels with density > 0
    pub occupied: usize,
    /// Largest density value
    pub max: i32,
    /// Mean density over occupied voxels (0 when none)
    pub mean: f32,
}

impl DensityStats {
    /// Compute statistics over a density field
    #[must_use]
    pub fn from_field(field: &[i32]) -> Self {
        let (occupied, max, sum) = field
            .iter()
            .filter(|&&v| v > 0)
            .fold((0_usize, 0_i32, 0_i64), |(n, max, sum), &v| {
                (n + 1, max.max(v), sum + i64::from(v))
            });
        let mean = if occupied > 0 {
            (sum as f64 / occupied as f64) as f32
        } else {
            0.0
        };
        Self { occupied, max, mean }
    }
}

/// Occupancy grid, flood fill and noise field for one static mesh
#[derive(Debug)]
pub struct SmokeScene {
    config: SceneConfig,
    occupancy: OccupancyGrid,
    flood_fill: FloodFillSimulator,
    noise: WorleyNoiseField,
    time: f32,
}

impl SmokeScene {
    /// Voxelize `triangles` and allocate every field
    ///
    /// # Errors
    ///
    /// Any configuration or voxelization error, or
    /// [`SimError::AllocationFailed`] when a field cannot be allocated.
    pub fn new(triangles: &[Triangle], config: SceneConfig) -> SimResult<Self> {
        config.validate()?;

        let occupancy = Voxelizer::new(config.backend).voxelize(triangles, config.voxel_size)?;

        let mut flood_fill =
            FloodFillSimulator::with_auto_backend(config.flood_fill, config.backend, config.prefer_gpu)?;
        flood_fill.initialize(occupancy.len())?;

        let mut noise = WorleyNoiseField::new(config.noise, config.backend)?;
        noise.generate(0.0);

        info!(
            "Scene ready: {} solid of {} voxels, noise {}³",
            occupancy.solid_count(),
            occupancy.len(),
            noise.resolution()
        );

        Ok(Self {
            config,
            occupancy,
            flood_fill,
            noise,
            time: 0.0,
        })
    }

    /// Start smoke at a world position (clamped into the grid)
    pub fn ignite(&mut self, world_position: &Vec3) {
        self.flood_fill.seed(world_position, self.occupancy.grid());
    }

    /// Remove all smoke
    pub fn extinguish(&mut self) {
        self.flood_fill.clear();
    }

    /// Advance one frame: regenerate noise, then run the flood fill
    ///
    /// # Errors
    ///
    /// Propagates flood fill errors (none expected for a scene-owned grid).
    pub fn advance(&mut self, dt: f32) -> SimResult<()> {
        self.time += dt;
        self.noise.generate(self.time);
        self.flood_fill
            .propagate(self.config.steps_per_frame, &self.occupancy, dt)
    }

    #[must_use]
    pub fn occupancy(&self) -> &OccupancyGrid {
        &self.occupancy
    }

    /// Current density field
    #[must_use]
    pub fn density(&self) -> Cow<'_, [i32]> {
        self.flood_fill.current_field()
    }

    #[must_use]
    pub fn density_stats(&self) -> DensityStats {
        DensityStats::from_field(&self.density())
    }

    #[must_use]
    pub fn flood_fill(&self) -> &FloodFillSimulator {
        &self.flood_fill
    }

    #[must_use]
    pub fn noise(&self) -> &WorleyNoiseField {
        &self.noise
    }

    /// Seconds accumulated by `advance`
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }
}
