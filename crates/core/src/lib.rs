//! Voxel Smoke Simulation Core Library
//!
//! Simulates volumetric smoke spreading through a static voxelized scene.
//!
//! ## Pipeline
//!
//! - [`voxel`]: triangle mesh to solid/empty occupancy grid (13-axis SAT)
//! - [`flood_fill`]: seeded wavefront that grows a density field through
//!   open voxels, shaped by an ellipsoid falloff and an eased seed ramp
//! - [`noise`]: tileable animated multi-octave Worley noise
//! - [`scene`]: owns all three and advances them per frame
//!
//! Every stage is a data-parallel kernel dispatched through
//! [`kernel::GridKernel`] (serial or Rayon), with an optional wgpu compute
//! backend for the density field behind the `gpu` feature.
//!
//! ## Example
//!
//! ```rust,ignore
//! use smoke_sim_core::{mesh, SceneConfig, SmokeScene, Vec3};
//!
//! let room = mesh::box_mesh(Vec3::zeros(), Vec3::new(4.0, 3.0, 4.0));
//! let mut scene = SmokeScene::new(&room, SceneConfig::default())?;
//! scene.ignite(&Vec3::new(2.0, 0.5, 2.0));
//! scene.advance(1.0 / 60.0)?;
//! ```

pub mod error;
pub mod flood_fill;
pub mod grid;
pub mod kernel;
pub mod mesh;
pub mod noise;
pub mod scene;
pub mod voxel;

#[cfg(feature = "gpu")]
pub mod gpu;

/// World-space vector type used throughout the crate
pub type Vec3 = nalgebra::Vector3<f32>;

pub use error::{SimError, SimResult};
pub use flood_fill::{
    create_density_backend, DensityBackend, Easing, FillState, FloodFillConfig,
    FloodFillSimulator,
};
pub use grid::{GridCoord, GridIndex};
pub use kernel::{GridKernel, KernelBackend, RayonKernel, SerialKernel};
pub use mesh::Triangle;
pub use noise::{WorleyConfig, WorleyNoiseField};
pub use scene::{DensityStats, QualityPreset, SceneConfig, SmokeScene};
pub use voxel::{OccupancyGrid, Voxelizer};
