//! Seeded smoke flood fill
//!
//! A wavefront grows outward from a seed voxel through open space. Each
//! iteration reseeds the source buffer, propagates into the other buffer and
//! swaps. Solid voxels stay at zero and block propagation, and an ellipsoid
//! around the seed caps how far the plume reaches.
//!
//! # Feature Flags
//!
//! - `gpu`: adds a wgpu compute backend, selected through
//!   [`create_density_backend`] with automatic CPU fallback

mod backend;
mod config;
mod cpu;
mod easing;
pub mod kernels;
mod simulator;

pub use backend::{create_density_backend, DensityBackend};
pub use config::FloodFillConfig;
pub use cpu::CpuDensityBackend;
pub use easing::{Easing, DEFAULT_POWER_EXPONENT};
pub use kernels::PropagateParams;
pub use simulator::{FillState, FloodFillSimulator, SeedState};
