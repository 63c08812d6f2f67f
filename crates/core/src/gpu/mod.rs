//! GPU compute backend (feature `gpu`)
//!
//! Uses wgpu for cross-platform compute (Vulkan/Metal/DX12). Only the
//! density field runs here; voxelization and noise stay on the CPU kernels.
//!
//! # Determinism
//!
//! The propagate shader uses the same arithmetic and `floor(x + 0.5)`
//! rounding as the CPU kernel, and is checked against it in tests.

pub mod context;
pub mod flood_fill;

pub use context::{GpuContext, GpuInitResult};
pub use flood_fill::GpuDensityBackend;
