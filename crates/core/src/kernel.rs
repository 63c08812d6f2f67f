//! Data-parallel kernel dispatch
//!
//! Every pass in the pipeline (voxelization, flood fill propagation, noise
//! generation) is a single function replicated over all grid cells or all
//! triangles with no ordering between elements. [`GridKernel`] is that
//! `parallel_for` seam: the simulation code only describes the per-element
//! work, and the backend decides how to run it.
//!
//! A dispatch returns only after every element has finished, so returning
//! from `dispatch`/`dispatch_indices` is the memory barrier between dependent
//! phases.
//!
//! # Backends
//!
//! - [`SerialKernel`]: plain loop, useful for debugging and as a reference
//! - [`RayonKernel`]: work-stealing thread pool via Rayon
//! - `GpuDensityBackend` (feature `gpu`): wgpu compute for the density field

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Minimum elements per Rayon task, keeps tiny grids from over-splitting
const RAYON_MIN_LEN: usize = 256;

/// Backend-agnostic `parallel_for` over a flat index range
pub trait GridKernel: Send + Sync {
    /// Write `kernel(i)` into `out[i]` for every element
    ///
    /// Elements may run in any order and concurrently; `kernel` must only read
    /// shared state.
    fn dispatch<T, F>(&self, out: &mut [T], kernel: F)
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send;

    /// Run `kernel(i)` for every `i` in `0..count`
    ///
    /// Side effects must go through atomics or other order-independent writes.
    fn dispatch_indices<F>(&self, count: usize, kernel: F)
    where
        F: Fn(usize) + Sync + Send;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Single-threaded reference backend
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialKernel;

impl GridKernel for SerialKernel {
    fn dispatch<T, F>(&self, out: &mut [T], kernel: F)
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = kernel(i);
        }
    }

    fn dispatch_indices<F>(&self, count: usize, kernel: F)
    where
        F: Fn(usize) + Sync + Send,
    {
        (0..count).for_each(kernel);
    }

    fn name(&self) -> &'static str {
        "serial"
    }
}

/// Rayon thread-pool backend
#[derive(Debug, Clone, Copy, Default)]
pub struct RayonKernel;

impl GridKernel for RayonKernel {
    fn dispatch<T, F>(&self, out: &mut [T], kernel: F)
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        out.par_iter_mut()
            .with_min_len(RAYON_MIN_LEN)
            .enumerate()
            .for_each(|(i, slot)| *slot = kernel(i));
    }

    fn dispatch_indices<F>(&self, count: usize, kernel: F)
    where
        F: Fn(usize) + Sync + Send,
    {
        (0..count).into_par_iter().for_each(kernel);
    }

    fn name(&self) -> &'static str {
        "rayon"
    }
}

/// Runtime-selectable CPU backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum KernelBackend {
    /// Single-threaded loop
    Serial,
    /// Rayon work-stealing pool
    #[default]
    Rayon,
}

impl GridKernel for KernelBackend {
    fn dispatch<T, F>(&self, out: &mut [T], kernel: F)
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        match self {
            Self::Serial => SerialKernel.dispatch(out, kernel),
            Self::Rayon => RayonKernel.dispatch(out, kernel),
        }
    }

    fn dispatch_indices<F>(&self, count: usize, kernel: F)
    where
        F: Fn(usize) + Sync + Send,
    {
        match self {
            Self::Serial => SerialKernel.dispatch_indices(count, kernel),
            Self::Rayon => RayonKernel.dispatch_indices(count, kernel),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Serial => SerialKernel.name(),
            Self::Rayon => RayonKernel.name(),
        }
    }
}
