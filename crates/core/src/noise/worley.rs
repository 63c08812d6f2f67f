//! Tileable animated Worley (cellular) noise
//!
//! Builds a `resolution³` scalar field used to break up the smoke density.
//!
//! # Algorithm
//!
//! For a normalized position `p`:
//! 1. Scale by the cell count and split into integer cell and fraction
//! 2. For each of the 27 neighbouring cells, hash the cell coordinate
//!    (wrapped modulo the cell count) into a feature point inside that cell
//! 3. Take the minimum distance `d` to any feature point
//! 4. Return `clamp(1 - d, 0, 1)^6`, bright near feature points
//!
//! fBm sums octaves with doubling cell counts, weights `persistence^i` and a
//! fixed per-octave domain offset, normalised by the total weight. Since the
//! cell lookup wraps, the field repeats with period 1 on every axis and the
//! animation offset can scroll it forever without seams.
//!
//! # References
//!
//! - Worley, S. (1996) "A Cellular Texture Basis Function"

use crate::error::{try_zeroed, SimError, SimResult};
use crate::kernel::{GridKernel, KernelBackend};
use crate::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum positive i32 as f64, hash output normalization
const MAX_I32_POSITIVE: f64 = 2_147_483_647.0;

/// Hash multipliers for folding a 3D cell into one integer
const CELL_PRIME_Y: i32 = 137;
const CELL_PRIME_Z: i32 = 7919;

/// Noise field parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorleyConfig {
    /// Samples per axis
    pub resolution: usize,
    /// Feature cells per axis in the first octave
    pub cell_count: u32,
    /// Number of fBm octaves
    pub octaves: u32,
    /// Amplitude multiplier per octave
    pub persistence: f32,
    /// Scroll speed in normalized units per second
    pub speed: f32,
    /// Per-axis scroll speed multipliers
    pub axis_speed_scale: [f32; 3],
    /// Domain offset added per octave index
    pub octave_warp: [f32; 3],
}

impl Default for WorleyConfig {
    fn default() -> Self {
        Self {
            resolution: 128,
            cell_count: 4,
            octaves: 3,
            persistence: 0.5,
            speed: 0.05,
            axis_speed_scale: [1.0, 0.7, 0.3],
            octave_warp: [0.37, 0.51, 0.29],
        }
    }
}

impl WorleyConfig {
    /// Check every field is in range
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> SimResult<()> {
        if self.resolution == 0 {
            return Err(SimError::InvalidConfig("noise resolution must be at least 1".into()));
        }
        if self.cell_count == 0 {
            return Err(SimError::InvalidConfig("noise cell_count must be at least 1".into()));
        }
        if self.octaves == 0 {
            return Err(SimError::InvalidConfig("noise octaves must be at least 1".into()));
        }
        // Cell count doubles per octave and is hashed as i32
        let top = u64::from(self.cell_count) << (self.octaves - 1).min(40);
        if self.octaves > 31 || top > i32::MAX as u64 {
            return Err(SimError::InvalidConfig(format!(
                "noise cell_count {} overflows after {} octaves",
                self.cell_count, self.octaves
            )));
        }
        if !self.persistence.is_finite() || self.persistence <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "noise persistence must be positive, got {}",
                self.persistence
            )));
        }
        let finite = self.speed.is_finite()
            && self.axis_speed_scale.iter().all(|v| v.is_finite())
            && self.octave_warp.iter().all(|v| v.is_finite());
        if !finite {
            return Err(SimError::InvalidConfig("noise animation values must be finite".into()));
        }
        Ok(())
    }

    /// Animation offset at `time`, reduced into `[0, 1)`
    ///
    /// The field tiles with period 1, so only the fractional offset matters.
    #[must_use]
    pub fn drift(&self, time: f32) -> Vec3 {
        (Vec3::from(self.axis_speed_scale) * (time * self.speed)).map(|v| v.rem_euclid(1.0))
    }
}

/// Hugo Elias integer hash, returns a value in [0, 1]
#[inline]
fn hash(n: i32) -> f32 {
    let n = (n << 13) ^ n;
    let n = n
        .wrapping_mul(n.wrapping_mul(n).wrapping_mul(15731).wrapping_add(789221))
        .wrapping_add(1376312589);
    (f64::from(n & 0x7fff_ffff) / MAX_I32_POSITIVE) as f32
}

/// Feature point offset inside a cell, wrapped for tiling
#[inline]
fn cell_feature(cell: [i32; 3], wrap: i32) -> Vec3 {
    let x = cell[0].rem_euclid(wrap);
    let y = cell[1].rem_euclid(wrap);
    let z = cell[2].rem_euclid(wrap);
    let n = x
        .wrapping_add(y.wrapping_mul(CELL_PRIME_Y))
        .wrapping_add(z.wrapping_mul(CELL_PRIME_Z));
    Vec3::new(hash(n), hash(n.wrapping_add(1)), hash(n.wrapping_add(2)))
}

/// Single-octave tiled Worley noise at normalized position `p`
#[must_use]
pub fn worley(p: &Vec3, cell_count: u32) -> f32 {
    let wrap = i32::try_from(cell_count).unwrap_or(i32::MAX).max(1);
    let scaled = p.map(|v| v.rem_euclid(1.0)) * wrap as f32;
    let base = scaled.map(f32::floor);
    let frac = scaled - base;
    let cell = [
        (base.x as i32).rem_euclid(wrap),
        (base.y as i32).rem_euclid(wrap),
        (base.z as i32).rem_euclid(wrap),
    ];

    let mut min_dist = f32::MAX;
    for dz in -1..=1 {
        for dy in -1..=1 {
            for dx in -1..=1 {
                let neighbor = [
                    cell[0].wrapping_add(dx),
                    cell[1].wrapping_add(dy),
                    cell[2].wrapping_add(dz),
                ];
                let offset = Vec3::new(dx as f32, dy as f32, dz as f32);
                let to_feature = offset + cell_feature(neighbor, wrap) - frac;
                min_dist = min_dist.min(to_feature.norm());
            }
        }
    }

    let v = (1.0 - min_dist).clamp(0.0, 1.0);
    v.powi(6)
}

/// Multi-octave Worley noise at normalized position `p` (animation excluded)
#[must_use]
pub fn fbm_worley(p: &Vec3, config: &WorleyConfig) -> f32 {
    let warp = Vec3::from(config.octave_warp);
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut total_amplitude = 0.0;
    let mut cells = config.cell_count;

    for i in 0..config.octaves {
        let warped = p + warp * i as f32;
        total += amplitude * worley(&warped, cells);
        total_amplitude += amplitude;
        amplitude *= config.persistence;
        cells = cells.saturating_mul(2);
    }

    if total_amplitude > 0.0 {
        total / total_amplitude
    } else {
        0.0
    }
}

/// Animated `resolution³` noise volume
#[derive(Debug, Clone)]
pub struct WorleyNoiseField {
    config: WorleyConfig,
    kernel: KernelBackend,
    values: Vec<f32>,
    time: f32,
}

impl WorleyNoiseField {
    /// Allocate a zero-filled field
    ///
    /// # Errors
    ///
    /// - [`SimError::InvalidConfig`] if `config` fails validation
    /// - [`SimError::AllocationFailed`] if `resolution³` overflows or cannot be allocated
    pub fn new(config: WorleyConfig, kernel: KernelBackend) -> SimResult<Self> {
        config.validate()?;
        let r = config.resolution;
        let cells = r
            .checked_mul(r)
            .and_then(|rr| rr.checked_mul(r))
            .ok_or(SimError::AllocationFailed { cells: usize::MAX })?;
        Ok(Self {
            config,
            kernel,
            values: try_zeroed(cells)?,
            time: 0.0,
        })
    }

    /// Regenerate every sample for animation time `time`
    ///
    /// Deterministic: the same `time` and config always give identical values.
    pub fn generate(&mut self, time: f32) {
        let config = self.config;
        let r = config.resolution;
        let inv_res = 1.0 / r as f32;
        let drift = config.drift(time);

        self.kernel.dispatch(&mut self.values, |i| {
            let x = i % r;
            let y = (i / r) % r;
            let z = i / (r * r);
            let p = Vec3::new(x as f32 + 0.5, y as f32 + 0.5, z as f32 + 0.5) * inv_res + drift;
            fbm_worley(&p, &config)
        });
        self.time = time;
        debug!("Worley noise regenerated: {}³ at t={:.3}", r, time);
    }

    /// Flat samples in `x + y*r + z*r*r` order
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Sample at integer coordinate, `None` when out of range
    #[must_use]
    pub fn value_at(&self, x: usize, y: usize, z: usize) -> Option<f32> {
        let r = self.config.resolution;
        if x >= r || y >= r || z >= r {
            return None;
        }
        self.values.get(x + y * r + z * r * r).copied()
    }

    /// Time passed to the last `generate`
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[must_use]
    pub fn resolution(&self) -> usize {
        self.config.resolution
    }

    #[must_use]
    pub fn config(&self) -> &WorleyConfig {
        &self.config
    }
}
