//! Flood fill parameters

use super::easing::Easing;
use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};

/// Tunables for the smoke wavefront
///
/// `radius_xz` and `radius_y` are multiples of the current seed value, in
/// voxels, so the ellipsoid grows together with the seed ramp. The defaults
/// give a plume that is wider than it is tall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloodFillConfig {
    /// Density written at the seed once the ramp completes
    pub max_seed_value: i32,
    /// Seconds for the seed value to ramp from 1 to `max_seed_value`
    pub fill_duration: f32,
    /// Horizontal ellipsoid radius factor
    pub radius_xz: f32,
    /// Vertical ellipsoid radius factor
    pub radius_y: f32,
    /// Ramp curve over normalized fill time
    pub easing: Easing,
}

impl Default for FloodFillConfig {
    fn default() -> Self {
        Self {
            max_seed_value: 64,
            fill_duration: 4.0,
            radius_xz: 1.0,
            radius_y: 0.6,
            easing: Easing::default(),
        }
    }
}

impl FloodFillConfig {
    /// Check every field is in range
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> SimResult<()> {
        if self.max_seed_value < 1 {
            return Err(SimError::InvalidConfig(format!(
                "max_seed_value must be at least 1, got {}",
                self.max_seed_value
            )));
        }
        let positive = |name: &str, v: f32| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(SimError::InvalidConfig(format!(
                    "{name} must be finite and positive, got {v}"
                )))
            }
        };
        positive("fill_duration", self.fill_duration)?;
        positive("radius_xz", self.radius_xz)?;
        positive("radius_y", self.radius_y)?;
        self.easing.validate()
    }

    /// Seed value after `elapsed` seconds of ramp
    ///
    /// `max(1, floor(ease(elapsed / fill_duration) * max_seed_value))`
    #[must_use]
    pub fn seed_value_at(&self, elapsed: f32) -> i32 {
        let t = (elapsed / self.fill_duration).clamp(0.0, 1.0);
        let scaled = (self.easing.ease(t) * self.max_seed_value as f32).floor() as i32;
        scaled.clamp(1, self.max_seed_value.max(1))
    }
}
