//! Seed strength ramp curves
//!
//! The flood fill ramps its seed value from 1 up to `max_seed_value` over
//! `fill_duration` seconds. The curve shape decides how the smoke volume
//! grows: the default power curve with exponent 0.25 jumps quickly to a large
//! seed and then creeps toward full strength.
//!
//! Every curve maps `[0, 1]` onto `[0, 1]`, is strictly increasing there and
//! satisfies `ease(0) = 0`, `ease(1) = 1`. Inputs outside `[0, 1]` are clamped.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};

/// Default exponent for [`Easing::Power`]
pub const DEFAULT_POWER_EXPONENT: f32 = 0.25;

/// Monotonic easing curve applied to normalized fill time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Easing {
    /// `t^exponent`; exponents below 1 start fast, above 1 start slow
    Power {
        /// Must be finite and positive
        exponent: f32,
    },
    /// `t`
    Linear,
    /// Hermite `3t² - 2t³`
    SmoothStep,
    /// `1 - (1 - t)³`
    EaseOutCubic,
}

impl Default for Easing {
    fn default() -> Self {
        Self::Power {
            exponent: DEFAULT_POWER_EXPONENT,
        }
    }
}

impl Easing {
    /// Evaluate the curve at `t` (clamped to `[0, 1]`, NaN maps to 0)
    #[must_use]
    pub fn ease(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Power { exponent } => t.powf(exponent),
            Self::Linear => t,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::EaseOutCubic => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
        }
    }

    /// Check curve parameters
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if a power exponent is not finite and positive.
    pub fn validate(&self) -> SimResult<()> {
        match self {
            Self::Power { exponent } if !exponent.is_finite() || *exponent <= 0.0 => Err(
                SimError::InvalidConfig(format!("easing exponent must be positive, got {exponent}")),
            ),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ALL: [Easing; 5] = [
        Easing::Power { exponent: 0.25 },
        Easing::Power { exponent: 2.0 },
        Easing::Linear,
        Easing::SmoothStep,
        Easing::EaseOutCubic,
    ];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert_relative_eq!(easing.ease(0.0), 0.0);
            assert_relative_eq!(easing.ease(1.0), 1.0);
        }
    }

    #[test]
    fn test_strictly_increasing() {
        for easing in ALL {
            let mut prev = easing.ease(0.0);
            for i in 1..=100 {
                let v = easing.ease(i as f32 / 100.0);
                assert!(v > prev, "{easing:?} not increasing at step {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn test_input_is_clamped() {
        let easing = Easing::default();
        assert_eq!(easing.ease(-3.0), 0.0);
        assert_eq!(easing.ease(7.5), 1.0);
        assert_eq!(easing.ease(f32::NAN), 0.0);
    }

    #[test]
    fn test_default_power_is_fast_start() {
        // 0.5^0.25 ~= 0.841
        assert_relative_eq!(Easing::default().ease(0.5), 0.5_f32.powf(0.25));
        assert!(Easing::default().ease(0.1) > 0.5);
    }

    #[test]
    fn test_validate_rejects_bad_exponent() {
        assert!(Easing::Power { exponent: 0.0 }.validate().is_err());
        assert!(Easing::Power { exponent: f32::NAN }.validate().is_err());
        assert!(Easing::SmoothStep.validate().is_ok());
    }
}
