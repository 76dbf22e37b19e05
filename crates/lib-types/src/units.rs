//! Physical units with type safety.
//!
//! Stimulus timing is carried as newtypes so a frequency is never passed
//! where a delay is expected.

use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// Time duration in seconds.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Seconds(pub f64);

impl Seconds {
    #[inline]
    pub fn from_ns(ns: f64) -> Self {
        Self(ns * 1e-9)
    }

    #[inline]
    pub fn as_ns(&self) -> f64 {
        self.0 * 1e9
    }
}

impl Mul<f64> for Seconds {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self(self.0 * rhs)
    }
}

/// Frequency in Hertz.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Hertz(pub f64);

impl Hertz {
    #[inline]
    pub fn from_mhz(mhz: f64) -> Self {
        Self(mhz * 1e6)
    }

    #[inline]
    pub fn as_mhz(&self) -> f64 {
        self.0 * 1e-6
    }

    /// Convert to period (reciprocal).
    #[inline]
    pub fn to_period(&self) -> Seconds {
        Seconds(1.0 / self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_period_reciprocal() {
        let freq = Hertz::from_mhz(10.0);
        let period = freq.to_period();

        assert!((period.as_ns() - 100.0).abs() < 1e-9);
        assert!(((period * 0.25).as_ns() - 25.0).abs() < 1e-9);
        assert!((freq.as_mhz() - 10.0).abs() < 1e-12);
    }
}
