//! Playback speed as a power of two applied to the tick period.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest exponent in either direction: periods range over `base / 16`
/// to `base * 16`.
pub const MAX_EXPONENT: i8 = 4;

/// Multiplier of the base tick period, `2^exponent`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speed {
    exponent: i8,
}

impl Speed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factor applied to the base period.
    pub fn factor(&self) -> f64 {
        2f64.powi(i32::from(self.exponent))
    }

    /// Halve the period, down to `base / 16`.
    pub fn up_speed(&mut self) {
        self.exponent = (self.exponent - 1).max(-MAX_EXPONENT);
    }

    /// Double the period, up to `base * 16`.
    pub fn down_speed(&mut self) {
        self.exponent = (self.exponent + 1).min(MAX_EXPONENT);
    }

    pub fn period(&self, base: Duration) -> Duration {
        base.mul_f64(self.factor())
    }
}
