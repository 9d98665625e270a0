use std::ops::{Add, Mul, Sub};

use kestrel_core::Vector2;

/// A quantity a [`Pid`](super::Pid) controller can work on.
pub trait Variable: Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f64, Output = Self> {
    fn zero() -> Self;

    /// Always non-negative.
    fn magnitude(self) -> f64;

    fn cap_magnitude(self, max: f64) -> Self {
        let magnitude = self.magnitude();
        if magnitude > max {
            self * (max / magnitude)
        } else {
            self
        }
    }
}

impl Variable for f64 {
    fn zero() -> Self {
        0.0
    }

    fn magnitude(self) -> f64 {
        self.abs()
    }
}

impl Variable for Vector2 {
    fn zero() -> Self {
        Vector2::zeros()
    }

    fn magnitude(self) -> f64 {
        self.norm()
    }

    fn cap_magnitude(self, max: f64) -> Self {
        self.simd_cap_magnitude(max)
    }
}
