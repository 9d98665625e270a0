use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::Vector2;

/// A heading in radians, kept in (-pi, pi]. Arithmetic on `Angle` re-wraps the
/// result, so sums and differences never leave that interval:
///
/// ```
/// # use kestrel_core::Angle;
/// let a = Angle::from_degrees(170.0);
/// let b = Angle::from_degrees(20.0);
/// assert!(((a + b).degrees() + 170.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Angle(f64);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);
    pub const PI: Angle = Angle(PI);
    pub const PI_2: Angle = Angle(PI / 2.0);

    pub fn from_radians(radians: f64) -> Self {
        Angle(wrap_angle(radians))
    }

    pub fn from_degrees(degrees: f64) -> Self {
        Self::from_radians(degrees.to_radians())
    }

    /// Direction of the vector pointing from `a` to `b`.
    pub fn between_points(a: Vector2, b: Vector2) -> Self {
        Self::from_radians((b.y - a.y).atan2(b.x - a.x))
    }

    pub fn radians(&self) -> f64 {
        self.0
    }

    pub fn degrees(&self) -> f64 {
        self.0.to_degrees()
    }

    /// Signed shortest rotation that takes `self` onto `target`, in (-pi, pi].
    pub fn shortest_to(&self, target: Angle) -> Angle {
        target - *self
    }

    /// Unit vector pointing along this heading.
    pub fn unit_vector(&self) -> Vector2 {
        Vector2::new(self.0.cos(), self.0.sin())
    }

    /// Rotate a vector counter-clockwise by this angle.
    pub fn rotate_vector(&self, v: &Vector2) -> Vector2 {
        nalgebra::Rotation2::new(self.0) * v
    }

    pub fn abs(&self) -> f64 {
        self.0.abs()
    }
}

impl std::ops::Add for Angle {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Angle::from_radians(self.0 + other.0)
    }
}

impl std::ops::Sub for Angle {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Angle::from_radians(self.0 - other.0)
    }
}

impl std::ops::Neg for Angle {
    type Output = Self;

    fn neg(self) -> Self {
        Angle::from_radians(-self.0)
    }
}

impl std::ops::Mul<Vector2> for Angle {
    type Output = Vector2;

    fn mul(self, v: Vector2) -> Vector2 {
        self.rotate_vector(&v)
    }
}

impl std::fmt::Display for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:.1}°", self.degrees())
    }
}

impl Default for Angle {
    fn default() -> Self {
        Self::ZERO
    }
}

impl PartialEq for Angle {
    fn eq(&self, other: &Self) -> bool {
        const TOLERANCE: f64 = 1e-9;
        let diff = (self.0 - other.0).abs();
        !(TOLERANCE..=(2.0 * PI - TOLERANCE)).contains(&diff)
    }
}

/// Normalize an angle in radians to (-pi, pi].
pub fn wrap_angle(angle: f64) -> f64 {
    let mut angle = angle % (2.0 * PI);
    if angle <= -PI {
        angle += 2.0 * PI;
    } else if angle > PI {
        angle -= 2.0 * PI;
    }
    angle
}
