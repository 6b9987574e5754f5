//! Planar pose type

use super::vector::Vector;
use approx::{AbsDiffEq, RelativeEq};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub};

/// A planar pose: position plus heading in radians
///
/// The same type is used for absolute poses, relative displacements and
/// per-second rates. It carries no frame tag; the caller tracks which one it
/// holds. Heading is never wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub heading: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Pose { x, y, heading }
    }

    /// Component-wise `self - other`
    pub fn subtract(&self, other: &Pose) -> Pose {
        *self - *other
    }

    /// Rotate the position about the origin by `angle`; heading is offset by the same amount
    pub fn rotated(&self, angle: f64) -> Pose {
        let (sin, cos) = angle.sin_cos();
        Pose::new(
            self.x * cos - self.y * sin,
            self.x * sin + self.y * cos,
            self.heading + angle,
        )
    }

    /// The position part as a vector
    pub fn vector(&self) -> Vector {
        Vector::from_cartesian(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.heading.is_finite()
    }
}

impl Add for Pose {
    type Output = Pose;

    fn add(self, rhs: Pose) -> Pose {
        Pose::new(self.x + rhs.x, self.y + rhs.y, self.heading + rhs.heading)
    }
}

impl AddAssign for Pose {
    fn add_assign(&mut self, rhs: Pose) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.heading += rhs.heading;
    }
}

impl Sub for Pose {
    type Output = Pose;

    fn sub(self, rhs: Pose) -> Pose {
        Pose::new(self.x - rhs.x, self.y - rhs.y, self.heading - rhs.heading)
    }
}

impl AbsDiffEq for Pose {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon)
            && self.y.abs_diff_eq(&other.y, epsilon)
            && self.heading.abs_diff_eq(&other.heading, epsilon)
    }
}

impl RelativeEq for Pose {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative)
            && self.y.relative_eq(&other.y, epsilon, max_relative)
            && self.heading.relative_eq(&other.heading, epsilon, max_relative)
    }
}
