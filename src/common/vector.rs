//! Planar vector

/// A 2D vector, stored in cartesian form
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    x: f64,
    y: f64,
}

impl Vector {
    pub fn from_cartesian(x: f64, y: f64) -> Self {
        Vector { x, y }
    }

    /// Create a vector from a magnitude and a direction in radians
    pub fn from_polar(magnitude: f64, theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        Vector {
            x: magnitude * cos,
            y: magnitude * sin,
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Direction in radians, `(-π, π]`
    pub fn theta(&self) -> f64 {
        self.y.atan2(self.x)
    }
}
