//! Localization module
//!
//! Every odometry strategy implements [`Localizer`]. The variant is chosen
//! when the perception stack is built; consumers only see the trait.

pub mod settle;
pub mod two_wheel;

pub use two_wheel::{pose_exponential_coefficients, pose_exponential_transform, TwoWheelLocalizer};

use crate::common::{Pose, Vector};
use crate::error::Result;

/// A pose and velocity estimator driven once per control-loop tick
pub trait Localizer: Send + Sync {
    /// Get the localizer name
    fn name(&self) -> &str;

    /// Current pose estimate
    fn pose(&self) -> Pose;

    /// Velocity from the last update, per second
    fn velocity(&self) -> Pose;

    /// Translational part of [`Localizer::velocity`]
    fn velocity_vector(&self) -> Vector;

    /// Replace the origin that displacement is measured from
    fn set_start_pose(&mut self, start: Pose);

    /// Overwrite the current pose estimate
    fn set_pose(&mut self, pose: Pose) -> Result<()>;

    /// Advance the estimate by one cycle
    fn update(&mut self) -> Result<()>;

    /// Accumulated turn in radians, never wrapped
    fn total_heading(&self) -> f64;

    /// Forward ticks to inches
    fn forward_multiplier(&self) -> f64;

    /// Lateral ticks to inches
    fn lateral_multiplier(&self) -> f64;

    /// Turning ticks to radians
    fn turning_multiplier(&self) -> f64;

    /// Recalibrate the heading sensor, blocking until it settles
    fn reset_imu(&mut self) -> Result<()>;

    /// Whether the estimate has been corrupted by NaN
    fn is_nan(&self) -> bool;

    /// Reject pose jumps caused by a wheel leaving the floor, where supported
    fn set_guard_against_flying(&mut self, guard: bool);
}
