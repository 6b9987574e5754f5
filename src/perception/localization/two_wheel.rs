//! Two dead-wheel localizer with an absolute heading sensor
//!
//! A forward wheel and a strafe wheel supply translation; the IMU supplies
//! heading. Each cycle the robot-frame twist is corrected for the wheels'
//! mounting offsets, mapped through the SE(2) pose exponential and rotated
//! into the global frame with the heading from before the cycle.
//!
//! ```text
//!                   forward (x positive)
//!                          ^
//!                          |
//!                   /--------------\
//!                   |              |
//!                   |           || |   <- forward wheel, offset in y
//!  left (y pos) <-- |           || |
//!                   |     ____     |   <- strafe wheel, offset in x
//!                   |     ----     |
//!                   \--------------/
//! ```

use super::settle::{settle, CancellationToken, SettleOutcome};
use super::Localizer;
use crate::common::math::{heading_delta, normalize_angle};
use crate::common::{Matrix, Pose, Vector};
use crate::config::TwoWheelConfig;
use crate::error::{LocalizationError, Result};
use crate::perception::sensors::encoder::Encoder;
use crate::perception::sensors::timer::NanoTimer;
use crate::perception::sensors::{HeadingSource, TwoWheelHardware};
use log::{debug, info, trace, warn};
use std::f64::consts::FRAC_PI_2;

/// Below this turn the pose exponential switches to its Taylor expansion
const SMALL_ANGLE: f64 = 1e-3;

/// Coefficients `(a, b)` of the pose exponential for a turn of `delta_theta`
///
/// `a = sin(θ)/θ` and `b = (cos(θ) - 1)/θ`, with a second-order Taylor
/// expansion for `|θ| < 1e-3` so a zero turn never divides by zero.
pub fn pose_exponential_coefficients(delta_theta: f64) -> (f64, f64) {
    if delta_theta.abs() < SMALL_ANGLE {
        (1.0 - delta_theta.powi(2) / 6.0, -delta_theta / 2.0)
    } else {
        (
            delta_theta.sin() / delta_theta,
            (delta_theta.cos() - 1.0) / delta_theta,
        )
    }
}

/// 3x3 transform `[[a, b, 0], [-b, a, 0], [0, 0, 1]]` mapping a robot-frame
/// arc into a straight-line displacement
pub fn pose_exponential_transform(delta_theta: f64) -> Matrix {
    let (a, b) = pose_exponential_coefficients(delta_theta);
    let mut transform = Matrix::new(3, 3);
    transform.set(0, 0, a);
    transform.set(0, 1, b);
    transform.set(1, 0, -b);
    transform.set(1, 1, a);
    transform.set(2, 2, 1.0);
    transform
}

/// Estimator lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimatorState {
    /// Constructed, not yet updated
    Idle,
    Running,
}

/// Localizer using two orthogonal dead wheels and an IMU
pub struct TwoWheelLocalizer {
    config: TwoWheelConfig,
    imu: Box<dyn HeadingSource>,
    forward_encoder: Encoder,
    strafe_encoder: Encoder,
    forward_encoder_pose: Pose,
    strafe_encoder_pose: Pose,
    timer: NanoTimer,
    delta_time_nanos: u64,
    start_pose: Pose,
    displacement_pose: Pose,
    current_velocity: Pose,
    prev_rotation_matrix: Matrix,
    previous_heading: f64,
    delta_radians: f64,
    total_heading: f64,
    cancel: CancellationToken,
    state: EstimatorState,
}

impl TwoWheelLocalizer {
    /// Create a localizer starting at the origin facing 0 heading
    pub fn new(hardware: TwoWheelHardware, config: TwoWheelConfig) -> Result<Self> {
        Self::with_start_pose(hardware, config, Pose::default())
    }

    /// Create a localizer starting at `start`
    ///
    /// Zeroes the heading sensor and takes the current encoder readings as baselines.
    pub fn with_start_pose(
        hardware: TwoWheelHardware,
        config: TwoWheelConfig,
        start: Pose,
    ) -> Result<Self> {
        config.validate()?;
        let TwoWheelHardware {
            forward,
            strafe,
            mut heading,
            clock,
        } = hardware;

        heading.reset()?;
        let forward_encoder = Encoder::new(forward, config.forward_direction)?;
        let strafe_encoder = Encoder::new(strafe, config.strafe_direction)?;

        info!(
            "Two-wheel localizer on `{}`/`{}` with `{}`, starting at {:?}",
            forward_encoder.name(),
            strafe_encoder.name(),
            heading.name(),
            start
        );

        let mut localizer = TwoWheelLocalizer {
            forward_encoder_pose: Pose::new(0.0, config.forward_encoder_y, 0.0),
            strafe_encoder_pose: Pose::new(config.strafe_encoder_x, 0.0, FRAC_PI_2),
            config,
            imu: heading,
            forward_encoder,
            strafe_encoder,
            timer: NanoTimer::new(clock),
            delta_time_nanos: 1,
            start_pose: start,
            displacement_pose: Pose::default(),
            current_velocity: Pose::default(),
            prev_rotation_matrix: Matrix::new(3, 3),
            previous_heading: start.heading,
            delta_radians: 0.0,
            total_heading: 0.0,
            cancel: CancellationToken::new(),
            state: EstimatorState::Idle,
        };
        localizer.set_prev_rotation_matrix(0.0);
        Ok(localizer)
    }

    pub fn state(&self) -> EstimatorState {
        self.state
    }

    pub fn start_pose(&self) -> Pose {
        self.start_pose
    }

    /// Movement accumulated since the last pose reset
    pub fn displacement_pose(&self) -> Pose {
        self.displacement_pose
    }

    /// Length of the last cycle
    pub fn delta_time_nanos(&self) -> u64 {
        self.delta_time_nanos
    }

    /// Handle that interrupts a pending [`Localizer::reset_imu`] from another thread
    ///
    /// Cancellation is sticky: once cancelled, recalibration keeps failing until
    /// the token is reset.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Set a new forward ticks to inches multiplier, effective next cycle
    pub fn set_forward_multiplier(&mut self, multiplier: f64) {
        debug!("Forward multiplier {} -> {}", self.config.forward_ticks_to_inches, multiplier);
        self.config.forward_ticks_to_inches = multiplier;
    }

    /// Set a new strafe ticks to inches multiplier, effective next cycle
    pub fn set_lateral_multiplier(&mut self, multiplier: f64) {
        debug!("Lateral multiplier {} -> {}", self.config.strafe_ticks_to_inches, multiplier);
        self.config.strafe_ticks_to_inches = multiplier;
    }

    /// Rebuild the rotation matrix used to carry this cycle's delta into the global frame
    pub fn set_prev_rotation_matrix(&mut self, heading: f64) {
        let (sin, cos) = heading.sin_cos();
        let mut rotation = Matrix::new(3, 3);
        rotation.set(0, 0, cos);
        rotation.set(0, 1, -sin);
        rotation.set(1, 0, sin);
        rotation.set(1, 1, cos);
        rotation.set(2, 2, 1.0);
        self.prev_rotation_matrix = rotation;
    }

    /// Poll both encoders and the IMU, recording the signed heading change
    ///
    /// All three sources are read before anything is recorded. A failed read
    /// leaves the previous poll in place.
    pub fn update_encoders(&mut self) -> Result<()> {
        let forward = self.forward_encoder.read()?;
        let strafe = self.strafe_encoder.read()?;
        self.imu.update()?;
        let current_heading = self.start_pose.heading + normalize_angle(self.imu.heading());

        self.forward_encoder.advance(forward);
        self.strafe_encoder.advance(strafe);
        self.delta_radians = heading_delta(self.previous_heading, current_heading);
        self.previous_heading = current_heading;
        Ok(())
    }

    /// Rebase both encoders so the next deltas start from zero
    pub fn reset_encoders(&mut self) -> Result<()> {
        let forward = self.forward_encoder.read()?;
        let strafe = self.strafe_encoder.read()?;
        self.forward_encoder.rebase(forward);
        self.strafe_encoder.rebase(strafe);
        Ok(())
    }

    /// Robot-frame movement `[dx, dy, dθ]` over the last poll
    ///
    /// Removes the travel an offset wheel sees purely from the robot rotating.
    pub fn robot_deltas(&self) -> Matrix {
        Matrix::column(&[
            self.config.forward_ticks_to_inches
                * (self.forward_encoder.delta_position()
                    - self.forward_encoder_pose.y * self.delta_radians),
            self.config.strafe_ticks_to_inches
                * (self.strafe_encoder.delta_position()
                    - self.strafe_encoder_pose.x * self.delta_radians),
            self.delta_radians,
        ])
    }
}

impl Localizer for TwoWheelLocalizer {
    fn name(&self) -> &str {
        "two_wheel"
    }

    /// Start position plus displacement
    ///
    /// The heading is the displacement heading alone; the start heading only
    /// seeds the IMU frame.
    fn pose(&self) -> Pose {
        Pose::new(
            self.start_pose.x + self.displacement_pose.x,
            self.start_pose.y + self.displacement_pose.y,
            self.displacement_pose.heading,
        )
    }

    fn velocity(&self) -> Pose {
        self.current_velocity
    }

    fn velocity_vector(&self) -> Vector {
        self.current_velocity.vector()
    }

    /// Does not touch the accumulated displacement
    fn set_start_pose(&mut self, start: Pose) {
        self.start_pose = start;
    }

    fn set_pose(&mut self, pose: Pose) -> Result<()> {
        self.reset_encoders()?;
        self.displacement_pose = pose.subtract(&self.start_pose);
        info!("Pose set to {:?}", pose);
        Ok(())
    }

    fn update(&mut self) -> Result<()> {
        let now = self.timer.now();
        let elapsed = self.timer.elapsed_nanos_at(now).max(1);
        self.update_encoders()?;
        self.timer.reset_at(now);
        self.delta_time_nanos = elapsed;

        let robot_deltas = self.robot_deltas();
        self.set_prev_rotation_matrix(self.pose().heading);

        let transformation = pose_exponential_transform(robot_deltas.get(2, 0));
        let global_deltas = self
            .prev_rotation_matrix
            .multiply(&transformation)?
            .multiply(&robot_deltas)?;

        let delta = Pose::new(
            global_deltas.get(0, 0),
            global_deltas.get(1, 0),
            global_deltas.get(2, 0),
        );
        self.displacement_pose += delta;

        let seconds = self.delta_time_nanos as f64 / 1e9;
        self.current_velocity = Pose::new(
            delta.x / seconds,
            delta.y / seconds,
            delta.heading / seconds,
        );
        self.total_heading += delta.heading;
        self.state = EstimatorState::Running;

        trace!(
            "dt={}ns delta={:?} pose={:?}",
            self.delta_time_nanos,
            delta,
            self.pose()
        );
        Ok(())
    }

    fn total_heading(&self) -> f64 {
        self.total_heading
    }

    fn forward_multiplier(&self) -> f64 {
        self.config.forward_ticks_to_inches
    }

    fn lateral_multiplier(&self) -> f64 {
        self.config.strafe_ticks_to_inches
    }

    /// Always 1: heading comes from the IMU, not from wheel ticks
    fn turning_multiplier(&self) -> f64 {
        1.0
    }

    fn reset_imu(&mut self) -> Result<()> {
        self.imu.recalibrate()?;
        match settle(self.config.imu_settle_delay(), &self.cancel) {
            SettleOutcome::Completed => {
                info!("IMU `{}` recalibrated", self.imu.name());
                Ok(())
            }
            SettleOutcome::Cancelled => {
                warn!("IMU `{}` recalibration interrupted", self.imu.name());
                Err(LocalizationError::RecalibrationInterrupted)
            }
        }
    }

    /// Not implemented for this localizer: always `false`. A NaN reaching the
    /// displacement is never reported and corrupts every later estimate.
    fn is_nan(&self) -> bool {
        false
    }

    /// No-op for this localizer
    fn set_guard_against_flying(&mut self, _guard: bool) {}
}
