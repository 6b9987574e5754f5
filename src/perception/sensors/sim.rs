//! Simulated sensors and a kinematic ground-truth robot
//!
//! Each simulated sensor hands out a cloneable handle so a test or a demo can
//! drive the readings while the localizer owns the sensor itself.

use super::{Clock, HeadingSource, Sensor, TickSource, TwoWheelHardware};
use crate::common::Pose;
use crate::config::TwoWheelConfig;
use crate::error::{LocalizationError, Result};
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Shared access to a simulated encoder counter
#[derive(Debug, Clone, Default)]
pub struct TickHandle {
    ticks: Arc<AtomicI32>,
    failing: Arc<AtomicBool>,
}

impl TickHandle {
    pub fn set(&self, ticks: i32) {
        self.ticks.store(ticks, Ordering::SeqCst);
    }

    pub fn get(&self) -> i32 {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn add(&self, ticks: i32) {
        self.ticks.fetch_add(ticks, Ordering::SeqCst);
    }

    /// Make subsequent reads fail, as a disconnected encoder would
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

/// Simulated encoder counter
#[derive(Debug)]
pub struct SimTickSource {
    name: String,
    handle: TickHandle,
}

impl SimTickSource {
    pub fn new(name: &str) -> Self {
        SimTickSource {
            name: name.to_string(),
            handle: TickHandle::default(),
        }
    }

    pub fn handle(&self) -> TickHandle {
        self.handle.clone()
    }
}

impl Sensor for SimTickSource {
    fn name(&self) -> &str {
        &self.name
    }
}

impl TickSource for SimTickSource {
    fn position(&mut self) -> Result<i32> {
        if self.handle.failing.load(Ordering::SeqCst) {
            return Err(LocalizationError::sensor(&self.name, "encoder not responding"));
        }
        Ok(self.handle.get())
    }
}

/// Shared access to a simulated IMU
#[derive(Debug, Clone, Default)]
pub struct HeadingHandle {
    raw_bits: Arc<AtomicU64>,
    recalibrations: Arc<AtomicU32>,
    resets: Arc<AtomicU32>,
}

impl HeadingHandle {
    /// Set the heading the IMU physically measures, before its zero offset
    pub fn set_raw(&self, radians: f64) {
        self.raw_bits.store(radians.to_bits(), Ordering::SeqCst);
    }

    pub fn raw(&self) -> f64 {
        f64::from_bits(self.raw_bits.load(Ordering::SeqCst))
    }

    pub fn recalibrations(&self) -> u32 {
        self.recalibrations.load(Ordering::SeqCst)
    }

    pub fn resets(&self) -> u32 {
        self.resets.load(Ordering::SeqCst)
    }
}

/// Simulated absolute heading sensor
///
/// Reports the raw heading relative to the reading captured at the last `reset()`.
#[derive(Debug)]
pub struct SimHeadingSource {
    name: String,
    handle: HeadingHandle,
    zero: f64,
    heading: f64,
}

impl SimHeadingSource {
    pub fn new(name: &str) -> Self {
        SimHeadingSource {
            name: name.to_string(),
            handle: HeadingHandle::default(),
            zero: 0.0,
            heading: 0.0,
        }
    }

    pub fn handle(&self) -> HeadingHandle {
        self.handle.clone()
    }
}

impl Sensor for SimHeadingSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self) -> Result<()> {
        self.heading = self.handle.raw() - self.zero;
        Ok(())
    }
}

impl HeadingSource for SimHeadingSource {
    fn heading(&self) -> f64 {
        self.heading
    }

    fn reset(&mut self) -> Result<()> {
        self.zero = self.handle.raw();
        self.heading = 0.0;
        self.handle.resets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn recalibrate(&mut self) -> Result<()> {
        self.handle.recalibrations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Shared access to a manual clock
#[derive(Debug, Clone, Default)]
pub struct ClockHandle {
    nanos: Arc<AtomicU64>,
}

impl ClockHandle {
    pub fn advance_nanos(&self, nanos: u64) {
        self.nanos.fetch_add(nanos, Ordering::SeqCst);
    }

    pub fn advance(&self, duration: Duration) {
        self.advance_nanos(duration.as_nanos() as u64);
    }

    pub fn now_nanos(&self) -> u64 {
        self.nanos.load(Ordering::SeqCst)
    }
}

/// A clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    handle: ClockHandle,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> ClockHandle {
        self.handle.clone()
    }
}

impl Clock for ManualClock {
    fn now_nanos(&self) -> u64 {
        self.handle.now_nanos()
    }
}

const INTEGRATION_SUBSTEPS: u32 = 100;

/// Kinematic robot that feeds simulated dead wheels and an IMU
///
/// Ground truth is integrated with fine Euler substeps. Wheel ticks follow the
/// same sensing model the two-wheel localizer assumes, including the
/// rotation artifact of the offset-mounted wheels.
pub struct SimulatedRobot {
    config: TwoWheelConfig,
    pose: Pose,
    forward_ticks: f64,
    strafe_ticks: f64,
    forward: TickHandle,
    strafe: TickHandle,
    heading: HeadingHandle,
    clock: ClockHandle,
}

impl SimulatedRobot {
    /// Create a robot at `start` and the hardware binding that observes it
    pub fn new(config: &TwoWheelConfig, start: Pose) -> (Self, TwoWheelHardware) {
        let forward = SimTickSource::new("forward_encoder");
        let strafe = SimTickSource::new("strafe_encoder");
        let heading = SimHeadingSource::new("imu");
        let clock = ManualClock::new();

        let robot = SimulatedRobot {
            config: config.clone(),
            pose: start,
            forward_ticks: 0.0,
            strafe_ticks: 0.0,
            forward: forward.handle(),
            strafe: strafe.handle(),
            heading: heading.handle(),
            clock: clock.handle(),
        };
        robot.heading.set_raw(start.heading);

        let hardware = TwoWheelHardware::new(Box::new(forward), Box::new(strafe), Box::new(heading))
            .with_clock(Box::new(clock));
        (robot, hardware)
    }

    /// Ground-truth pose
    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn forward_handle(&self) -> TickHandle {
        self.forward.clone()
    }

    pub fn strafe_handle(&self) -> TickHandle {
        self.strafe.clone()
    }

    pub fn heading_handle(&self) -> HeadingHandle {
        self.heading.clone()
    }

    pub fn clock_handle(&self) -> ClockHandle {
        self.clock.clone()
    }

    /// Drive with a constant robot-frame twist (inches/s, inches/s, rad/s) for `dt`
    pub fn step(&mut self, forward: f64, strafe: f64, angular: f64, dt: Duration) {
        let seconds = dt.as_secs_f64();
        let sub_dt = seconds / f64::from(INTEGRATION_SUBSTEPS);
        for _ in 0..INTEGRATION_SUBSTEPS {
            let mid_heading = self.pose.heading + 0.5 * angular * sub_dt;
            let (sin, cos) = mid_heading.sin_cos();
            self.pose.x += (forward * cos - strafe * sin) * sub_dt;
            self.pose.y += (forward * sin + strafe * cos) * sub_dt;
            self.pose.heading += angular * sub_dt;
        }

        let turned = angular * seconds;
        self.forward_ticks += forward * seconds / self.config.forward_ticks_to_inches
            + self.config.forward_encoder_y * turned;
        self.strafe_ticks += strafe * seconds / self.config.strafe_ticks_to_inches
            + self.config.strafe_encoder_x * turned;

        self.forward.set(raw_ticks(self.forward_ticks, self.config.forward_direction.sign()));
        self.strafe.set(raw_ticks(self.strafe_ticks, self.config.strafe_direction.sign()));
        self.heading.set_raw(self.pose.heading);
        self.clock.advance(dt);
    }
}

fn raw_ticks(ticks: f64, sign: f64) -> i32 {
    (sign * ticks).round() as i32
}
