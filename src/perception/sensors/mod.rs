//! Sensor interfaces for Prometheus robot
//!
//! The localizers never talk to hardware directly. They consume three narrow
//! collaborators: raw encoder tick sources, an absolute heading source and a
//! monotonic clock.

pub mod encoder;
pub mod sim;
pub mod timer;

use crate::error::Result;

/// A generic sensor interface
pub trait Sensor: Send + Sync {
    /// Get the sensor name
    fn name(&self) -> &str;

    /// Poll the device. Drivers that report on demand leave this as a no-op.
    fn update(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A raw encoder counter
pub trait TickSource: Sensor {
    /// Current raw position in ticks. The hardware counter is never cleared.
    fn position(&mut self) -> Result<i32>;
}

/// An absolute heading sensor, e.g. an IMU
pub trait HeadingSource: Sensor {
    /// Heading in radians as of the last `update()`
    fn heading(&self) -> f64;

    /// Zero position and heading
    fn reset(&mut self) -> Result<()>;

    /// Start an IMU recalibration. Returns immediately; the caller owns the settling wait.
    fn recalibrate(&mut self) -> Result<()>;
}

/// A monotonic nanosecond clock
pub trait Clock: Send + Sync {
    fn now_nanos(&self) -> u64;
}

/// Hardware binding for a two dead-wheel localizer
pub struct TwoWheelHardware {
    pub forward: Box<dyn TickSource>,
    pub strafe: Box<dyn TickSource>,
    pub heading: Box<dyn HeadingSource>,
    pub clock: Box<dyn Clock>,
}

impl TwoWheelHardware {
    /// Bind the sensors, using the process monotonic clock
    pub fn new(
        forward: Box<dyn TickSource>,
        strafe: Box<dyn TickSource>,
        heading: Box<dyn HeadingSource>,
    ) -> Self {
        TwoWheelHardware {
            forward,
            strafe,
            heading,
            clock: Box::new(timer::MonotonicClock::new()),
        }
    }

    /// Replace the clock
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
