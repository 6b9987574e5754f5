//! Configuration loaded from YAML

use crate::error::{LocalizationError, Result};
use crate::perception::sensors::encoder::Direction;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Full configuration for the localization stack
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrometheusConfig {
    #[serde(default)]
    pub two_wheel: TwoWheelConfig,

    #[serde(default)]
    pub perception: PerceptionSettings,

    #[serde(default)]
    pub control_loop: ControlLoopSettings,
}

impl PrometheusConfig {
    /// Load and validate configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PrometheusConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.two_wheel.validate()?;
        if self.control_loop.period_ms == 0 {
            return Err(LocalizationError::InvalidConfig(
                "control_loop.period_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Calibration for the two dead-wheel localizer
///
/// Offsets are measured from the robot's rotation center, x forward and y left.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoWheelConfig {
    /// Forward encoder ticks to inches, found empirically
    #[serde(default = "default_ticks_to_inches")]
    pub forward_ticks_to_inches: f64,

    /// Strafe encoder ticks to inches, found empirically
    #[serde(default = "default_ticks_to_inches")]
    pub strafe_ticks_to_inches: f64,

    /// Lateral (y) offset of the forward wheel
    #[serde(default = "default_forward_encoder_y")]
    pub forward_encoder_y: f64,

    /// Longitudinal (x) offset of the strafe wheel
    #[serde(default = "default_strafe_encoder_x")]
    pub strafe_encoder_x: f64,

    #[serde(default)]
    pub forward_direction: Direction,

    #[serde(default)]
    pub strafe_direction: Direction,

    /// Time the heading sensor needs after a recalibration request
    #[serde(default = "default_imu_settle_ms")]
    pub imu_settle_ms: u64,
}

impl TwoWheelConfig {
    pub fn imu_settle_delay(&self) -> Duration {
        Duration::from_millis(self.imu_settle_ms)
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("forward_ticks_to_inches", self.forward_ticks_to_inches),
            ("strafe_ticks_to_inches", self.strafe_ticks_to_inches),
            ("forward_encoder_y", self.forward_encoder_y),
            ("strafe_encoder_x", self.strafe_encoder_x),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(LocalizationError::InvalidConfig(format!(
                    "two_wheel.{} must be finite, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for TwoWheelConfig {
    fn default() -> Self {
        TwoWheelConfig {
            forward_ticks_to_inches: default_ticks_to_inches(),
            strafe_ticks_to_inches: default_ticks_to_inches(),
            forward_encoder_y: default_forward_encoder_y(),
            strafe_encoder_x: default_strafe_encoder_x(),
            forward_direction: Direction::Forward,
            strafe_direction: Direction::Forward,
            imu_settle_ms: default_imu_settle_ms(),
        }
    }
}

/// Perception stack settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerceptionSettings {
    /// Recalibrate the heading sensor while the stack is configured
    #[serde(default = "default_true")]
    pub recalibrate_on_configure: bool,
}

impl Default for PerceptionSettings {
    fn default() -> Self {
        PerceptionSettings {
            recalibrate_on_configure: true,
        }
    }
}

/// Control loop settings for the host binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlLoopSettings {
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
}

impl ControlLoopSettings {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

impl Default for ControlLoopSettings {
    fn default() -> Self {
        ControlLoopSettings {
            period_ms: default_period_ms(),
        }
    }
}

fn default_ticks_to_inches() -> f64 {
    0.002
}

fn default_forward_encoder_y() -> f64 {
    0.75
}

fn default_strafe_encoder_x() -> f64 {
    -6.6
}

fn default_imu_settle_ms() -> u64 {
    300
}

fn default_period_ms() -> u64 {
    10
}

fn default_true() -> bool {
    true
}
