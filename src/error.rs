//! Error types for Prometheus localization

use crate::lifecycle::State;
use thiserror::Error;

/// Errors raised by the localization stack
#[derive(Debug, Error)]
pub enum LocalizationError {
    #[error("cannot multiply a {lhs_rows}x{lhs_cols} matrix by a {rhs_rows}x{rhs_cols} matrix")]
    DimensionMismatch {
        lhs_rows: usize,
        lhs_cols: usize,
        rhs_rows: usize,
        rhs_cols: usize,
    },

    #[error("sensor `{name}` failed: {reason}")]
    Sensor { name: String, reason: String },

    /// The IMU settling wait was cancelled. The recalibration cannot be resumed.
    #[error("IMU recalibration was interrupted before the sensor settled")]
    RecalibrationInterrupted,

    #[error("node `{node}` cannot transition from {from:?} to {to:?}")]
    InvalidTransition { node: String, from: State, to: State },

    #[error("node `{0}` is not active")]
    NotActive(String),

    #[error("failed to read config: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl LocalizationError {
    /// Shorthand for a sensor failure
    pub fn sensor(name: impl Into<String>, reason: impl Into<String>) -> Self {
        LocalizationError::Sensor {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LocalizationError>;
