//! Common utilities and types for Prometheus robot

pub mod math;
pub mod matrix;
pub mod pose;
pub mod vector;

pub use matrix::Matrix;
pub use pose::Pose;
pub use vector::Vector;
