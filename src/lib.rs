//! Dead-wheel localization for the Prometheus mobile robot
//!
//! Estimates planar pose and velocity from two orthogonal odometry wheels and
//! an absolute heading sensor. Hardware stays behind the traits in
//! [`perception::sensors`].

pub mod common;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod perception;

pub use crate::error::{LocalizationError, Result};

use crate::lifecycle::LifecycleNode;
use crate::perception::PerceptionStack;
use log::info;

/// Core functionality for the Prometheus robot
pub struct PrometheusCore {
    components: Vec<Box<dyn LifecycleNode>>,
}

impl PrometheusCore {
    /// Create a new instance of PrometheusCore
    pub fn new() -> Self {
        PrometheusCore {
            components: Vec::new(),
        }
    }

    /// Register a component with the core
    pub fn register<T: LifecycleNode + 'static>(&mut self, component: T) {
        self.components.push(Box::new(component));
    }

    /// Configure and activate all registered components
    pub fn init(&mut self) -> Result<()> {
        for component in &mut self.components {
            component.on_configure()?;
            component.on_activate()?;
        }
        info!("Initialized {} component(s)", self.components.len());
        Ok(())
    }

    /// Deactivate and clean up all registered components
    pub fn shutdown(&mut self) -> Result<()> {
        for component in &mut self.components {
            component.on_deactivate()?;
            component.on_cleanup()?;
        }
        info!("Shut down {} component(s)", self.components.len());
        Ok(())
    }

    /// Get a mutable reference to the perception stack, if one is registered
    pub fn perception_stack_mut(&mut self) -> Option<&mut PerceptionStack> {
        self.components
            .iter_mut()
            .find_map(|component| component.as_any_mut().downcast_mut::<PerceptionStack>())
    }
}

impl Default for PrometheusCore {
    fn default() -> Self {
        Self::new()
    }
}
