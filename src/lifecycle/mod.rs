//! Lifecycle management for Prometheus components

use crate::error::{LocalizationError, Result};
use log::debug;
use std::any::Any;

/// Trait for components that follow a lifecycle pattern
pub trait LifecycleNode: Send + Sync {
    /// Configure the node
    fn on_configure(&mut self) -> Result<()>;

    /// Activate the node
    fn on_activate(&mut self) -> Result<()>;

    /// Deactivate the node
    fn on_deactivate(&mut self) -> Result<()>;

    /// Clean up the node
    fn on_cleanup(&mut self) -> Result<()>;

    /// Convert to Any for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Base implementation for lifecycle nodes
pub struct LifecycleNodeBase {
    pub name: String,
    state: State,
}

/// State of a lifecycle node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Unconfigured,
    Inactive,
    Active,
    Finalized,
}

impl State {
    fn can_transition_to(self, next: State) -> bool {
        use State::*;
        matches!(
            (self, next),
            (Unconfigured, Inactive)
                | (Inactive, Active)
                | (Active, Inactive)
                | (Inactive, Unconfigured)
                | (Unconfigured, Finalized)
                | (Inactive, Finalized)
        )
    }
}

impl LifecycleNodeBase {
    /// Create a new lifecycle node base
    pub fn new(name: &str) -> Self {
        LifecycleNodeBase {
            name: name.to_string(),
            state: State::Unconfigured,
        }
    }

    /// Get the current state
    pub fn get_state(&self) -> State {
        self.state
    }

    /// Move to `state`, rejecting transitions the lifecycle does not allow
    pub fn transition(&mut self, state: State) -> Result<()> {
        if !self.state.can_transition_to(state) {
            return Err(LocalizationError::InvalidTransition {
                node: self.name.clone(),
                from: self.state,
                to: state,
            });
        }
        debug!("{}: {:?} -> {:?}", self.name, self.state, state);
        self.state = state;
        Ok(())
    }

    /// Fail with [`LocalizationError::NotActive`] unless the node is active
    pub fn ensure_active(&self) -> Result<()> {
        if self.state == State::Active {
            Ok(())
        } else {
            Err(LocalizationError::NotActive(self.name.clone()))
        }
    }
}
