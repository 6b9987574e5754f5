//! Perception module for Prometheus robot
pub mod localization;
pub mod sensors;

use self::localization::Localizer;
use crate::common::{Pose, Vector};
use crate::config::PerceptionSettings;
use crate::error::Result;
use crate::lifecycle::{LifecycleNode, LifecycleNodeBase, State};
use log::info;
use std::any::Any;

/// Perception stack for the robot
pub struct PerceptionStack {
    base: LifecycleNodeBase,
    localizer: Box<dyn Localizer>,
    settings: PerceptionSettings,
}

impl PerceptionStack {
    /// Create a new perception stack around a localizer
    pub fn new<L: Localizer + 'static>(localizer: L, settings: PerceptionSettings) -> Self {
        PerceptionStack {
            base: LifecycleNodeBase::new("perception_stack"),
            localizer: Box::new(localizer),
            settings,
        }
    }

    pub fn state(&self) -> State {
        self.base.get_state()
    }

    /// Run one localization cycle. The stack must be active.
    pub fn update(&mut self) -> Result<()> {
        self.base.ensure_active()?;
        self.localizer.update()
    }

    /// Get the current pose estimate
    pub fn get_pose(&self) -> Pose {
        self.localizer.pose()
    }

    pub fn get_velocity(&self) -> Pose {
        self.localizer.velocity()
    }

    pub fn get_velocity_vector(&self) -> Vector {
        self.localizer.velocity_vector()
    }

    pub fn set_pose(&mut self, pose: Pose) -> Result<()> {
        self.localizer.set_pose(pose)
    }

    pub fn localizer(&self) -> &dyn Localizer {
        self.localizer.as_ref()
    }

    pub fn localizer_mut(&mut self) -> &mut dyn Localizer {
        self.localizer.as_mut()
    }
}

impl LifecycleNode for PerceptionStack {
    fn on_configure(&mut self) -> Result<()> {
        info!("Configuring perception stack ({})", self.localizer.name());
        if self.settings.recalibrate_on_configure {
            self.localizer.reset_imu()?;
        }
        self.base.transition(State::Inactive)
    }

    fn on_activate(&mut self) -> Result<()> {
        info!("Activating perception stack");
        self.base.transition(State::Active)
    }

    fn on_deactivate(&mut self) -> Result<()> {
        info!("Deactivating perception stack");
        self.base.transition(State::Inactive)
    }

    fn on_cleanup(&mut self) -> Result<()> {
        info!("Cleaning up perception stack");
        self.base.transition(State::Unconfigured)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
