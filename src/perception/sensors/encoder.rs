//! Encoder wrapper that tracks position deltas between polls

use super::TickSource;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Mounting direction of an encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }
}

/// An encoder tracking its change in position between polls
///
/// `reset()` only rebases the encoder's notion of "previous". The hardware
/// counter behind the [`TickSource`] is never cleared.
pub struct Encoder {
    source: Box<dyn TickSource>,
    direction: Direction,
    current_position: i32,
    previous_position: i32,
}

impl Encoder {
    /// Wrap a tick source, taking its current reading as the baseline
    pub fn new(mut source: Box<dyn TickSource>, direction: Direction) -> Result<Self> {
        let position = source.position()?;
        Ok(Encoder {
            source,
            direction,
            current_position: position,
            previous_position: position,
        })
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Rebase to the current reading so the next delta starts from zero
    pub fn reset(&mut self) -> Result<()> {
        let position = self.read()?;
        self.rebase(position);
        Ok(())
    }

    /// Poll the source. The previous reading becomes the baseline for `delta_position`.
    pub fn update(&mut self) -> Result<()> {
        let position = self.read()?;
        self.advance(position);
        Ok(())
    }

    /// Poll the source without touching the tracked positions
    pub fn read(&mut self) -> Result<i32> {
        self.source.update()?;
        self.source.position()
    }

    /// Record `position` as the latest reading
    pub fn advance(&mut self, position: i32) {
        self.previous_position = self.current_position;
        self.current_position = position;
    }

    /// Make `position` both the latest reading and the baseline
    pub fn rebase(&mut self, position: i32) {
        self.previous_position = position;
        self.current_position = position;
    }

    /// Direction-adjusted change in ticks between the last two polls
    pub fn delta_position(&self) -> f64 {
        let delta = i64::from(self.current_position) - i64::from(self.previous_position);
        self.direction.sign() * delta as f64
    }

    /// Direction-adjusted position as of the last poll
    pub fn position(&self) -> f64 {
        self.direction.sign() * f64::from(self.current_position)
    }
}
