//! Monotonic clock and elapsed-time timer

use super::Clock;
use std::time::Instant;

/// Process monotonic clock, counting from its creation
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_nanos(&self) -> u64 {
        // u64 nanoseconds overflow after ~584 years
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Reports nanoseconds elapsed since the last reset
pub struct NanoTimer {
    clock: Box<dyn Clock>,
    start: u64,
}

impl NanoTimer {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        let start = clock.now_nanos();
        NanoTimer { clock, start }
    }

    pub fn reset(&mut self) {
        self.start = self.clock.now_nanos();
    }

    /// Restart counting from `now`, a reading taken with [`NanoTimer::now`]
    pub fn reset_at(&mut self, now: u64) {
        self.start = now;
    }

    pub fn now(&self) -> u64 {
        self.clock.now_nanos()
    }

    pub fn elapsed_nanos(&self) -> u64 {
        self.elapsed_nanos_at(self.now())
    }

    /// Nanoseconds from the last reset to `now`
    pub fn elapsed_nanos_at(&self, now: u64) -> u64 {
        now.saturating_sub(self.start)
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_nanos() as f64 / 1e9
    }
}
