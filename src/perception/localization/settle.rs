//! Cancellable blocking wait used while a sensor settles

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// Result of a settling wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    Completed,
    Cancelled,
}

/// Cloneable flag that interrupts a pending [`settle`] from another thread
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the current wait, and any wait started before `reset()`
    pub fn cancel(&self) {
        let (flag, wakeup) = &*self.inner;
        // A poisoned flag still cancels
        let mut cancelled = flag.lock().unwrap_or_else(|e| e.into_inner());
        *cancelled = true;
        wakeup.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        let (flag, _) = &*self.inner;
        *flag.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Clear a previous cancellation
    pub fn reset(&self) {
        let (flag, _) = &*self.inner;
        *flag.lock().unwrap_or_else(|e| e.into_inner()) = false;
    }
}

/// Block the calling thread for `delay` unless `token` is cancelled first
pub fn settle(delay: Duration, token: &CancellationToken) -> SettleOutcome {
    let (flag, wakeup) = &*token.inner;
    let deadline = Instant::now() + delay;
    let mut cancelled = flag.lock().unwrap_or_else(|e| e.into_inner());
    loop {
        if *cancelled {
            return SettleOutcome::Cancelled;
        }
        let now = Instant::now();
        if now >= deadline {
            return SettleOutcome::Completed;
        }
        cancelled = match wakeup.wait_timeout(cancelled, deadline - now) {
            Ok((guard, _)) => guard,
            Err(poisoned) => poisoned.into_inner().0,
        };
    }
}
