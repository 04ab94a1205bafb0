//! Time source abstraction.
//!
//! The store never calls `Utc::now()` directly. Production wires in
//! [`SystemClock`]; tests use [`ManualClock`] to step time forward
//! deterministically (e.g. "wait 11 minutes" without sleeping).

use std::sync::{Mutex, PoisonError};

use chrono::Utc;

use crate::types::Timestamp;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<Timestamp>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: chrono::Duration) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current += delta;
    }

    /// Jump to an absolute instant.
    pub fn set(&self, instant: Timestamp) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
