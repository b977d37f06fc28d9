//! Time sources for sale operations
//!
//! Every operation reads the clock exactly once, when its `CallContext`
//! is built. Production uses wall-clock UTC; tests and scenario replays
//! drive a manual clock forward the way a dev chain fast-forwards blocks.

use chrono::Utc;
use std::cell::Cell;

use crate::types::Timestamp;

pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-clock UTC time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().timestamp().max(0) as Timestamp
    }
}

/// A clock that only moves when told to
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Move forward by `seconds`
    pub fn advance(&self, seconds: Timestamp) {
        self.now.set(self.now.get().saturating_add(seconds));
    }

    /// Jump to `timestamp`. Time never runs backwards.
    pub fn set(&self, timestamp: Timestamp) {
        if timestamp > self.now.get() {
            self.now.set(timestamp);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
