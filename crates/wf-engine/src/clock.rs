//! Logical time for location changes.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of logical timestamps for location changes.
pub trait Clock: Send + Sync {
    /// The current value. Successive calls never go backwards.
    fn now(&self) -> u64;
}

/// A counter that advances by one on every read.
#[derive(Debug)]
pub struct LogicalClock {
    next: AtomicU64,
}

impl LogicalClock {
    /// A clock whose first reading is 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// A clock whose first reading is `value`.
    pub fn starting_at(value: u64) -> Self {
        Self {
            next: AtomicU64::new(value),
        }
    }
}

impl Default for LogicalClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for LogicalClock {
    fn now(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}
