// src/task/latch.rs

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

/// Countdown of unfinished prerequisites for a single task.
///
/// Each [`satisfy`](DependencyLatch::satisfy) call removes one outstanding
/// prerequisite; waiters are released when none remain. Extra `satisfy`
/// calls are absorbed.
#[derive(Debug)]
pub struct DependencyLatch {
    remaining: Mutex<usize>,
    released: Condvar,
}

impl DependencyLatch {
    pub fn new(prerequisites: usize) -> Self {
        Self {
            remaining: Mutex::new(prerequisites),
            released: Condvar::new(),
        }
    }

    pub fn satisfy(&self) {
        let mut remaining = self.remaining.lock().unwrap_or_else(PoisonError::into_inner);
        if *remaining == 0 {
            return;
        }
        *remaining -= 1;
        if *remaining == 0 {
            self.released.notify_all();
        }
    }

    pub fn remaining(&self) -> usize {
        *self.remaining.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until every prerequisite has been satisfied.
    ///
    /// Never returns if one of them is never registered.
    pub fn wait(&self) {
        let guard = self.remaining.lock().unwrap_or_else(PoisonError::into_inner);
        let _released = self
            .released
            .wait_while(guard, |remaining| *remaining > 0)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Like [`wait`](DependencyLatch::wait) but gives up after `timeout`.
    ///
    /// Returns `true` if every prerequisite was satisfied in time.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.remaining.lock().unwrap_or_else(PoisonError::into_inner);
        let (remaining, _) = self
            .released
            .wait_timeout_while(guard, timeout, |remaining| *remaining > 0)
            .unwrap_or_else(PoisonError::into_inner);
        *remaining == 0
    }
}
