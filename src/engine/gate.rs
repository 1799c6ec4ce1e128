// src/engine/gate.rs

//! Countable barrier the driver thread blocks on in `start()`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::trace;

/// Result of waiting on a [`CompletionGate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The count reached zero.
    Completed,
    /// The timeout elapsed first; `remaining` tasks had not finished yet and
    /// keep running in the background.
    TimedOut { remaining: usize },
    /// The batch was cancelled while waiting; `remaining` tasks had not
    /// finished yet.
    Interrupted { remaining: usize },
}

impl WaitOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, WaitOutcome::Completed)
    }
}

/// Atomic countdown paired with a condition variable.
///
/// `decrement` never takes the count below zero. The decrement that reaches
/// zero notifies under the lock, and waiters re-check the count under the
/// same lock, so a wakeup cannot be lost between the check and the wait.
/// The lock also guards the interrupt flag.
#[derive(Debug, Default)]
pub struct CompletionGate {
    count: AtomicUsize,
    interrupted: Mutex<bool>,
    zero: Condvar,
}

impl CompletionGate {
    pub fn new(count: usize) -> Self {
        Self {
            count: AtomicUsize::new(count),
            interrupted: Mutex::new(false),
            zero: Condvar::new(),
        }
    }

    /// Reset the count before anyone waits on it.
    pub(crate) fn arm(&self, count: usize) {
        let _guard = self.interrupted.lock().unwrap_or_else(PoisonError::into_inner);
        self.count.store(count, Ordering::Release);
    }

    /// Wake every waiter with [`WaitOutcome::Interrupted`], now and for any
    /// later wait that finds the count above zero.
    pub fn interrupt(&self) {
        let mut interrupted = self.interrupted.lock().unwrap_or_else(PoisonError::into_inner);
        *interrupted = true;
        self.zero.notify_all();
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Remove one outstanding task. Returns the count after the call.
    pub fn decrement(&self) -> usize {
        let previous = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));

        match previous {
            Ok(1) => {
                let _guard = self.interrupted.lock().unwrap_or_else(PoisonError::into_inner);
                self.zero.notify_all();
                0
            }
            Ok(n) => n - 1,
            Err(_) => {
                trace!("completion gate already at zero; ignoring decrement");
                0
            }
        }
    }

    /// Block until the count reaches zero, `timeout` elapses or the gate is
    /// interrupted.
    ///
    /// A timeout too large to express as a deadline waits without one.
    /// Spurious wakeups and poisoned locks are absorbed; this never fails.
    pub fn wait_timeout(&self, timeout: Duration) -> WaitOutcome {
        let deadline = Instant::now().checked_add(timeout);
        let mut guard = self.interrupted.lock().unwrap_or_else(PoisonError::into_inner);

        loop {
            let remaining = self.count();
            if remaining == 0 {
                return WaitOutcome::Completed;
            }
            if *guard {
                return WaitOutcome::Interrupted { remaining };
            }

            guard = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return WaitOutcome::TimedOut { remaining };
                    }
                    match self.zero.wait_timeout(guard, deadline - now) {
                        Ok((guard, _)) => guard,
                        Err(poisoned) => poisoned.into_inner().0,
                    }
                }
                None => self
                    .zero
                    .wait(guard)
                    .unwrap_or_else(PoisonError::into_inner),
            };
        }
    }
}
