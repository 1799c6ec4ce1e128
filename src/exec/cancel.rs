// src/exec/cancel.rs

//! Cancellation state an executor shares with whoever may cancel it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::AbortHandle;

/// Cloneable cancellation flag plus the abort handles of queued pool jobs.
///
/// Every clone observes and triggers the same cancellation, so a token can
/// be moved to another thread while the executor is busy dispatching.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    queued: Arc<Mutex<Vec<AbortHandle>>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Raise the flag and abort queued pool jobs. Returns how many abort
    /// requests were sent.
    pub fn cancel(&self) -> usize {
        let mut queued = self.queued.lock().unwrap_or_else(PoisonError::into_inner);
        self.cancelled.store(true, Ordering::Release);

        let aborted = queued.len();
        for handle in queued.drain(..) {
            handle.abort();
        }
        aborted
    }

    /// Remember a freshly spawned pool job so a later `cancel` can abort it.
    pub fn track(&self, handle: AbortHandle) {
        let mut queued = self.queued.lock().unwrap_or_else(PoisonError::into_inner);

        // Finished handles are no longer cancellable; drop them as we go.
        queued.retain(|h| !h.is_finished());

        if self.cancelled.load(Ordering::Acquire) {
            handle.abort();
        } else {
            queued.push(handle);
        }
    }
}
