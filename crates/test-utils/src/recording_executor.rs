use std::sync::{Arc, Mutex};

use initiator::errors::Result;
use initiator::exec::{CancelToken, Dispatch, ExecutorBackend};
use initiator::{TaskId, ThreadMode};

/// A fake executor that:
/// - records the order and thread mode of every dispatch
/// - runs each job inline on the dispatching thread, unless told to hold
///   jobs back (so tests can inspect the batch before anything finishes)
/// - holds every job dispatched after its token was cancelled.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    dispatched: Arc<Mutex<Vec<(TaskId, ThreadMode)>>>,
    held: Vec<Dispatch>,
    hold: bool,
    token: CancelToken,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep dispatched jobs instead of running them.
    pub fn holding() -> Self {
        Self {
            hold: true,
            ..Self::default()
        }
    }

    /// Shared view of the dispatch log, usable after the executor moved
    /// into an `Initiator`.
    pub fn log(&self) -> Arc<Mutex<Vec<(TaskId, ThreadMode)>>> {
        Arc::clone(&self.dispatched)
    }
}

impl ExecutorBackend for RecordingExecutor {
    fn dispatch(&mut self, job: Dispatch) -> Result<()> {
        self.dispatched
            .lock()
            .unwrap()
            .push((job.task_id(), job.thread_mode()));

        if self.hold || self.token.is_cancelled() {
            self.held.push(job);
        } else {
            job.run();
        }
        Ok(())
    }

    fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }
}

/// Dispatched ids, in order.
pub fn dispatched_ids(log: &Arc<Mutex<Vec<(TaskId, ThreadMode)>>>) -> Vec<TaskId> {
    log.lock().unwrap().iter().map(|(id, _)| *id).collect()
}
