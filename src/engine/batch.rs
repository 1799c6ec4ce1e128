// src/engine/batch.rs

//! Completion bookkeeping shared between the scheduler and the threads that
//! run its tasks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use tracing::{debug, info, trace};

use crate::dag::{DependencyGraph, FinishedSet};
use crate::engine::gate::{CompletionGate, WaitOutcome};
use crate::exec::CancelToken;
use crate::task::{Task, is_wait_significant};
use crate::types::TaskId;

/// State of one batch that completion callbacks mutate concurrently.
#[derive(Debug, Default)]
pub(crate) struct BatchState {
    graph: RwLock<DependencyGraph>,
    finished: FinishedSet,
    /// Wait-significant tasks that have not finished yet.
    need_wait_count: AtomicUsize,
    /// Ids behind `need_wait_count`, for diagnostics.
    pending_wait: Mutex<Vec<TaskId>>,
    /// Armed once, by `start()`.
    gate: CompletionGate,
}

impl BatchState {
    /// Add `task` to the dependency graph and, if the driver must wait for
    /// it, to the wait set. Returns whether it joined the wait set.
    pub(crate) fn register(&self, task: &Arc<dyn Task>) -> bool {
        self.graph
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(task, &self.finished);

        if !is_wait_significant(task.as_ref()) {
            return false;
        }

        self.pending_wait
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(task.id());
        self.need_wait_count.fetch_add(1, Ordering::AcqRel);
        true
    }

    /// Arm the completion gate with the current wait-set size.
    pub(crate) fn arm_gate(&self) -> usize {
        let count = self.need_wait_count();
        self.gate.arm(count);
        count
    }

    pub(crate) fn wait(&self, timeout: Duration) -> WaitOutcome {
        self.gate.wait_timeout(timeout)
    }

    /// Release the driver from its wait; cancelled tasks never finish.
    pub(crate) fn interrupt(&self) {
        self.gate.interrupt();
    }

    pub(crate) fn mark_task_done(&self, task: &dyn Task) {
        let id = task.id();
        self.finished.insert(id);

        if !is_wait_significant(task) {
            trace!(task = %id, "task finished");
            return;
        }

        {
            let mut pending = self.pending_wait.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(pos) = pending.iter().position(|p| *p == id) {
                pending.remove(pos);
            }
        }

        let _ = self
            .need_wait_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));

        let remaining = self.gate.decrement();
        debug!(task = %id, remaining, "wait-significant task finished");
    }

    pub(crate) fn satisfy_children(&self, task: &dyn Task) -> usize {
        let signalled = self
            .graph
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .notify_dependents(task.id());
        if signalled > 0 {
            trace!(task = %task.id(), signalled, "dependents notified");
        }
        signalled
    }

    pub(crate) fn need_wait_count(&self) -> usize {
        self.need_wait_count.load(Ordering::Acquire)
    }

    pub(crate) fn pending_wait_tasks(&self) -> Vec<TaskId> {
        self.pending_wait
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn finished_tasks(&self) -> Vec<TaskId> {
        self.finished.snapshot()
    }

    /// Prerequisite id and its dependents' ids, for logging.
    pub(crate) fn dependency_summary(&self) -> Vec<(TaskId, Vec<TaskId>)> {
        let graph = self.graph.read().unwrap_or_else(PoisonError::into_inner);
        let mut summary: Vec<(TaskId, Vec<TaskId>)> = graph
            .prerequisites()
            .map(|dep| (dep, graph.dependents_of(dep)))
            .collect();
        summary.sort_by_key(|(dep, _)| *dep);
        summary
    }
}

/// Cloneable handle through which finished tasks report back to their
/// batch.
#[derive(Debug, Clone)]
pub struct CompletionHandle {
    batch: Arc<BatchState>,
}

impl CompletionHandle {
    pub(crate) fn new(batch: Arc<BatchState>) -> Self {
        Self { batch }
    }

    /// Record `task` as finished and signal its dependents.
    pub fn finish(&self, task: &dyn Task) {
        self.batch.mark_task_done(task);
        self.batch.satisfy_children(task);
    }
}

/// Cloneable handle that cancels a batch from any thread, including while
/// the driver is blocked in `start()`.
///
/// Jobs that have not started are skipped and never reported as finished,
/// so cancelling also releases the driver from its wait.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancelToken,
    batch: Arc<BatchState>,
}

impl CancelHandle {
    pub(crate) fn new(token: CancelToken, batch: Arc<BatchState>) -> Self {
        Self { token, batch }
    }

    pub fn cancel(&self) {
        let aborted = self.token.cancel();
        self.batch.interrupt();
        info!(
            aborted,
            pending = ?self.batch.pending_wait_tasks(),
            "startup batch cancelled; tasks not yet started will be skipped"
        );
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
