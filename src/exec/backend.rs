// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The scheduler hands every task to an `ExecutorBackend` wrapped in a
//! [`Dispatch`]. This makes it easy to swap in a fake executor in tests
//! while keeping the production thread mapping in [`ThreadExecutor`].
//!
//! [`ThreadExecutor`]: crate::exec::ThreadExecutor

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error};

use crate::dag::{TaskRunState, TaskStateCell};
use crate::engine::CompletionHandle;
use crate::errors::Result;
use crate::exec::cancel::CancelToken;
use crate::task::Task;
use crate::types::{TaskId, ThreadMode};

/// Trait abstracting how dispatched tasks are executed.
///
/// Production code uses [`ThreadExecutor`](crate::exec::ThreadExecutor);
/// tests can provide their own implementation.
pub trait ExecutorBackend: Send {
    /// Run `job` in the context its thread mode demands.
    ///
    /// For `ThreadMode::Main` jobs this must not return before the job has
    /// run. Errors are reserved for failing to hand the job off at all.
    fn dispatch(&mut self, job: Dispatch) -> Result<()>;

    /// Token that cancels jobs which have not started yet.
    ///
    /// The token is shared, so it can be triggered from another thread
    /// while `dispatch` calls are still in flight.
    fn cancel_token(&self) -> CancelToken;
}

/// One task on its way to the executor, bundled with what is needed to
/// report its completion.
pub struct Dispatch {
    task: Arc<dyn Task>,
    state: Arc<TaskStateCell>,
    completion: CompletionHandle,
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("task", &self.task.id())
            .field("thread_mode", &self.task.thread_mode())
            .field("state", &self.state.get())
            .finish()
    }
}

impl Dispatch {
    pub(crate) fn new(
        task: Arc<dyn Task>,
        state: Arc<TaskStateCell>,
        completion: CompletionHandle,
    ) -> Self {
        Self {
            task,
            state,
            completion,
        }
    }

    pub fn task_id(&self) -> TaskId {
        self.task.id()
    }

    pub fn thread_mode(&self) -> ThreadMode {
        self.task.thread_mode()
    }

    pub fn state(&self) -> TaskRunState {
        self.state.get()
    }

    /// Run the task body on the current thread and report completion.
    ///
    /// A failing or panicking body is logged and still counts as finished.
    pub fn run(self) {
        let id = self.task.id();
        self.state.set(TaskRunState::Running);
        let started = Instant::now();

        debug!(task = %id, thread_mode = ?self.task.thread_mode(), "task started");

        match panic::catch_unwind(AssertUnwindSafe(|| self.task.run())) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!(task = %id, error = %format!("{err:#}"), "task failed");
            }
            Err(payload) => {
                error!(task = %id, panic = panic_message(payload.as_ref()), "task panicked");
            }
        }

        self.state.set(TaskRunState::Done);
        self.completion.finish(self.task.as_ref());

        debug!(
            task = %id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "task finished"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string panic payload"
    }
}
