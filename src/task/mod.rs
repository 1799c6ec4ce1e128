// src/task/mod.rs

//! The task contract consumed by the scheduler.
//!
//! - [`Task`] is what the scheduler and executor talk to.
//! - [`latch`] provides [`DependencyLatch`], the counter a task uses to
//!   wait for its own prerequisites.
//! - [`fn_task`] provides [`FnTask`], a closure-backed task with a latch
//!   built in.

pub mod fn_task;
pub mod latch;

pub use fn_task::{FnTask, FnTaskBuilder};
pub use latch::DependencyLatch;

use crate::types::{TaskId, ThreadMode};

/// One unit of startup work.
///
/// The scheduler never gates dispatch on dependencies. It only relays
/// [`satisfy`](Task::satisfy) once per finished prerequisite; a task that
/// must not start before its prerequisites finish has to count those
/// signals itself (see [`DependencyLatch`]).
pub trait Task: Send + Sync {
    /// Identity shared by all instances of this task type.
    fn id(&self) -> TaskId;

    /// Ids of the tasks this one depends on.
    fn depends_on(&self) -> Vec<TaskId> {
        Vec::new()
    }

    fn thread_mode(&self) -> ThreadMode {
        ThreadMode::Pooled
    }

    /// Whether `start()` should block until this task finishes.
    ///
    /// Ignored for `ThreadMode::Main` tasks, which finish before `start()`
    /// moves on anyway.
    fn need_wait(&self) -> bool {
        false
    }

    /// Whether this task may only run in the primary process.
    fn only_in_main_process(&self) -> bool {
        true
    }

    /// One prerequisite of this task has finished.
    fn satisfy(&self);

    /// Called with `true` once the task has been handed to the executor.
    fn set_sent(&self, sent: bool);

    /// Task body. Errors are logged by the executor; there is no retry.
    fn run(&self) -> anyhow::Result<()>;
}

/// Whether the driver thread blocks on this task in `start()`.
pub(crate) fn is_wait_significant(task: &dyn Task) -> bool {
    task.thread_mode() != ThreadMode::Main && task.need_wait()
}
