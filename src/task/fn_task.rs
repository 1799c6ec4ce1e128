// src/task/fn_task.rs

//! Closure-backed [`Task`] implementation.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::task::{DependencyLatch, Task};
use crate::types::{TaskId, ThreadMode};

type Body = Box<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// A task whose body is a closure.
///
/// Before running the closure, the task blocks on its [`DependencyLatch`]
/// until every declared dependency has reported back through `satisfy()`.
pub struct FnTask {
    id: TaskId,
    deps: Vec<TaskId>,
    thread_mode: ThreadMode,
    need_wait: bool,
    only_in_main_process: bool,
    latch: DependencyLatch,
    sent: AtomicBool,
    body: Body,
}

impl fmt::Debug for FnTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTask")
            .field("id", &self.id)
            .field("deps", &self.deps)
            .field("thread_mode", &self.thread_mode)
            .field("need_wait", &self.need_wait)
            .field("only_in_main_process", &self.only_in_main_process)
            .field("unsatisfied", &self.latch.remaining())
            .finish_non_exhaustive()
    }
}

impl FnTask {
    pub fn builder(id: TaskId) -> FnTaskBuilder {
        FnTaskBuilder::new(id)
    }

    pub fn is_sent(&self) -> bool {
        self.sent.load(Ordering::Acquire)
    }

    /// The latch counting this task's unfinished prerequisites.
    pub fn latch(&self) -> &DependencyLatch {
        &self.latch
    }
}

impl Task for FnTask {
    fn id(&self) -> TaskId {
        self.id
    }

    fn depends_on(&self) -> Vec<TaskId> {
        self.deps.clone()
    }

    fn thread_mode(&self) -> ThreadMode {
        self.thread_mode
    }

    fn need_wait(&self) -> bool {
        self.need_wait
    }

    fn only_in_main_process(&self) -> bool {
        self.only_in_main_process
    }

    fn satisfy(&self) {
        self.latch.satisfy();
    }

    fn set_sent(&self, sent: bool) {
        self.sent.store(sent, Ordering::Release);
    }

    fn run(&self) -> anyhow::Result<()> {
        if self.latch.remaining() > 0 {
            debug!(
                task = %self.id,
                unsatisfied = self.latch.remaining(),
                "waiting for prerequisites"
            );
        }
        self.latch.wait();
        (self.body)()
    }
}

/// Builder for [`FnTask`].
pub struct FnTaskBuilder {
    id: TaskId,
    deps: Vec<TaskId>,
    thread_mode: ThreadMode,
    need_wait: bool,
    only_in_main_process: bool,
}

impl FnTaskBuilder {
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            deps: Vec::new(),
            thread_mode: ThreadMode::default(),
            need_wait: false,
            only_in_main_process: true,
        }
    }

    pub fn after(mut self, dep: TaskId) -> Self {
        if !self.deps.contains(&dep) {
            self.deps.push(dep);
        }
        self
    }

    pub fn thread_mode(mut self, mode: ThreadMode) -> Self {
        self.thread_mode = mode;
        self
    }

    pub fn need_wait(mut self, val: bool) -> Self {
        self.need_wait = val;
        self
    }

    pub fn only_in_main_process(mut self, val: bool) -> Self {
        self.only_in_main_process = val;
        self
    }

    /// Finish the task with the given body.
    pub fn run<F>(self, body: F) -> FnTask
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        FnTask {
            latch: DependencyLatch::new(self.deps.len()),
            id: self.id,
            deps: self.deps,
            thread_mode: self.thread_mode,
            need_wait: self.need_wait,
            only_in_main_process: self.only_in_main_process,
            sent: AtomicBool::new(false),
            body: Box::new(body),
        }
    }
}
