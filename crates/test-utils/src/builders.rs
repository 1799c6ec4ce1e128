#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use initiator::{DependencyLatch, Task, TaskId, ThreadMode};

/// Shared, ordered record of which tasks ran.
#[derive(Debug, Clone, Default)]
pub struct RunLog(Arc<Mutex<Vec<TaskId>>>);

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, id: TaskId) {
        self.0.lock().unwrap().push(id);
    }

    pub fn entries(&self) -> Vec<TaskId> {
        self.0.lock().unwrap().clone()
    }
}

/// A task that records when it runs and how often it was satisfied.
///
/// Unlike `FnTask`, the body does not wait for its prerequisites unless
/// built with `waits_for_deps(true)`, so tests can observe raw dispatch
/// behaviour.
#[derive(Debug)]
pub struct RecordingTask {
    id: TaskId,
    deps: Vec<TaskId>,
    thread_mode: ThreadMode,
    need_wait: bool,
    only_in_main_process: bool,
    waits_for_deps: bool,
    latch: DependencyLatch,
    satisfied: AtomicUsize,
    sent: AtomicBool,
    log: RunLog,
}

impl RecordingTask {
    pub fn builder(id: TaskId, log: &RunLog) -> RecordingTaskBuilder {
        RecordingTaskBuilder {
            id,
            deps: Vec::new(),
            thread_mode: ThreadMode::Pooled,
            need_wait: false,
            only_in_main_process: false,
            waits_for_deps: false,
            log: log.clone(),
        }
    }

    pub fn satisfied(&self) -> usize {
        self.satisfied.load(Ordering::SeqCst)
    }

    pub fn is_sent(&self) -> bool {
        self.sent.load(Ordering::SeqCst)
    }
}

impl Task for RecordingTask {
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
        self.satisfied.fetch_add(1, Ordering::SeqCst);
        self.latch.satisfy();
    }

    fn set_sent(&self, sent: bool) {
        self.sent.store(sent, Ordering::SeqCst);
    }

    fn run(&self) -> anyhow::Result<()> {
        if self.waits_for_deps {
            self.latch.wait();
        }
        self.log.push(self.id);
        Ok(())
    }
}

/// Builder for [`RecordingTask`].
pub struct RecordingTaskBuilder {
    id: TaskId,
    deps: Vec<TaskId>,
    thread_mode: ThreadMode,
    need_wait: bool,
    only_in_main_process: bool,
    waits_for_deps: bool,
    log: RunLog,
}

impl RecordingTaskBuilder {
    pub fn after(mut self, dep: TaskId) -> Self {
        self.deps.push(dep);
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

    pub fn waits_for_deps(mut self, val: bool) -> Self {
        self.waits_for_deps = val;
        self
    }

    pub fn build(self) -> Arc<RecordingTask> {
        Arc::new(RecordingTask {
            latch: DependencyLatch::new(self.deps.len()),
            id: self.id,
            deps: self.deps,
            thread_mode: self.thread_mode,
            need_wait: self.need_wait,
            only_in_main_process: self.only_in_main_process,
            waits_for_deps: self.waits_for_deps,
            satisfied: AtomicUsize::new(0),
            sent: AtomicBool::new(false),
            log: self.log,
        })
    }
}
