// src/engine/initiator.rs

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use tracing::{debug, info, warn};

use crate::config::InitiatorOptions;
use crate::dag::{Sorter, StableTopoSorter, TaskRunState, TaskStateCell};
use crate::engine::batch::{BatchState, CancelHandle, CompletionHandle};
use crate::engine::gate::WaitOutcome;
use crate::env::{self, Environment};
use crate::errors::{InitiatorError, Result};
use crate::exec::{Dispatch, ExecutorBackend, ThreadExecutor};
use crate::task::Task;
use crate::types::TaskId;

/// A registered task plus the state cell the executor updates.
struct TaskSlot {
    task: Arc<dyn Task>,
    state: Arc<TaskStateCell>,
}

/// Orders and runs one batch of startup tasks.
///
/// Register tasks with [`add_task`](Initiator::add_task), then call
/// [`start`](Initiator::start) from the driver thread. `start` sorts the
/// batch, dispatches every task to the context its thread mode demands and
/// blocks until all wait-significant tasks finished or the wait timeout
/// elapsed.
///
/// An `Initiator` serves exactly one batch.
pub struct Initiator<E: ExecutorBackend = ThreadExecutor> {
    env: Environment,
    options: InitiatorOptions,
    tasks: Vec<TaskSlot>,
    batch: Arc<BatchState>,
    executor: E,
    sorter: Box<dyn Sorter>,
    started: bool,
}

impl<E: ExecutorBackend> fmt::Debug for Initiator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Initiator")
            .field("env", &self.env)
            .field("options", &self.options)
            .field("tasks", &self.task_ids())
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl Initiator<ThreadExecutor> {
    /// New scheduler for the environment recorded by [`init`](crate::init).
    pub fn create() -> Result<Self> {
        let env = env::environment()?.clone();
        Ok(Self::with_environment(env))
    }

    pub fn with_environment(env: Environment) -> Self {
        Self::with_options(env, InitiatorOptions::default())
    }

    pub fn with_options(env: Environment, options: InitiatorOptions) -> Self {
        let executor = ThreadExecutor::new(&options);
        Self::with_executor(env, options, executor)
    }
}

impl<E: ExecutorBackend> Initiator<E> {
    pub fn with_executor(env: Environment, options: InitiatorOptions, executor: E) -> Self {
        Self {
            env,
            options,
            tasks: Vec::new(),
            batch: Arc::new(BatchState::default()),
            executor,
            sorter: Box::new(StableTopoSorter),
            started: false,
        }
    }

    /// Replace the dispatch-order strategy.
    pub fn with_sorter(mut self, sorter: impl Sorter + 'static) -> Self {
        self.sorter = Box::new(sorter);
        self
    }

    pub fn add_task(&mut self, task: impl Task + 'static) -> &mut Self {
        self.add_shared(Arc::new(task))
    }

    /// Register a task the caller keeps a handle to.
    pub fn add_shared(&mut self, task: Arc<dyn Task>) -> &mut Self {
        if self.started {
            warn!(task = %task.id(), "add_task after start(); ignoring");
            return self;
        }

        let waits = self.batch.register(&task);
        debug!(task = %task.id(), need_wait = waits, "task registered");

        self.tasks.push(TaskSlot {
            task,
            state: Arc::new(TaskStateCell::default()),
        });
        self
    }

    /// Sort, dispatch and wait for the batch.
    ///
    /// Must run on the environment's driver thread. Returns once every
    /// wait-significant task has finished or the wait timeout elapsed; in
    /// the latter case the unfinished tasks keep running in the background
    /// and the outcome says how many there were.
    pub fn start(&mut self) -> Result<WaitOutcome> {
        let started_at = Instant::now();

        if !self.env.is_driver_thread() {
            return Err(InitiatorError::WrongThread {
                expected: self.env.driver_thread(),
                actual: std::thread::current().id(),
            });
        }
        if self.started {
            return Err(InitiatorError::AlreadyStarted);
        }
        self.started = true;

        if self.tasks.is_empty() {
            info!("no tasks registered; nothing to start");
            return Ok(WaitOutcome::Completed);
        }

        self.log_dependencies();
        self.sort_tasks()?;
        self.check_process_restrictions()?;

        let need_wait = self.batch.arm_gate();
        let completion = CompletionHandle::new(Arc::clone(&self.batch));

        for slot in &self.tasks {
            slot.state.set(TaskRunState::Dispatched);
            self.executor.dispatch(Dispatch::new(
                Arc::clone(&slot.task),
                Arc::clone(&slot.state),
                completion.clone(),
            ))?;
            slot.task.set_sent(true);
        }

        let outcome = if need_wait > 0 {
            self.await_wait_set()
        } else {
            WaitOutcome::Completed
        };

        info!(
            tasks = self.tasks.len(),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            ?outcome,
            "startup batch dispatched"
        );
        Ok(outcome)
    }

    /// Best-effort cancellation of tasks that have not started yet.
    ///
    /// Running tasks are left alone. To cancel while `start()` blocks, use
    /// a [`cancel_handle`](Initiator::cancel_handle) from another thread.
    pub fn cancel(&self) {
        self.cancel_handle().cancel();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle::new(self.executor.cancel_token(), Arc::clone(&self.batch))
    }

    /// Record `task` as finished. Must be called once per task.
    pub fn mark_task_done(&self, task: &dyn Task) {
        self.batch.mark_task_done(task);
    }

    /// Tell every dependent of `task` that one prerequisite finished.
    ///
    /// Returns how many dependents were signalled.
    pub fn satisfy_children(&self, task: &dyn Task) -> usize {
        self.batch.satisfy_children(task)
    }

    /// Handle for reporting completions from other threads.
    pub fn completion_handle(&self) -> CompletionHandle {
        CompletionHandle::new(Arc::clone(&self.batch))
    }

    /// Task ids in registration order before `start()`, in dispatch order
    /// after.
    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|slot| slot.task.id()).collect()
    }

    /// Wait-significant tasks that have not finished.
    pub fn need_wait_count(&self) -> usize {
        self.batch.need_wait_count()
    }

    pub fn pending_wait_tasks(&self) -> Vec<TaskId> {
        self.batch.pending_wait_tasks()
    }

    /// Finished task ids in completion order.
    pub fn finished_tasks(&self) -> Vec<TaskId> {
        self.batch.finished_tasks()
    }

    /// State of the first registered task with this id.
    pub fn run_state_of(&self, id: TaskId) -> Option<TaskRunState> {
        self.tasks
            .iter()
            .find(|slot| slot.task.id() == id)
            .map(|slot| slot.state.get())
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn options(&self) -> &InitiatorOptions {
        &self.options
    }

    fn sort_tasks(&mut self) -> Result<()> {
        let tasks: Vec<Arc<dyn Task>> = self.tasks.iter().map(|s| Arc::clone(&s.task)).collect();
        let order = self.sorter.sort(&tasks)?;

        let mut slots: Vec<Option<TaskSlot>> = self.tasks.drain(..).map(Some).collect();
        let sorted: Vec<TaskSlot> = order
            .into_iter()
            .filter_map(|i| slots.get_mut(i).and_then(Option::take))
            .collect();

        if sorted.len() != slots.len() {
            return Err(InitiatorError::Other(anyhow!(
                "sorter returned {} of {} tasks",
                sorted.len(),
                slots.len()
            )));
        }

        self.tasks = sorted;
        debug!(order = ?self.task_ids(), "dispatch order");
        Ok(())
    }

    fn check_process_restrictions(&self) -> Result<()> {
        if self.env.is_primary_process() {
            return Ok(());
        }
        match self.tasks.iter().find(|s| s.task.only_in_main_process()) {
            Some(slot) => Err(InitiatorError::MainProcessOnly(slot.task.id())),
            None => Ok(()),
        }
    }

    fn await_wait_set(&self) -> WaitOutcome {
        if tracing::enabled!(tracing::Level::DEBUG) {
            for id in self.batch.pending_wait_tasks() {
                debug!(task = %id, "still waiting on task");
            }
        }

        let outcome = self.batch.wait(self.options.wait_timeout);
        match outcome {
            WaitOutcome::Completed => {}
            WaitOutcome::TimedOut { remaining } => warn!(
                remaining,
                pending = ?self.batch.pending_wait_tasks(),
                timeout_ms = self.options.wait_timeout.as_millis() as u64,
                "wait timeout elapsed; continuing startup with tasks still running"
            ),
            WaitOutcome::Interrupted { remaining } => warn!(
                remaining,
                pending = ?self.batch.pending_wait_tasks(),
                "batch cancelled while waiting"
            ),
        }
        outcome
    }

    fn log_dependencies(&self) {
        info!(
            tasks = self.tasks.len(),
            need_wait = self.batch.need_wait_count(),
            "starting task batch"
        );

        if tracing::enabled!(tracing::Level::DEBUG) {
            for (dep, dependents) in self.batch.dependency_summary() {
                debug!(task = %dep, ?dependents, "dependents");
            }
        }
    }
}
