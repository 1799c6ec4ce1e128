// src/exec/thread_executor.rs

//! Production executor: maps each thread mode to a real execution context.

use std::thread;

use tracing::debug;

use crate::config::InitiatorOptions;
use crate::errors::Result;
use crate::exec::backend::{Dispatch, ExecutorBackend};
use crate::exec::cancel::CancelToken;
use crate::exec::pool::shared_pool;
use crate::types::ThreadMode;

/// Runs `Main` jobs inline, `Pooled` jobs on the shared worker pool and
/// `Dedicated` jobs on a new named thread each.
///
/// Cancellation raises a flag that queued jobs check right before they
/// would start, and aborts pool jobs that have not been picked up yet.
/// Jobs already running are never interrupted.
#[derive(Debug)]
pub struct ThreadExecutor {
    pool_size: usize,
    thread_name: String,
    token: CancelToken,
}

impl ThreadExecutor {
    pub fn new(options: &InitiatorOptions) -> Self {
        Self {
            pool_size: options.pool_size,
            thread_name: options.thread_name.clone(),
            token: CancelToken::new(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    fn dispatch_pooled(&self, job: Dispatch) -> Result<()> {
        let pool = shared_pool(self.pool_size, &self.thread_name)?;
        let token = self.token.clone();

        let handle = pool.spawn_blocking(move || run_unless_cancelled(job, &token));
        self.token.track(handle.abort_handle());
        Ok(())
    }

    fn dispatch_dedicated(&self, job: Dispatch) -> Result<()> {
        let token = self.token.clone();
        let name = format!("{}-{}", self.thread_name, job.task_id());

        thread::Builder::new()
            .name(name)
            .spawn(move || run_unless_cancelled(job, &token))?;
        Ok(())
    }
}

impl ExecutorBackend for ThreadExecutor {
    fn dispatch(&mut self, job: Dispatch) -> Result<()> {
        debug!(task = %job.task_id(), thread_mode = ?job.thread_mode(), "dispatching task");

        match job.thread_mode() {
            ThreadMode::Main => {
                run_unless_cancelled(job, &self.token);
                Ok(())
            }
            ThreadMode::Pooled => self.dispatch_pooled(job),
            ThreadMode::Dedicated => self.dispatch_dedicated(job),
        }
    }

    fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }
}

fn run_unless_cancelled(job: Dispatch, token: &CancelToken) {
    if token.is_cancelled() {
        debug!(task = %job.task_id(), "executor cancelled before task started; skipping");
        return;
    }
    job.run();
}
