// src/exec/pool.rs

//! Process-wide worker pool for `ThreadMode::Pooled` tasks.
//!
//! The pool is the blocking thread pool of a tokio runtime that lives for
//! the rest of the process. Queued work therefore survives the scheduler
//! that submitted it, and later batches reuse the same threads.

use std::io;
use std::sync::{Mutex, OnceLock, PoisonError};

use tokio::runtime::{Builder, Handle, Runtime};
use tracing::info;

static POOL: OnceLock<Runtime> = OnceLock::new();
static POOL_INIT: Mutex<()> = Mutex::new(());

/// Handle to the shared pool, starting it with at most `size` threads on
/// first use. Later calls get the existing pool regardless of `size`.
pub fn shared_pool(size: usize, thread_name: &str) -> io::Result<Handle> {
    if let Some(rt) = POOL.get() {
        return Ok(rt.handle().clone());
    }

    let _guard = POOL_INIT.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(rt) = POOL.get() {
        return Ok(rt.handle().clone());
    }

    let size = size.max(1);
    let rt = Builder::new_multi_thread()
        .worker_threads(1)
        .max_blocking_threads(size)
        .thread_name(format!("{thread_name}-pool"))
        .enable_time()
        .build()?;

    info!(size, "worker pool started");
    Ok(POOL.get_or_init(|| rt).handle().clone())
}
