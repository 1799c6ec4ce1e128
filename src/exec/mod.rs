// src/exec/mod.rs

//! Task execution layer.
//!
//! - [`backend`] provides the `ExecutorBackend` trait and the [`Dispatch`]
//!   unit handed to it, which tests can drive with a fake implementation.
//! - [`thread_executor`] maps thread modes onto the driver thread, the
//!   shared pool and dedicated threads.
//! - [`pool`] owns the process-wide worker pool.
//! - [`cancel`] holds the token shared between an executor and its
//!   cancellers.

pub mod backend;
pub mod cancel;
pub mod pool;
pub mod thread_executor;

pub use backend::{Dispatch, ExecutorBackend};
pub use cancel::CancelToken;
pub use thread_executor::ThreadExecutor;
