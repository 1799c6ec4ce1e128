// src/lib.rs

//! Dependency-ordered startup task runner.
//!
//! A batch of [`Task`]s is registered on an [`Initiator`], each declaring
//! the tasks it depends on and the [`ThreadMode`] it must run in. `start()`
//! sorts the batch so every task is dispatched after its prerequisites,
//! hands each task to its execution context and blocks the driver thread
//! until every wait-significant task finished or the wait timeout elapsed.
//!
//! ```no_run
//! use initiator::{AppContext, Environment, FnTask, Initiator, TaskId, ThreadMode};
//!
//! const CONFIG: TaskId = TaskId::new("config");
//! const DATABASE: TaskId = TaskId::new("database");
//!
//! # fn main() -> initiator::errors::Result<()> {
//! let env = Environment::new(AppContext::primary("com.example.app"));
//! let mut initiator = Initiator::with_environment(env);
//! initiator
//!     .add_task(FnTask::builder(CONFIG).thread_mode(ThreadMode::Main).run(|| Ok(())))
//!     .add_task(
//!         FnTask::builder(DATABASE)
//!             .after(CONFIG)
//!             .need_wait(true)
//!             .run(|| Ok(())),
//!     );
//! let outcome = initiator.start()?;
//! assert!(outcome.is_completed());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dag;
pub mod engine;
pub mod env;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod task;
pub mod types;

pub use config::InitiatorOptions;
pub use engine::{CancelHandle, CompletionHandle, Initiator, WaitOutcome};
pub use env::{AppContext, Environment, environment, init};
pub use errors::InitiatorError;
pub use task::{DependencyLatch, FnTask, Task};
pub use types::{TaskId, ThreadMode};
