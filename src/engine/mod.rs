// src/engine/mod.rs

//! Orchestration of one startup batch.
//!
//! - [`initiator`] holds the scheduler: registration, sorting, dispatch and
//!   the bounded wait.
//! - [`batch`] holds the completion bookkeeping that worker threads update
//!   and the handles that reach it from other threads.
//! - [`gate`] holds the countable barrier the driver thread blocks on.

pub mod batch;
pub mod gate;
pub mod initiator;

pub use batch::{CancelHandle, CompletionHandle};
pub use gate::{CompletionGate, WaitOutcome};
pub use initiator::Initiator;
