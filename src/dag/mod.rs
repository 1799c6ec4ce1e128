// src/dag/mod.rs

//! Dependency bookkeeping and dispatch ordering.
//!
//! - [`graph`] maps each prerequisite to the tasks waiting on it.
//! - [`finished`] records which task ids have completed.
//! - [`sorter`] computes a stable, dependency-respecting dispatch order.
//! - [`task_info`] provides the per-task run state.

pub mod finished;
pub mod graph;
pub mod sorter;
pub mod task_info;

pub use finished::FinishedSet;
pub use graph::DependencyGraph;
pub use sorter::{Sorter, StableTopoSorter};
pub use task_info::{TaskRunState, TaskStateCell};
