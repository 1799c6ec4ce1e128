// src/dag/task_info.rs

//! Per-task run state.

use std::sync::atomic::{AtomicU8, Ordering};

/// Where a registered task is in its lifecycle.
///
/// `Pending -> Dispatched -> Running -> Done`. A task whose dispatch was
/// cancelled before it ran stays `Dispatched`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    /// Registered, not yet handed to the executor.
    Pending,
    /// Submitted to the executor.
    Dispatched,
    /// Picked up by the executor; the body is executing.
    Running,
    /// Body returned and completion was recorded.
    Done,
}

impl TaskRunState {
    fn as_u8(self) -> u8 {
        match self {
            TaskRunState::Pending => 0,
            TaskRunState::Dispatched => 1,
            TaskRunState::Running => 2,
            TaskRunState::Done => 3,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => TaskRunState::Pending,
            1 => TaskRunState::Dispatched,
            2 => TaskRunState::Running,
            _ => TaskRunState::Done,
        }
    }
}

/// Atomic cell holding one task's [`TaskRunState`], shared between the
/// scheduler and the thread that runs the task.
#[derive(Debug)]
pub struct TaskStateCell(AtomicU8);

impl Default for TaskStateCell {
    fn default() -> Self {
        Self(AtomicU8::new(TaskRunState::Pending.as_u8()))
    }
}

impl TaskStateCell {
    pub fn get(&self) -> TaskRunState {
        TaskRunState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, state: TaskRunState) {
        self.0.store(state.as_u8(), Ordering::Release);
    }
}
