// src/dag/finished.rs

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use crate::types::TaskId;

/// Append-only record of the task ids that completed in this batch.
#[derive(Debug, Default)]
pub struct FinishedSet {
    inner: RwLock<FinishedInner>,
}

#[derive(Debug, Default)]
struct FinishedInner {
    members: HashSet<TaskId>,
    /// Completion order; an id appears once per finished instance.
    log: Vec<TaskId>,
}

impl FinishedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: TaskId) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.members.insert(id);
        inner.log.push(id);
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .members
            .contains(&id)
    }

    /// Finished ids in completion order.
    pub fn snapshot(&self) -> Vec<TaskId> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .log
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .log
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
