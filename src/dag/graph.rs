// src/dag/graph.rs

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::dag::finished::FinishedSet;
use crate::task::Task;
use crate::types::TaskId;

/// Who is waiting on whom.
///
/// For every prerequisite id, the tasks that declared it in
/// `depends_on()`. Built during registration and read-only once the batch
/// starts.
#[derive(Default)]
pub struct DependencyGraph {
    dependents: HashMap<TaskId, Vec<Arc<dyn Task>>>,
}

impl fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (dep, tasks) in &self.dependents {
            let ids: Vec<TaskId> = tasks.iter().map(|t| t.id()).collect();
            map.entry(dep, &ids);
        }
        map.finish()
    }
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `task` as a dependent of each of its prerequisites.
    ///
    /// A prerequisite that already finished is signalled to the task right
    /// away, so late registration cannot miss it.
    pub fn register(&mut self, task: &Arc<dyn Task>, finished: &FinishedSet) {
        for dep in task.depends_on() {
            self.dependents
                .entry(dep)
                .or_default()
                .push(Arc::clone(task));

            if finished.contains(dep) {
                debug!(
                    task = %task.id(),
                    dep = %dep,
                    "prerequisite already finished at registration"
                );
                task.satisfy();
            }
        }
    }

    /// Signal every dependent of `finished` that one prerequisite is done.
    ///
    /// Returns how many tasks were signalled.
    pub fn notify_dependents(&self, finished: TaskId) -> usize {
        let Some(dependents) = self.dependents.get(&finished) else {
            return 0;
        };

        for task in dependents {
            task.satisfy();
        }
        dependents.len()
    }

    /// Ids of the tasks that declared `id` as a dependency, in registration
    /// order.
    pub fn dependents_of(&self, id: TaskId) -> Vec<TaskId> {
        self.dependents
            .get(&id)
            .map(|tasks| tasks.iter().map(|t| t.id()).collect())
            .unwrap_or_default()
    }

    /// Every id that at least one task depends on.
    pub fn prerequisites(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.dependents.keys().copied()
    }
}
