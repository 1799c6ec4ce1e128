// src/types.rs

use std::fmt;

/// Stable identity shared by every instance of one task type.
///
/// Ids are plain static names so they can be declared as constants next to
/// the task they identify:
///
/// ```
/// use initiator::TaskId;
///
/// const DATABASE: TaskId = TaskId::new("database");
/// assert_eq!(DATABASE.as_str(), "database");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(&'static str);

impl TaskId {
    pub const fn new(name: &'static str) -> Self {
        TaskId(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Execution context a task requires.
///
/// - `Main`: run inline on the driver thread; `start()` does not move on to
///   the next task until the body returns.
/// - `Pooled`: run on the shared, bounded worker pool.
/// - `Dedicated`: run on a freshly spawned thread of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ThreadMode {
    Main,
    #[default]
    Pooled,
    Dedicated,
}
