// src/config/options.rs

use std::time::Duration;

use crate::config::model::ConfigFile;

/// How long `start()` waits for wait-significant tasks unless configured
/// otherwise.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Runtime knobs for one [`Initiator`](crate::Initiator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiatorOptions {
    /// Upper bound on how long the driver thread blocks in `start()`.
    pub wait_timeout: Duration,
    /// Maximum number of worker threads in the shared pool.
    ///
    /// The pool is process-wide; the first executor to start it fixes its
    /// size.
    pub pool_size: usize,
    /// Prefix for pool and dedicated thread names.
    pub thread_name: String,
}

impl Default for InitiatorOptions {
    fn default() -> Self {
        Self {
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            pool_size: 4,
            thread_name: "initiator".to_string(),
        }
    }
}

impl InitiatorOptions {
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size.max(1);
        self
    }
}

impl From<&ConfigFile> for InitiatorOptions {
    fn from(cfg: &ConfigFile) -> Self {
        Self {
            wait_timeout: cfg.wait_timeout(),
            pool_size: cfg.initiator.pool_size,
            thread_name: cfg.initiator.thread_name.clone(),
        }
    }
}
