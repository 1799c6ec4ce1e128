// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [initiator]
/// wait_timeout = "10s"
/// pool_size = 4
/// thread_name = "initiator"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Scheduler behaviour from `[initiator]`.
    #[serde(default)]
    pub initiator: InitiatorSection,
}

/// `[initiator]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct InitiatorSection {
    /// How long `start()` blocks for wait-significant tasks, as a duration
    /// string (`"500ms"`, `"10s"`, `"1m"`).
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout: String,

    /// Upper bound on threads in the shared worker pool.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Prefix for the names of pool and dedicated threads.
    #[serde(default = "default_thread_name")]
    pub thread_name: String,
}

fn default_wait_timeout() -> String {
    "10000ms".to_string()
}

fn default_pool_size() -> usize {
    4
}

fn default_thread_name() -> String {
    "initiator".to_string()
}

impl Default for InitiatorSection {
    fn default() -> Self {
        Self {
            wait_timeout: default_wait_timeout(),
            pool_size: default_pool_size(),
            thread_name: default_thread_name(),
        }
    }
}

/// Validated configuration.
///
/// Only obtainable through `ConfigFile::try_from(RawConfigFile)` (or the
/// loader functions), so holders can rely on the values being usable.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub initiator: InitiatorSection,
    wait_timeout: Duration,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(initiator: InitiatorSection, wait_timeout: Duration) -> Self {
        Self {
            initiator,
            wait_timeout,
        }
    }

    /// Parsed `[initiator].wait_timeout`.
    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }
}
