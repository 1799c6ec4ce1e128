// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::thread::ThreadId;

use thiserror::Error;

use crate::types::TaskId;

#[derive(Error, Debug)]
pub enum InitiatorError {
    #[error("initiator::init must be called before Initiator::create")]
    NotInitialized,

    #[error("start() must be called from the driver thread {expected:?} (called from {actual:?})")]
    WrongThread {
        expected: ThreadId,
        actual: ThreadId,
    },

    #[error("task '{0}' may only run in the primary process")]
    MainProcessOnly(TaskId),

    #[error("Cycle detected in task graph: {0}")]
    DagCycle(String),

    #[error("start() was already called on this initiator")]
    AlreadyStarted,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, InitiatorError>;
