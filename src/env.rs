// src/env.rs

//! Process environment snapshot.
//!
//! The scheduler needs three facts about the process it runs in: the
//! application context, whether this is the primary process (some tasks
//! may only run there) and which thread drives startup. [`Environment`]
//! captures them once as an immutable value.
//!
//! Code that prefers not to thread the value through can call [`init`] once
//! at startup and use [`Initiator::create`](crate::Initiator::create), which
//! reads the process-wide copy.

use std::sync::OnceLock;
use std::thread::{self, ThreadId};

use tracing::{info, warn};

use crate::errors::{InitiatorError, Result};

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

/// Identity of the running application and process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppContext {
    /// Application identifier. The primary process is named after it.
    pub app_id: String,
    /// Name of the current process.
    pub process_name: String,
}

impl AppContext {
    pub fn new(app_id: impl Into<String>, process_name: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            process_name: process_name.into(),
        }
    }

    /// Context for the application's primary process.
    pub fn primary(app_id: impl Into<String>) -> Self {
        let app_id = app_id.into();
        Self {
            process_name: app_id.clone(),
            app_id,
        }
    }

    pub fn is_primary_process(&self) -> bool {
        self.process_name == self.app_id
    }
}

/// Immutable snapshot of the process a batch runs in.
#[derive(Debug, Clone)]
pub struct Environment {
    context: AppContext,
    is_primary_process: bool,
    driver_thread: ThreadId,
}

impl Environment {
    /// Snapshot `context`, designating the calling thread as the driver
    /// thread.
    pub fn new(context: AppContext) -> Self {
        Self {
            is_primary_process: context.is_primary_process(),
            context,
            driver_thread: thread::current().id(),
        }
    }

    /// Override the process role derived from the context.
    pub fn with_primary(mut self, is_primary: bool) -> Self {
        self.is_primary_process = is_primary;
        self
    }

    /// Designate another thread as the driver thread.
    pub fn with_driver_thread(mut self, driver: ThreadId) -> Self {
        self.driver_thread = driver;
        self
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn is_primary_process(&self) -> bool {
        self.is_primary_process
    }

    pub fn driver_thread(&self) -> ThreadId {
        self.driver_thread
    }

    pub fn is_driver_thread(&self) -> bool {
        thread::current().id() == self.driver_thread
    }
}

/// Record the process-wide environment. The calling thread becomes the
/// driver thread.
///
/// Only the first call has an effect.
pub fn init(context: AppContext) -> &'static Environment {
    let mut fresh = false;
    let env = ENVIRONMENT.get_or_init(|| {
        fresh = true;
        Environment::new(context)
    });

    if fresh {
        info!(
            app_id = %env.context.app_id,
            process = %env.context.process_name,
            primary = env.is_primary_process,
            "initiator environment recorded"
        );
    } else {
        warn!("initiator::init called more than once; keeping the first environment");
    }
    env
}

/// The environment recorded by [`init`].
pub fn environment() -> Result<&'static Environment> {
    ENVIRONMENT.get().ok_or(InitiatorError::NotInitialized)
}
