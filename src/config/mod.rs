// src/config/mod.rs

//! Configuration loading and validation for the initiator.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like a usable pool size (`validate.rs`).
//! - Turn a validated file into runtime [`InitiatorOptions`] (`options.rs`).

pub mod loader;
pub mod model;
pub mod options;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, InitiatorSection, RawConfigFile};
pub use options::InitiatorOptions;
pub use validate::parse_duration;
