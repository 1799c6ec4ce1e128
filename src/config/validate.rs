// src/config/validate.rs

use std::time::{Duration, Instant};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{InitiatorError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = InitiatorError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let wait_timeout = validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.initiator, wait_timeout))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<Duration> {
    let section = &cfg.initiator;

    if section.pool_size == 0 {
        return Err(InitiatorError::ConfigError(
            "[initiator].pool_size must be >= 1 (got 0)".to_string(),
        ));
    }

    if section.thread_name.trim().is_empty() {
        return Err(InitiatorError::ConfigError(
            "[initiator].thread_name must not be empty".to_string(),
        ));
    }

    let timeout = parse_duration(&section.wait_timeout).map_err(|e| {
        InitiatorError::ConfigError(format!("[initiator].wait_timeout: {e}"))
    })?;

    if timeout.is_zero() {
        return Err(InitiatorError::ConfigError(
            "[initiator].wait_timeout must be greater than zero".to_string(),
        ));
    }

    if Instant::now().checked_add(timeout).is_none() {
        return Err(InitiatorError::ConfigError(format!(
            "[initiator].wait_timeout '{}' is too large",
            section.wait_timeout
        )));
    }

    Ok(timeout)
}

/// Parse a duration string such as `"250ms"`, `"10s"`, `"2m"` or `"1h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| "duration too large".to_string())
}
