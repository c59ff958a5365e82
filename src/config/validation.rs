//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Smallest accepted `limits.max_line_len`.
pub const MIN_LINE_LEN: usize = 64;

/// Largest accepted login or idle timeout, in seconds (one week).
pub const MAX_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name must not be empty")]
    MissingServerName,
    #[error("timeouts.login must be at least 1 second")]
    ZeroLoginTimeout,
    #[error("timeouts.idle must be at least 1 second")]
    ZeroIdleTimeout,
    #[error("timeouts.{field} must be at most {max} seconds, got {secs}", max = MAX_TIMEOUT_SECS)]
    TimeoutTooLarge { field: &'static str, secs: u64 },
    #[error("limits.max_line_len must be at least {min}, got {0}", min = MIN_LINE_LEN)]
    LineLimitTooSmall(usize),
    #[error("limits.outbox_capacity must be at least 1")]
    ZeroOutboxCapacity,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.trim().is_empty() {
        errors.push(ValidationError::MissingServerName);
    }

    if config.timeouts.login == 0 {
        errors.push(ValidationError::ZeroLoginTimeout);
    }
    if config.timeouts.idle == 0 {
        errors.push(ValidationError::ZeroIdleTimeout);
    }
    for (field, secs) in [("login", config.timeouts.login), ("idle", config.timeouts.idle)] {
        if secs > MAX_TIMEOUT_SECS {
            errors.push(ValidationError::TimeoutTooLarge { field, secs });
        }
    }

    if config.limits.max_line_len < MIN_LINE_LEN {
        errors.push(ValidationError::LineLimitTooSmall(
            config.limits.max_line_len,
        ));
    }
    // mpsc::channel panics on a zero capacity
    if config.limits.outbox_capacity == 0 {
        errors.push(ValidationError::ZeroOutboxCapacity);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
