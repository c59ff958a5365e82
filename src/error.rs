//! Unified error handling for relayd.
//!
//! Protocol-level errors live in `relay_proto`; this module covers the
//! daemon's own failure modes and labels them for logging.

use relay_proto::ProtocolError;
use thiserror::Error;

use crate::state::SessionId;

// ============================================================================
// Registry Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum RegistryError {
    /// A session tried to log in twice.
    #[error("{0} is already registered")]
    DuplicateIdentity(SessionId),
}

// ============================================================================
// Session Errors (connection lifecycle)
// ============================================================================

/// Reasons a session ended abnormally. Quits and timeouts are not errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading from or writing to the peer failed.
    #[error("connection failure: {0}")]
    ConnectionFailure(#[from] ProtocolError),

    /// The peer sent a line longer than the configured limit.
    #[error("input line of {actual} bytes exceeds limit of {limit}")]
    InputTooLong { actual: usize, limit: usize },

    #[error("registration refused: {0}")]
    Registration(#[from] RegistryError),
}

impl SessionError {
    /// Short label for log fields.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConnectionFailure(_) => "connection_failure",
            Self::InputTooLong { .. } => "input_too_long",
            Self::Registration(_) => "registration_refused",
        }
    }
}
