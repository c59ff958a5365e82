//! Error types for the relay line protocol.
//!
//! [`ProtocolError`] covers framing failures on the wire, while
//! [`MessageParseError`] describes why a decoded line is not a well-formed
//! addressed message.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Framing-level errors raised by the codecs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A line (or the unterminated tail of the buffer) exceeds the limit.
    #[error("line too long: {actual} bytes (limit: {limit})")]
    MessageTooLong {
        /// Length seen so far, including the terminator when present.
        actual: usize,
        /// Configured maximum line length.
        limit: usize,
    },
}

/// Reasons a client line fails to parse as `<recipient><body>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// The line is empty or whitespace only.
    #[error("empty line")]
    Empty,

    /// The line does not start with `<`.
    #[error("line does not start with '<'")]
    MissingOpenBracket,

    /// The line does not end with `>`.
    #[error("line does not end with '>'")]
    MissingCloseBracket,

    /// The line splits into something other than exactly two segments.
    #[error("expected 2 bracketed segments, found {got}")]
    SegmentCount {
        /// Number of segments found.
        got: usize,
    },

    /// The recipient segment is empty (`<><body>`).
    #[error("empty recipient")]
    EmptyRecipient,

    /// The body segment is empty (`<name><>`).
    #[error("empty body")]
    EmptyBody,

    /// A user list entry lacks the `|` separating name and status.
    #[error("malformed user list entry: {0:?}")]
    MalformedUserEntry(String),
}
