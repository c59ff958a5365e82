//! Framing and queue limits.

use serde::Deserialize;

/// Framing and queue limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum inbound line length in bytes, terminator included (default: 4096).
    /// A longer line ends the connection.
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    /// Per-session outbox capacity in lines (default: 256).
    /// Lines for a session whose outbox is full are dropped.
    #[serde(default = "default_outbox_capacity")]
    pub outbox_capacity: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_line_len: default_max_line_len(),
            outbox_capacity: default_outbox_capacity(),
        }
    }
}

fn default_max_line_len() -> usize {
    relay_proto::DEFAULT_MAX_LINE_LEN
}

fn default_outbox_capacity() -> usize {
    256
}
