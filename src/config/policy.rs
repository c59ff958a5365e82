//! Routing and login policy switches.

use serde::Deserialize;

/// Behaviour toggles. Defaults favour the safer reading of each rule.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Also deliver a broadcast back to its sender (default: false).
    #[serde(default)]
    pub echo_broadcasts: bool,
    /// Tell the sender `No such user: <name>` when a whisper has no
    /// recipient, instead of dropping it silently (default: false).
    #[serde(default)]
    pub notify_unknown_recipient: bool,
    /// Refuse display names containing `/ : * ? < > |` (default: true).
    #[serde(default = "default_true")]
    pub reject_reserved_names: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            echo_broadcasts: false,
            notify_unknown_recipient: false,
            reject_reserved_names: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}
