//! User presence states.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Presence as shown next to a name in the user list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Presence {
    /// Available.
    Online,
    /// Away from the keyboard.
    Idle,
    /// Present but not to be disturbed.
    DoNotDisturb,
    /// Not yet logged in.
    #[default]
    Offline,
}

/// A status string that names no known presence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown presence: {0:?}")]
pub struct UnknownPresence(pub String);

impl Presence {
    /// Wire spelling, as used in user lists and control messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Presence::Online => "Online",
            Presence::Idle => "Idle",
            Presence::DoNotDisturb => "Do Not Disturb",
            Presence::Offline => "Offline",
        }
    }

    /// Whether a client may switch itself into this state with `<?><status>`.
    pub fn is_selectable(self) -> bool {
        !matches!(self, Presence::Offline)
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Presence {
    type Err = UnknownPresence;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Online" => Ok(Presence::Online),
            "Idle" => Ok(Presence::Idle),
            "Do Not Disturb" | "DoNotDisturb" => Ok(Presence::DoNotDisturb),
            "Offline" => Ok(Presence::Offline),
            other => Err(UnknownPresence(other.to_string())),
        }
    }
}
