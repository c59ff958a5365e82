//! Fixed server notice texts.

/// Sent when no display name arrives before the login deadline.
pub const LOGIN_TIMEOUT: &str = "You have been disconnected due to inactivity.";

/// Sent when a logged-in client stays silent past the idle deadline.
pub const IDLE_TIMEOUT: &str = "You have been disconnected due to inactivity";

pub const RESERVED_NAME: &str = "Display name may not contain any of: / : * ? < > |";

pub const INPUT_TOO_LONG: &str = "Input line too long";

pub fn entered(name: &str) -> String {
    format!("{name} has entered the chat")
}

pub fn left(name: &str) -> String {
    format!("{name} has left the chat")
}

pub fn no_such_user(name: &str) -> String {
    format!("No such user: {name}")
}
