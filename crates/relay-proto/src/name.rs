//! Display name rules.
//!
//! Names are free text, but a handful of characters carry meaning in the
//! line formats: `/` and `|` delimit user lists, `:` separates a chat
//! line's sender from its body, `*` marks broadcasts, `?` addresses the
//! server and `<`/`>` bracket addressed messages. A name containing any of
//! them would make server lines ambiguous for front-ends.

use thiserror::Error;

/// Characters a display name may not contain.
pub const RESERVED_NAME_CHARS: [char; 7] = ['/', ':', '*', '?', '<', '>', '|'];

/// Why a candidate display name was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// The name is empty.
    #[error("display name is empty")]
    Empty,
    /// The name contains a reserved character.
    #[error("display name contains reserved character {0:?}")]
    ReservedChar(char),
}

/// Check a candidate display name against [`RESERVED_NAME_CHARS`].
pub fn validate_display_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    match name.chars().find(|c| RESERVED_NAME_CHARS.contains(c)) {
        Some(c) => Err(NameError::ReservedChar(c)),
        None => Ok(()),
    }
}
