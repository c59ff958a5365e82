//! User list payloads: `name|status/name|status/`.

use std::fmt;

use crate::error::MessageParseError;
use crate::presence::Presence;

/// One `name|status` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntry {
    /// Display name.
    pub name: String,
    /// Current presence.
    pub presence: Presence,
}

impl UserEntry {
    /// Create an entry.
    pub fn new(name: impl Into<String>, presence: Presence) -> Self {
        Self {
            name: name.into(),
            presence,
        }
    }
}

/// A snapshot of logged-in users as seen by one recipient.
///
/// Encodes every entry followed by `/`, so an empty list is the empty line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserList {
    /// Entries in registry order.
    pub entries: Vec<UserEntry>,
}

impl UserList {
    /// Wrap a set of entries.
    pub fn new(entries: Vec<UserEntry>) -> Self {
        Self { entries }
    }

    /// Decode a user list line as a front-end would.
    ///
    /// Empty pieces are skipped; each remaining piece is split at its first
    /// `|`. Unknown statuses are reported as [`MessageParseError::MalformedUserEntry`].
    pub fn parse(line: &str) -> Result<Self, MessageParseError> {
        line.split('/')
            .filter(|piece| !piece.is_empty())
            .map(|piece| {
                let malformed = || MessageParseError::MalformedUserEntry(piece.to_string());
                let (name, status) = piece.split_once('|').ok_or_else(malformed)?;
                let presence = status.parse().map_err(|_| malformed())?;
                Ok(UserEntry::new(name, presence))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names in list order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }
}

impl fmt::Display for UserList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            write!(f, "{}|{}/", entry.name, entry.presence)?;
        }
        Ok(())
    }
}
