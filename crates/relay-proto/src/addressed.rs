//! Addressed client messages: `<recipient><body>`.
//!
//! Parsing is deliberately forgiving about the seam between the two
//! segments: any whitespace and stray `>` characters before a `<`, and any
//! whitespace after it, are absorbed into the separator. So
//! `<Bob>  <hi>`, `<Bob><hi>` and `<Bob>>< hi>` all address `Bob` with `hi`.

use std::fmt;
use std::str::FromStr;

use crate::error::MessageParseError;

/// Token addressing the server itself.
pub const SERVER_TOKEN: &str = "?";
/// Token addressing every logged-in user.
pub const EVERYONE_TOKEN: &str = "*";

/// Who an addressed message is for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Recipient {
    /// `?`: a control message for the server.
    Server,
    /// `*`: a broadcast to everyone.
    Everyone,
    /// Any other token: a whisper to the user with that display name.
    User(String),
}

impl Recipient {
    /// Classify a recipient token. Never fails; unknown tokens are names.
    pub fn from_token(token: &str) -> Self {
        match token {
            SERVER_TOKEN => Recipient::Server,
            EVERYONE_TOKEN => Recipient::Everyone,
            name => Recipient::User(name.to_string()),
        }
    }

    /// The wire token for this recipient.
    pub fn as_str(&self) -> &str {
        match self {
            Recipient::Server => SERVER_TOKEN,
            Recipient::Everyone => EVERYONE_TOKEN,
            Recipient::User(name) => name,
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed client line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressedMessage {
    /// Addressee.
    pub recipient: Recipient,
    /// Message text, never empty.
    pub body: String,
}

impl AddressedMessage {
    /// Build a message for an arbitrary recipient.
    pub fn new(recipient: Recipient, body: impl Into<String>) -> Self {
        Self {
            recipient,
            body: body.into(),
        }
    }

    /// `<?><body>`
    pub fn control(body: impl Into<String>) -> Self {
        Self::new(Recipient::Server, body)
    }

    /// `<*><body>`
    pub fn broadcast(body: impl Into<String>) -> Self {
        Self::new(Recipient::Everyone, body)
    }

    /// `<name><body>`
    pub fn whisper(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(Recipient::User(to.into()), body)
    }
}

impl fmt::Display for AddressedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}><{}>", self.recipient, self.body)
    }
}

impl FromStr for AddressedMessage {
    type Err = MessageParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(MessageParseError::Empty);
        }

        let inner = trimmed
            .strip_prefix('<')
            .ok_or(MessageParseError::MissingOpenBracket)?;
        let inner = inner
            .strip_suffix('>')
            .ok_or(MessageParseError::MissingCloseBracket)?;

        let segments = split_segments(inner);
        let [recipient, body] = segments.as_slice() else {
            return Err(MessageParseError::SegmentCount {
                got: segments.len(),
            });
        };

        if recipient.is_empty() {
            return Err(MessageParseError::EmptyRecipient);
        }
        if body.is_empty() {
            return Err(MessageParseError::EmptyBody);
        }

        Ok(Self::new(Recipient::from_token(recipient), *body))
    }
}

/// Split on every `<`, eating whitespace and `>`s before it and leading
/// whitespace after it.
fn split_segments(inner: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut rest = inner;
    while let Some(pos) = rest.find('<') {
        segments.push(rest[..pos].trim_end_matches(|c: char| c == '>' || c.is_whitespace()));
        rest = rest[pos + 1..].trim_start();
    }
    segments.push(rest);
    segments
}
