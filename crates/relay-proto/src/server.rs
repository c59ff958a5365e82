//! Lines sent from the server to clients.
//!
//! | Shape        | Example                        |
//! |--------------|--------------------------------|
//! | user list    | `Sam|Online/Kim|Idle/`         |
//! | notice       | `Sam has entered the chat`     |
//! | broadcast    | `*Sam: hello`                  |
//! | whisper      | `[Whisper To Kim] Sam: psst`   |
//!
//! Front-ends tell these apart with [`ServerLine::classify`].

use std::fmt;

use crate::userlist::UserList;

const WHISPER_PREFIX: &str = "[Whisper To ";

/// A single server-to-client line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerLine {
    /// Everyone else who is logged in, with their presence.
    UserList(UserList),
    /// Plain informational text.
    Notice(String),
    /// A chat line addressed to everyone.
    Broadcast {
        /// Sender display name.
        from: String,
        /// Message text.
        body: String,
    },
    /// A private chat line. Delivered to both ends of the conversation.
    Whisper {
        /// Recipient display name.
        to: String,
        /// Sender display name.
        from: String,
        /// Message text.
        body: String,
    },
}

impl ServerLine {
    /// Shorthand for [`ServerLine::Notice`].
    pub fn notice(text: impl Into<String>) -> Self {
        ServerLine::Notice(text.into())
    }

    /// Recognise a received line the way a chat front-end does.
    ///
    /// Lines without `:` are user lists when empty or containing `/`, and
    /// notices otherwise. Lines with `:` are broadcasts when they start with
    /// `*`, whispers when they start with `[Whisper To `, and notices
    /// otherwise. Anything that fails a closer look degrades to a notice.
    pub fn classify(line: &str) -> Self {
        if !line.contains(':') {
            if line.is_empty() || line.contains('/') {
                if let Ok(list) = UserList::parse(line) {
                    return ServerLine::UserList(list);
                }
            }
            return ServerLine::notice(line);
        }

        if let Some(rest) = line.strip_prefix('*') {
            if let Some((from, body)) = rest.split_once(": ") {
                return ServerLine::Broadcast {
                    from: from.to_string(),
                    body: body.to_string(),
                };
            }
        } else if let Some(rest) = line.strip_prefix(WHISPER_PREFIX) {
            if let Some((to, rest)) = rest.split_once("] ") {
                if let Some((from, body)) = rest.split_once(": ") {
                    return ServerLine::Whisper {
                        to: to.to_string(),
                        from: from.to_string(),
                        body: body.to_string(),
                    };
                }
            }
        }

        ServerLine::notice(line)
    }

    /// Text a front-end shows in its transcript.
    ///
    /// Broadcasts lose their `*` marker; other chat lines and notices are
    /// shown as sent. User lists are not transcript text and render empty.
    pub fn display_text(&self) -> String {
        match self {
            ServerLine::UserList(_) => String::new(),
            ServerLine::Broadcast { from, body } => format!("{from}: {body}"),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ServerLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerLine::UserList(list) => fmt::Display::fmt(list, f),
            ServerLine::Notice(text) => f.write_str(text),
            ServerLine::Broadcast { from, body } => write!(f, "*{from}: {body}"),
            ServerLine::Whisper { to, from, body } => {
                write!(f, "{WHISPER_PREFIX}{to}] {from}: {body}")
            }
        }
    }
}
