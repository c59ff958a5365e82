//! # relay-proto
//!
//! Wire protocol for the relayd chat relay.
//!
//! Every message is one newline-terminated text line.
//!
//! - Clients log in by sending their display name as the first line, then
//!   send addressed lines of the form `<recipient><body>` where the
//!   recipient is `?` (the server), `*` (everyone) or a display name.
//! - The server answers with one of four line shapes, modelled by
//!   [`ServerLine`]: a user list, a plain notice, a broadcast chat line and
//!   a whisper line.
//!
//! ## Quick Start
//!
//! ```rust
//! use relay_proto::{AddressedMessage, Recipient, ServerLine};
//!
//! let msg: AddressedMessage = "<*><hello>".parse().expect("valid line");
//! assert_eq!(msg.recipient, Recipient::Everyone);
//! assert_eq!(msg.body, "hello");
//!
//! let line = ServerLine::Broadcast { from: "Sam".into(), body: "hello".into() };
//! assert_eq!(line.to_string(), "*Sam: hello");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod addressed;
#[cfg(feature = "tokio")]
pub mod codec;
pub mod error;
#[cfg(feature = "tokio")]
pub mod line;
pub mod name;
pub mod presence;
pub mod server;
pub mod userlist;

pub use self::addressed::{AddressedMessage, Recipient};
#[cfg(feature = "tokio")]
pub use self::codec::RelayCodec;
pub use self::error::{MessageParseError, ProtocolError};
#[cfg(feature = "tokio")]
pub use self::line::{LineCodec, DEFAULT_MAX_LINE_LEN};
pub use self::name::{validate_display_name, NameError, RESERVED_NAME_CHARS};
pub use self::presence::{Presence, UnknownPresence};
pub use self::server::ServerLine;
pub use self::userlist::{UserEntry, UserList};
