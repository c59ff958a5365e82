//! Classification of transport read errors.

use relay_proto::ProtocolError;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use super::Session;
use crate::error::SessionError;
use crate::router::notices;

/// What to do about a failed read.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum ReadErrorAction {
    /// Line over the limit - tell the client, then disconnect
    InputTooLong { actual: usize, limit: usize },
    /// I/O error - connection is broken, just log and disconnect
    IoError,
}

pub(super) fn classify_read_error(e: &ProtocolError) -> ReadErrorAction {
    match e {
        ProtocolError::MessageTooLong { actual, limit } => ReadErrorAction::InputTooLong {
            actual: *actual,
            limit: *limit,
        },
        ProtocolError::Io(_) => ReadErrorAction::IoError,
        // Handle future variants gracefully
        _ => ReadErrorAction::IoError,
    }
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Act on a read error and turn it into the session's exit error.
    pub(super) async fn read_failed(&mut self, e: ProtocolError) -> SessionError {
        match classify_read_error(&e) {
            ReadErrorAction::InputTooLong { actual, limit } => {
                warn!(actual, limit, "Input line too long - disconnecting");
                self.send_notice(notices::INPUT_TOO_LONG).await;
                SessionError::InputTooLong { actual, limit }
            }
            ReadErrorAction::IoError => {
                debug!(error = %e, "Read failed");
                SessionError::ConnectionFailure(e)
            }
        }
    }
}
