//! Phase 1: wait for a display name.

use futures_util::StreamExt;
use relay_proto::validate_display_name;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use super::{Session, SessionEnd};
use crate::error::SessionError;
use crate::router::notices;
use crate::state::Outbox;

pub(super) enum LoginResult {
    Registered(String),
    Ended(SessionEnd),
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Read lines until one is accepted as a display name.
    ///
    /// The deadline runs from accept and is not extended by refused names.
    pub(super) async fn login(&mut self, outbox: Outbox) -> Result<LoginResult, SessionError> {
        let login_timeout = self.settings.login_timeout;

        loop {
            let elapsed = self.accepted_at.elapsed();
            if elapsed >= login_timeout {
                warn!(elapsed_secs = elapsed.as_secs(), "Login timeout");
                self.send_notice(notices::LOGIN_TIMEOUT).await;
                return Ok(LoginResult::Ended(SessionEnd::LoginTimeout));
            }

            let remaining = login_timeout.saturating_sub(elapsed);

            let line = match tokio::time::timeout(remaining, self.transport.next()).await {
                Ok(Some(Ok(line))) => line,
                Ok(Some(Err(e))) => return Err(self.read_failed(e).await),
                Ok(None) => {
                    debug!("Peer closed before logging in");
                    return Ok(LoginResult::Ended(SessionEnd::Disconnected));
                }
                // Timeout - loop to check timeout at top
                Err(_) => continue,
            };

            if line.is_empty() {
                continue;
            }

            if self.settings.reject_reserved_names
                && let Err(e) = validate_display_name(&line)
            {
                debug!(candidate = %line, error = %e, "Display name refused");
                self.send_notice(notices::RESERVED_NAME).await;
                continue;
            }

            let name = self.registry.register(self.id, &line, outbox.clone())?;
            return Ok(LoginResult::Registered(name));
        }
    }
}
