//! Phase 2: relay loop.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use relay_proto::{AddressedMessage, ServerLine};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until, timeout_at};
use tracing::{debug, info, warn};

use super::{Session, SessionEnd};
use crate::error::SessionError;
use crate::router::{Flow, Sender, notices};

/// Stand-in deadline for idle timeouts too large to represent.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout).unwrap_or_else(|| now + FAR_FUTURE)
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Route inbound lines and flush the outbox until the session ends.
    ///
    /// Only lines that parse as addressed messages push the idle deadline
    /// back. A peer that stops reading cannot hold the session past it
    /// either: relayed writes must finish before the deadline.
    pub(super) async fn relay(
        &mut self,
        name: &str,
        outbox: &mut mpsc::Receiver<ServerLine>,
    ) -> Result<SessionEnd, SessionError> {
        let idle_timeout = self.settings.idle_timeout;
        let mut deadline = deadline_after(idle_timeout);
        let sender = Sender { id: self.id, name };

        loop {
            tokio::select! {
                inbound = self.transport.next() => {
                    let line = match inbound {
                        Some(Ok(line)) => line,
                        Some(Err(e)) => return Err(self.read_failed(e).await),
                        None => {
                            debug!("Peer closed connection");
                            return Ok(SessionEnd::Disconnected);
                        }
                    };

                    match line.parse::<AddressedMessage>() {
                        Ok(message) => {
                            deadline = deadline_after(idle_timeout);
                            debug!(recipient = %message.recipient, "Routing message");
                            if self.router.dispatch(sender, message) == Flow::Quit {
                                return Ok(SessionEnd::Quit);
                            }
                        }
                        Err(e) => warn!(error = %e, %line, "Dropping malformed line"),
                    }
                }

                Some(line) = outbox.recv() => {
                    match timeout_at(deadline, self.transport.send(line)).await {
                        Ok(sent) => sent?,
                        Err(_) => {
                            warn!(idle_secs = idle_timeout.as_secs(), "Write stalled past idle deadline");
                            return Ok(SessionEnd::IdleTimeout);
                        }
                    }
                }

                _ = sleep_until(deadline) => {
                    info!(idle_secs = idle_timeout.as_secs(), "Idle timeout");
                    self.send_notice(notices::IDLE_TIMEOUT).await;
                    return Ok(SessionEnd::IdleTimeout);
                }
            }
        }
    }
}
