//! Session - drives one client connection from accept to close.
//!
//! Each Session runs in its own Tokio task:
//!
//! ```text
//! Phase 1: Login (first non-empty line is the display name)
//!    ↓  registered, user list pushed to all, entrance announced
//! Phase 2: Relay loop (tokio::select!)
//!    ┌──────────────────────────────────────────────┐
//!    │  inbound line ──▶ Router ──▶ Registry        │
//!    │                              │ (try_send)    │
//!    │  socket ◀────── outbox ◀─────┘               │
//!    │  idle deadline ──▶ disconnect                │
//!    └──────────────────────────────────────────────┘
//!    ↓
//! Teardown: unregister, push user list, announce departure
//! ```
//!
//! Only the session task writes to its socket. Other sessions reach it
//! through its outbox, so concurrent senders never interleave bytes.
//!
//! Every socket write is bounded. Relayed lines must be flushed before the
//! idle deadline; notices and the final flush get `WRITE_GRACE`.

mod error_handling;
mod login;
mod relay;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::SinkExt;
use relay_proto::{RelayCodec, ServerLine};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout};
use tokio_util::codec::Framed;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::error::SessionError;
use crate::router::Router;
use crate::state::{Registry, SessionId};
use login::LoginResult;

/// How long a notice or the closing flush may wait on a peer that has
/// stopped reading.
const WRITE_GRACE: Duration = Duration::from_secs(5);

/// Per-connection knobs, resolved once from [`Config`].
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub login_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_line_len: usize,
    pub outbox_capacity: usize,
    pub reject_reserved_names: bool,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            login_timeout: config.timeouts.login_timeout(),
            idle_timeout: config.timeouts.idle_timeout(),
            max_line_len: config.limits.max_line_len,
            outbox_capacity: config.limits.outbox_capacity,
            reject_reserved_names: config.policy.reject_reserved_names,
        }
    }
}

/// Lifecycle of a session: `Connecting` until [`Session::run`] starts,
/// then `AwaitingLogin`, `Authenticated`, `Terminating` and `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionState {
    Connecting,
    AwaitingLogin,
    Authenticated,
    Terminating,
    Closed,
}

/// How a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Client sent `<?><quit>`.
    Quit,
    /// Client closed the connection.
    Disconnected,
    /// No display name before the login deadline.
    LoginTimeout,
    /// No valid line before the idle deadline.
    IdleTimeout,
}

/// A client connection handler.
pub struct Session<S> {
    id: SessionId,
    peer: SocketAddr,
    transport: Framed<S, RelayCodec>,
    registry: Arc<Registry>,
    router: Arc<Router>,
    settings: Arc<SessionSettings>,
    accepted_at: Instant,
    state: SessionState,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        id: SessionId,
        peer: SocketAddr,
        stream: S,
        registry: Arc<Registry>,
        router: Arc<Router>,
        settings: Arc<SessionSettings>,
    ) -> Self {
        let codec = RelayCodec::with_max_len(settings.max_line_len);
        Self {
            id,
            peer,
            transport: Framed::new(stream, codec),
            registry,
            router,
            settings,
            accepted_at: Instant::now(),
            state: SessionState::Connecting,
        }
    }

    /// Run the session to completion.
    #[instrument(skip(self), fields(id = %self.id, peer = %self.peer), name = "session")]
    pub async fn run(mut self) -> Result<SessionEnd, SessionError> {
        self.transition(SessionState::AwaitingLogin);
        let (outbox_tx, mut outbox_rx) = mpsc::channel(self.settings.outbox_capacity);

        let result = match self.login(outbox_tx).await {
            Ok(LoginResult::Registered(name)) => {
                self.transition(SessionState::Authenticated);
                info!(%name, "Logged in");
                self.registry.broadcast_user_list();
                self.router.announce_entrance(&name);

                let result = self.relay(&name, &mut outbox_rx).await;
                self.teardown(&name);
                result
            }
            Ok(LoginResult::Ended(end)) => Ok(end),
            Err(e) => Err(e),
        };

        self.close().await;
        result
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = ?self.state, to = ?next, "Session state change");
        self.state = next;
    }

    /// Write a notice straight to the socket. Best effort: the peer may
    /// already be gone or may not be reading.
    async fn send_notice(&mut self, text: &str) {
        match timeout(WRITE_GRACE, self.transport.send(ServerLine::notice(text))).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(error = %e, "Failed to send notice"),
            Err(_) => debug!("Notice write stalled"),
        }
    }

    /// Remove a logged-in session and tell the others.
    fn teardown(&mut self, name: &str) {
        self.transition(SessionState::Terminating);

        if let Some(member) = self.registry.unregister(self.id) {
            let online = Utc::now() - member.joined_at;
            info!(name = %member.name, online_secs = online.num_seconds(), "Left");
            if !self.registry.is_empty() {
                self.registry.broadcast_user_list();
            }
        }
        self.router.announce_departure(name);
    }

    async fn close(&mut self) {
        match timeout(WRITE_GRACE, self.transport.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(error = %e, "Error closing connection"),
            Err(_) => debug!("Closing flush stalled, dropping connection"),
        }
        self.transition(SessionState::Closed);
    }
}
