//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds the listen socket and spawns a Session task for each
//! incoming client.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use super::session::{Session, SessionSettings};
use crate::config::ListenConfig;
use crate::router::Router;
use crate::state::{Registry, SessionIdGenerator};

/// The Gateway accepts incoming TCP connections and spawns sessions.
pub struct Gateway {
    listener: TcpListener,
    registry: Arc<Registry>,
    router: Arc<Router>,
    settings: Arc<SessionSettings>,
    ids: SessionIdGenerator,
}

impl Gateway {
    /// Bind the gateway to the configured address.
    pub async fn bind(
        listen: &ListenConfig,
        registry: Arc<Registry>,
        router: Arc<Router>,
        settings: Arc<SessionSettings>,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(listen.address)
            .await
            .with_context(|| format!("failed to bind {}", listen.address))?;

        let gateway = Self {
            listener,
            registry,
            router,
            settings,
            ids: SessionIdGenerator::new(),
        };
        info!(address = %gateway.local_addr()?, "Listener bound");
        Ok(gateway)
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` fires, then wait for the
    /// sessions already running to end on their own.
    ///
    /// A failed `accept` is fatal.
    #[instrument(skip_all, name = "gateway")]
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let mut sessions = JoinSet::new();
        let mut watch_shutdown = true;

        loop {
            tokio::select! {
                signal = shutdown.recv(), if watch_shutdown => match signal {
                    // Nobody left who could ask us to stop
                    Err(RecvError::Closed) => watch_shutdown = false,
                    _ => {
                        info!("Shutdown requested - no longer accepting connections");
                        break;
                    }
                },

                Some(joined) = sessions.join_next() => {
                    if let Err(e) = joined {
                        error!(error = %e, "Session task failed");
                    }
                }

                accepted = self.listener.accept() => {
                    let (stream, addr) = accepted.context("accept failed")?;
                    self.spawn_session(&mut sessions, stream, addr);
                }
            }
        }

        if !sessions.is_empty() {
            info!(
                active = sessions.len(),
                logged_in = self.registry.len(),
                "Waiting for sessions to finish"
            );
        }
        while let Some(joined) = sessions.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Session task failed");
            }
        }

        Ok(())
    }

    fn spawn_session(&self, sessions: &mut JoinSet<()>, stream: TcpStream, addr: SocketAddr) {
        if let Err(e) = stream.set_nodelay(true) {
            debug!(%addr, error = %e, "Failed to set TCP_NODELAY");
        }

        let id = self.ids.next();
        info!(%id, %addr, "Connection accepted");

        let session = Session::new(
            id,
            addr,
            stream,
            Arc::clone(&self.registry),
            Arc::clone(&self.router),
            Arc::clone(&self.settings),
        );

        sessions.spawn(async move {
            match session.run().await {
                Ok(end) => info!(%id, %addr, ?end, "Connection closed"),
                Err(e) => warn!(%id, %addr, code = e.error_code(), error = %e, "Connection closed with error"),
            }
        });
    }
}
