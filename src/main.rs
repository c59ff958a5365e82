//! relayd - line-oriented chat relay daemon.
//!
//! Clients log in with a display name and exchange addressed lines:
//! broadcasts to everyone, whispers to one user, and presence updates.

mod config;
mod error;
mod network;
mod router;
mod state;

use crate::config::Config;
use crate::network::{Gateway, SessionSettings};
use crate::router::Router;
use crate::state::Registry;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(config_path) => Config::load(&config_path).map_err(|e| {
            error!(path = %config_path, error = %e, "Failed to load config");
            e
        })?,
        None => {
            info!("No config file given - using built-in defaults");
            Config::default()
        }
    };

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("configuration has {} error(s)", errors.len());
    }

    info!(
        server = %config.server.name,
        address = %config.listen.address,
        "Starting relayd"
    );

    let registry = Arc::new(Registry::new());
    let router = Arc::new(Router::new(Arc::clone(&registry), config.policy.clone()));
    let settings = Arc::new(SessionSettings::from_config(&config));

    let gateway = Gateway::bind(&config.listen, registry, router, settings).await?;

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install ctrl-c handler");
            return;
        }
        let _ = shutdown_tx.send(());
    });

    gateway.run(shutdown_rx).await
}
