//! WebSocket sync layer for pokeduel battles.
//!
//! Clients exchange one JSON event per text frame:
//!
//! ```text
//! client → server   join | leave | attack | surrender | create
//! server → client   snapshot | created | error
//! ```
//!
//! Every successful command broadcasts a full snapshot to all observers
//! of the battle. Rejected commands are answered to the sender only.

pub mod config;
mod connection;
pub mod error;
pub mod observer;
pub mod registry;
pub mod session;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

pub use crate::config::ServerConfig;
pub use connection::Inbound;
pub use error::CommandError;
pub use observer::{ObserverHandle, ObserverId};
pub use registry::BattleRegistry;
pub use session::Session;

pub use pokeduel_protocol::{ClientEvent, ErrorCode, ServerEvent};

/// A bound server, ready to accept connections
pub struct Server {
    listener: TcpListener,
    registry: Arc<BattleRegistry>,
    config: ServerConfig,
}

impl Server {
    /// Bind the configured address with an empty registry using the
    /// configured damage formula
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind(&config.bind_address)
            .await
            .with_context(|| format!("Failed to bind {}", config.bind_address))?;

        Ok(Self {
            listener,
            registry: Arc::new(BattleRegistry::new().with_formula(config.damage_formula())),
            config,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read local address")
    }

    pub fn registry(&self) -> Arc<BattleRegistry> {
        self.registry.clone()
    }

    /// Accept connections forever
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` completes.
    ///
    /// Also runs the sweeper that drops idle and abandoned battles.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let sweeper = tokio::spawn(sweep(self.registry.clone(), self.config.clone()));

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            tracing::warn!(error = %e, "failed to accept connection");
                            continue;
                        }
                    };
                    let registry = self.registry.clone();
                    tokio::spawn(async move {
                        if let Err(e) = session::run(stream, registry).await {
                            tracing::warn!(%peer, error = %e, "session ended with error");
                        }
                    });
                }
            }
        }

        sweeper.abort();
        tracing::info!(battles = self.registry.len(), "server stopped");
        Ok(())
    }
}

async fn sweep(registry: Arc<BattleRegistry>, config: ServerConfig) {
    let mut interval = tokio::time::interval(config.sweep_interval());
    loop {
        interval.tick().await;
        let evicted = registry.evict_idle(config.idle_timeout());
        if evicted > 0 {
            tracing::info!(evicted, remaining = registry.len(), "swept battles");
        }
    }
}
