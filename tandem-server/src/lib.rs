mod config;
mod room;
mod signaling;

pub use config::*;
pub use room::*;
pub use signaling::*;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Routes of the relay: a single WebSocket endpoint at `/ws`.
pub fn router(service: SignalingService) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(service)
}

/// A bound relay server with its room manager already running.
pub struct Server {
    listener: TcpListener,
    service: SignalingService,
}

impl Server {
    pub async fn bind(config: &ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.bind)
            .await
            .with_context(|| format!("Failed to bind {}", config.bind))?;

        let (cmd_tx, cmd_rx) = tokio::sync::mpsc::channel(256);
        let service = SignalingService::new(cmd_tx);
        let manager = RoomManager::new(cmd_rx, Arc::new(service.clone()));
        tokio::spawn(manager.run());

        Ok(Self { listener, service })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serves until `shutdown` resolves.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Signaling server listening on ws://{}/ws", self.local_addr()?);
        axum::serve(self.listener, router(self.service))
            .with_graceful_shutdown(shutdown)
            .await
            .context("Relay server failed")?;
        Ok(())
    }
}
