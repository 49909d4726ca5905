//! HTTP Server Implementation

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tracing::{error, info};

use super::upload::upload_avatar;
use crate::chat::ChatDispatcher;
use crate::config::Config;
use crate::connection::{ws_handler, ConnectionHub};
use crate::presence::{ConnectionRegistry, PresenceBroadcaster};
use crate::Result;

/// Shared application state for handlers.
///
/// Constructed once at server start and cloned into each handler; there is
/// no module-level singleton, so tests can spin up as many independent
/// instances as they need.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<ConnectionRegistry>,
    pub hub: Arc<ConnectionHub>,
    pub broadcaster: PresenceBroadcaster,
    pub dispatcher: ChatDispatcher,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let hub = Arc::new(ConnectionHub::new());
        let broadcaster = PresenceBroadcaster::new(Arc::clone(&registry), Arc::clone(&hub));
        let dispatcher = ChatDispatcher::new(Arc::clone(&registry), Arc::clone(&hub));

        Self {
            config,
            registry,
            hub,
            broadcaster,
            dispatcher,
        }
    }
}

/// Build the application router.
///
/// Static assets and previously uploaded avatars are both served at the
/// root, so the `/user-<millis>.<ext>` URLs handed out by the upload
/// endpoint resolve without a prefix.
pub fn create_router(state: AppState) -> Router {
    let file_server = ServeDir::new(&state.config.http.static_dir)
        .fallback(ServeDir::new(&state.config.http.uploads_dir));

    let upload_limit = state.config.http.max_upload_bytes;

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/upload", post(upload_avatar))
        .route("/health", get(health_check))
        .fallback_service(file_server)
        .layer(DefaultBodyLimit::max(upload_limit + 16 * 1024))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "ok"
}

/// The relay's HTTP/WebSocket server
pub struct AppServer {
    bind_addr: SocketAddr,
    state: AppState,
}

impl AppServer {
    pub fn new(bind_addr: SocketAddr, state: AppState) -> Self {
        Self { bind_addr, state }
    }

    /// Bind and serve until the shutdown signal fires.
    pub async fn start(self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let app = create_router(self.state);

        let listener = TcpListener::bind(self.bind_addr)
            .await
            .with_context(|| format!("Failed to bind server to {}", self.bind_addr))?;

        info!("Server listening on http://{}", self.bind_addr);
        info!("WebSocket endpoint: ws://{}/ws", self.bind_addr);

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("Server received shutdown signal, draining");
            })
            .await;

        if let Err(e) = result {
            error!("Server error: {}", e);
            return Err(e.into());
        }

        Ok(())
    }
}
