//! `ParlorServer` builder and HTTP surface.
//!
//! This is the entry point for running a Parlor game server. It ties the
//! layers together: axum routes → connection protocol → session → store.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use parlor_session::SessionManager;

use crate::{routes, ws, ParlorError};

/// Shared state handed to every request handler.
///
/// Cheap to clone — the manager is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<SessionManager>,
}

/// Builds the full route table: the REST surface, the streaming endpoint,
/// and (optionally) a static-asset fallback for everything else.
pub fn router(state: AppState, assets_dir: Option<PathBuf>) -> Router {
    let router = Router::new()
        .route("/api/games", get(routes::list_games))
        .route("/api/sessions", post(routes::create_session))
        .route("/api/sessions/{code}", get(routes::get_session))
        .route("/api/sessions/{code}/start", post(routes::start_session))
        .route("/api/sessions/{code}/stream", get(ws::stream))
        .with_state(state);

    match assets_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

/// Builder for configuring and starting a Parlor server.
///
/// # Example
///
/// ```rust,ignore
/// let server = ParlorServer::builder()
///     .bind("0.0.0.0:8080")
///     .assets_dir("web")
///     .build(manager)
///     .await?;
/// server.run().await
/// ```
pub struct ParlorServerBuilder {
    bind_addr: String,
    assets_dir: Option<PathBuf>,
}

impl ParlorServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            assets_dir: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Serves static files from this directory for any unmatched route.
    pub fn assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = Some(dir.into());
        self
    }

    /// Binds the listener and assembles the server.
    pub async fn build(self, manager: Arc<SessionManager>) -> Result<ParlorServer, ParlorError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        let app = router(AppState { manager }, self.assets_dir);
        Ok(ParlorServer { listener, app })
    }
}

impl Default for ParlorServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound, ready-to-run Parlor server.
pub struct ParlorServer {
    listener: TcpListener,
    app: Router,
}

impl ParlorServer {
    /// Creates a new builder.
    pub fn builder() -> ParlorServerBuilder {
        ParlorServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves requests until the process is terminated.
    pub async fn run(self) -> Result<(), ParlorError> {
        tracing::info!(addr = %self.listener.local_addr()?, "Parlor server running");
        axum::serve(self.listener, self.app).await?;
        Ok(())
    }
}
