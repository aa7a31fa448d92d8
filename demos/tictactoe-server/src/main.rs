//! Parlor demo server: hosts tic-tac-toe sessions.
//!
//! Configuration comes from the environment: `PORT` (default 8080),
//! `DB_PATH` (default `games.db`), and `WEB_DIR` (default `web`) for the
//! static front-end passthrough.

mod game;

use std::sync::Arc;
use std::time::Duration;

use parlor::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::game::TicTacToe;

/// How often the stale-session sweep runs, and how long finished sessions
/// linger before eviction.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);
const SESSION_MAX_AGE: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> Result<(), ParlorError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".into());
    let db_path = std::env::var("DB_PATH").unwrap_or_else(|_| "games.db".into());
    let web_dir = std::env::var("WEB_DIR").unwrap_or_else(|_| "web".into());

    let store = Store::open(&db_path).await?;

    let mut registry = Registry::new();
    registry
        .register(Arc::new(TicTacToe))
        .expect("duplicate game registration");

    let manager = Arc::new(SessionManager::new(Arc::new(registry), store));
    match manager.restore().await {
        Ok(count) => tracing::info!(count, "restored sessions"),
        Err(e) => tracing::warn!(error = %e, "restore sessions failed"),
    }

    let cleanup = Arc::clone(&manager);
    tokio::spawn(async move {
        cleanup.run_cleanup(CLEANUP_INTERVAL, SESSION_MAX_AGE).await;
    });

    let server = ParlorServer::builder()
        .bind(&format!("0.0.0.0:{port}"))
        .assets_dir(web_dir)
        .build(manager)
        .await?;
    server.run().await
}

// =========================================================================
// End-to-end scenarios: REST + websocket against a real server.
// =========================================================================
