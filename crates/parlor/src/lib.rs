//! # Parlor
//!
//! A hosting service for turn-based multiplayer web games.
//!
//! Clients create shareable short-code sessions over REST, join them on a
//! persistent websocket, and play matches whose rules come from pluggable
//! game modules. Unfinished sessions survive process restarts: match state
//! is snapshotted to SQLite after every accepted move and restored on boot.
//!
//! Game developers implement the [`Game`](parlor_game::Game) and
//! [`Match`](parlor_game::Match) traits, register the game, and the runtime
//! handles sessions, the wire protocol, broadcast fan-out, and durability.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use parlor::prelude::*;
//!
//! # struct MyGame;
//! # impl Game for MyGame {
//! #     fn info(&self) -> GameInfo { unimplemented!() }
//! #     fn new_match(&self, _: MatchConfig) -> Box<dyn Match> { unimplemented!() }
//! # }
//! # async fn run() -> Result<(), ParlorError> {
//! let store = Store::open("games.db").await?;
//! let mut registry = Registry::new();
//! registry.register(Arc::new(MyGame)).expect("unique game name");
//!
//! let manager = Arc::new(SessionManager::new(Arc::new(registry), store));
//! manager.restore().await?;
//!
//! let server = ParlorServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build(manager)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod routes;
mod server;
mod ws;

pub use error::ParlorError;
pub use server::{router, AppState, ParlorServer, ParlorServerBuilder};
pub use ws::broadcast_state;

/// Re-exports everything a game developer needs.
pub mod prelude {
    // Meta-crate
    pub use crate::{AppState, ParlorError, ParlorServer, ParlorServerBuilder};

    // Game contract
    pub use parlor_game::{
        Action, Game, GameError, GameInfo, Match, MatchConfig, PlayerResult, Registry,
    };

    // Wire protocol
    pub use parlor_protocol::{
        frame_type, ActionPayload, ErrorPayload, Frame, JoinPayload, ProtocolError, SessionInfo,
        SessionStatus, StatePayload,
    };

    // Session runtime
    pub use parlor_session::{
        mailbox, Mailbox, Session, SessionError, SessionManager, MAILBOX_CAPACITY,
    };

    // Storage
    pub use parlor_store::{Store, StoreError};
}
