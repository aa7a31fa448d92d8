//! Unified error type for the Parlor server.

use parlor_game::GameError;
use parlor_protocol::ProtocolError;
use parlor_session::SessionError;
use parlor_store::StoreError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `parlor` meta-crate, callers deal with this single error
/// type; `#[from]` lets `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ParlorError {
    /// A socket-level failure (bind, accept, serve).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A wire encode/decode failure.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session lifecycle failure.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A game contract failure.
    #[error(transparent)]
    Game(#[from] GameError),
}
