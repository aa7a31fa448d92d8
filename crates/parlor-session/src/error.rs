//! Error types for the session layer.

use parlor_game::GameError;
use parlor_store::StoreError;

/// Errors that can occur during session operations.
///
/// The message strings double as wire error payloads — the connection
/// handler forwards them verbatim to the offending player.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session has already started (or finished) and takes no new
    /// players.
    #[error("session is not accepting players")]
    NotAccepting,

    /// Every player slot is taken.
    #[error("session is full")]
    Full,

    /// The player id is already present in this session.
    #[error("player {0} already in session")]
    DuplicatePlayer(String),

    /// `start` was requested outside the waiting state.
    #[error("session is not in waiting state")]
    NotWaiting,

    /// `start` was requested before enough players joined.
    #[error("need at least {need} players, have {have}")]
    NotEnoughPlayers { need: usize, have: usize },

    /// No game with this name is registered.
    #[error("unknown game type: {0}")]
    UnknownGame(String),

    /// The roster snapshot could not be serialized.
    #[error("serialize roster: {0}")]
    Roster(serde_json::Error),

    /// A match serialize/deserialize failure.
    #[error(transparent)]
    Game(#[from] GameError),

    /// A persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}
