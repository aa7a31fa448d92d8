//! Error types for the game layer.

/// Errors that can occur in the game contract and registry.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// A game with this name is already registered. Registration happens
    /// only at startup, so callers treat this as a programmer error.
    #[error("game {0:?} already registered")]
    AlreadyRegistered(String),

    /// Serializing a match snapshot failed.
    #[error("serialize match state: {0}")]
    Serialize(serde_json::Error),

    /// A stored match snapshot could not be deserialized.
    #[error("deserialize match state: {0}")]
    Deserialize(serde_json::Error),
}
