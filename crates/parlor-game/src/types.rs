//! Shared game types.
//!
//! These structures cross the runtime/game boundary and, serialized, appear
//! on the wire inside `state` frames. Field names are part of the protocol —
//! the shape tests below pin them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Describes a game type for the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    /// Registry key. Unique across all registered games.
    pub name: String,
    pub min_players: usize,
    pub max_players: usize,
}

/// Settings for creating a new match.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Identifiers of the participating players, in roster order.
    /// Length is always within `[min_players, max_players]`.
    pub player_ids: Vec<String>,
}

/// A move a player can submit.
///
/// The runtime treats the payload as opaque — only the owning game decodes
/// it. `type` discriminates between a game's action kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

/// The outcome for one player of a finished match.
///
/// Rank 1 is best; ties share a rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResult {
    pub player_id: String,
    pub rank: u32,
    pub score: i64,
}
