//! The `Game` and `Match` traits — the extension point for game modules.
//!
//! A game module implements [`Game`] (a factory describing one game type)
//! and [`Match`] (one in-progress game). The runtime calls these at the
//! right times; the module just writes game rules.

use serde_json::Value;

use crate::{Action, GameError, GameInfo, MatchConfig, PlayerResult};

/// A game type (tic-tac-toe, chess, ...). One instance is registered per
/// type and shared by every session hosting that game.
pub trait Game: Send + Sync {
    /// Describes this game for the registry and the lobby.
    fn info(&self) -> GameInfo;

    /// Creates a fresh match for the given players.
    ///
    /// `config.player_ids` always has a length within
    /// `[min_players, max_players]` — the session gate enforces it.
    fn new_match(&self, config: MatchConfig) -> Box<dyn Match>;
}

/// One in-progress game, mutated only through [`apply_action`].
///
/// The runtime holds the session write lock across `apply_action` and the
/// terminal check, so implementations never see concurrent mutation.
///
/// [`apply_action`]: Match::apply_action
pub trait Match: Send + Sync {
    /// This player's view of the game state.
    ///
    /// Views are per-recipient: a game may hide information other players
    /// should not see (hands, fog of war). The value is embedded verbatim
    /// in the player's `state` frame.
    fn state(&self, player_id: &str) -> Value;

    /// Actions this player may legally submit right now.
    ///
    /// Empty when it is not their turn or the game is over.
    fn valid_actions(&self, player_id: &str) -> Vec<Action>;

    /// Applies an action, mutating the match.
    ///
    /// The `Err` string is the authoritative rejection reason, delivered
    /// verbatim to the offending player. The runtime does not pre-filter
    /// against [`valid_actions`](Match::valid_actions).
    fn apply_action(&mut self, player_id: &str, action: Action) -> Result<(), String>;

    /// Whether the match has reached a terminal state.
    fn is_over(&self) -> bool;

    /// Final outcome per player. Empty until [`is_over`](Match::is_over).
    fn results(&self) -> Vec<PlayerResult>;

    /// Serializes the full match state for durability.
    ///
    /// The byte shape is the match's own concern; the runtime stores it
    /// opaquely and feeds it back through [`load`](Match::load) on restore.
    fn save(&self) -> Result<Vec<u8>, GameError>;

    /// Replaces this match's state with a previously [`save`](Match::save)d
    /// snapshot.
    fn load(&mut self, bytes: &[u8]) -> Result<(), GameError>;
}
