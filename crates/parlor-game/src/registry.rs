//! Game registry: the name → game mapping the runtime resolves against.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{Game, GameError, GameInfo};

/// Holds all registered game types.
///
/// Registration happens once at startup; afterwards the registry is shared
/// behind an `Arc` and read concurrently by the REST surface and the
/// session manager. Insertion order is preserved so `list()` is stable.
#[derive(Default)]
pub struct Registry {
    games: Vec<Arc<dyn Game>>,
    by_name: HashMap<String, usize>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a game type.
    ///
    /// # Errors
    /// Returns [`GameError::AlreadyRegistered`] when a game with the same
    /// name is present. Startup code should `expect` this — a duplicate
    /// registration is a programmer error worth aborting on.
    pub fn register(&mut self, game: Arc<dyn Game>) -> Result<(), GameError> {
        let name = game.info().name;
        if self.by_name.contains_key(&name) {
            return Err(GameError::AlreadyRegistered(name));
        }
        self.by_name.insert(name, self.games.len());
        self.games.push(game);
        Ok(())
    }

    /// Looks up a game by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Game>> {
        self.by_name.get(name).map(|&i| Arc::clone(&self.games[i]))
    }

    /// Returns info for all registered games, in registration order.
    pub fn list(&self) -> Vec<GameInfo> {
        self.games.iter().map(|g| g.info()).collect()
    }
}
