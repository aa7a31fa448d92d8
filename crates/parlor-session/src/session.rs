//! One session: lifecycle state, player roster, mailboxes, current match.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use parlor_game::{Game, Match, MatchConfig};
use parlor_protocol::{SessionInfo, SessionStatus};

use crate::SessionError;

/// Capacity of a player's outbound mailbox, in frames.
///
/// Every broadcast is a full state snapshot, so a dropped frame is healed
/// by the next one; the bound only has to absorb short bursts.
pub const MAILBOX_CAPACITY: usize = 64;

/// Sending half of a player's outbound mailbox.
pub type Mailbox = mpsc::Sender<Vec<u8>>;

/// Receiving half, drained by at most one connected writer task.
pub type MailboxReceiver = mpsc::Receiver<Vec<u8>>;

/// Allocates a fresh mailbox pair.
pub fn mailbox() -> (Mailbox, MailboxReceiver) {
    mpsc::channel(MAILBOX_CAPACITY)
}

/// A player entry in a session's roster.
///
/// The mailbox belongs to the session entry, not to any connection. A
/// reconnecting player rebinds it; the previous writer notices its receiver
/// closing and exits.
#[derive(Debug)]
pub struct Player {
    pub id: String,
    mailbox: Mailbox,
}

impl Player {
    /// A player with a mailbox nobody drains yet. Frames delivered before a
    /// connection rebinds the mailbox are dropped.
    fn detached(id: String) -> Self {
        let (tx, _rx) = mailbox();
        Self { id, mailbox: tx }
    }

    /// The current sending half of this player's mailbox.
    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    /// Non-blocking enqueue. Drops the frame when the mailbox is full or
    /// has no reader — a slow recipient never blocks anyone.
    pub fn deliver(&self, frame: Vec<u8>) {
        let _ = self.mailbox.try_send(frame);
    }
}

/// The mutable interior of a [`Session`], guarded by its rw-lock.
///
/// Exposed so the connection protocol can hold the write lock across its
/// compound apply-action-then-observe-terminal-state region.
pub struct SessionState {
    pub status: SessionStatus,
    /// First player to join; never changes afterwards.
    pub host_id: Option<String>,
    players: HashMap<String, Player>,
    /// Present exactly when `status != Waiting`.
    pub current_match: Option<Box<dyn Match>>,
}

impl SessionState {
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player_ids(&self) -> Vec<String> {
        self.players.keys().cloned().collect()
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    /// Re-inserts a persisted roster entry with a detached mailbox.
    pub(crate) fn restore_player(&mut self, id: String) {
        self.players
            .entry(id.clone())
            .or_insert_with(|| Player::detached(id));
    }
}

/// One game session with its connected players.
///
/// All mutable state sits behind a single rw-lock: plain operations take it
/// internally, and [`read`](Session::read)/[`write`](Session::write) expose
/// it for compound operations. Lock sections never perform network or disk
/// I/O.
pub struct Session {
    code: String,
    game_type: String,
    game: Arc<dyn Game>,
    state: RwLock<SessionState>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("code", &self.code)
            .field("game_type", &self.game_type)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates a session in the waiting state with an empty roster.
    pub fn new(code: String, game_type: String, game: Arc<dyn Game>) -> Self {
        Self {
            code,
            game_type,
            game,
            state: RwLock::new(SessionState {
                status: SessionStatus::Waiting,
                host_id: None,
                players: HashMap::new(),
                current_match: None,
            }),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn game_type(&self) -> &str {
        &self.game_type
    }

    pub fn game(&self) -> &Arc<dyn Game> {
        &self.game
    }

    /// Acquires the session read lock.
    pub async fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().await
    }

    /// Acquires the session write lock.
    pub async fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().await
    }

    /// Adds a player with a fresh (detached) mailbox.
    ///
    /// The first successful add becomes the host.
    ///
    /// # Errors
    /// [`SessionError::NotAccepting`] outside the waiting state,
    /// [`SessionError::Full`] at capacity,
    /// [`SessionError::DuplicatePlayer`] when the id is taken.
    pub async fn add_player(&self, player_id: &str) -> Result<(), SessionError> {
        let mut state = self.state.write().await;

        if state.status != SessionStatus::Waiting {
            return Err(SessionError::NotAccepting);
        }
        if state.players.len() >= self.game.info().max_players {
            return Err(SessionError::Full);
        }
        if state.players.contains_key(player_id) {
            return Err(SessionError::DuplicatePlayer(player_id.to_string()));
        }

        state
            .players
            .insert(player_id.to_string(), Player::detached(player_id.to_string()));
        if state.host_id.is_none() {
            state.host_id = Some(player_id.to_string());
        }

        tracing::info!(
            code = %self.code,
            player_id,
            players = state.players.len(),
            "player joined"
        );
        Ok(())
    }

    /// Drops a player and their mailbox. No-op when absent.
    pub async fn remove_player(&self, player_id: &str) {
        let mut state = self.state.write().await;
        if state.players.remove(player_id).is_some() {
            tracing::info!(
                code = %self.code,
                player_id,
                players = state.players.len(),
                "player removed"
            );
        }
    }

    /// Rebinds an existing player's mailbox to one supplied by a new
    /// connection. Returns `false` when the player is unknown.
    ///
    /// The previous sender is dropped, which closes the old writer's
    /// receiver and lets it exit.
    pub async fn connect_player(&self, player_id: &str, mailbox: Mailbox) -> bool {
        let mut state = self.state.write().await;
        match state.players.get_mut(player_id) {
            Some(player) => {
                player.mailbox = mailbox;
                true
            }
            None => false,
        }
    }

    pub async fn player_ids(&self) -> Vec<String> {
        self.state.read().await.player_ids()
    }

    /// Clone of the player's current mailbox sender, if present.
    pub async fn player_mailbox(&self, player_id: &str) -> Option<Mailbox> {
        self.state
            .read()
            .await
            .players
            .get(player_id)
            .map(|p| p.mailbox.clone())
    }

    /// Transitions waiting → playing, constructing the match with the
    /// current roster.
    ///
    /// # Errors
    /// [`SessionError::NotWaiting`] outside the waiting state,
    /// [`SessionError::NotEnoughPlayers`] below the game's minimum.
    pub async fn start(&self) -> Result<(), SessionError> {
        let mut state = self.state.write().await;

        if state.status != SessionStatus::Waiting {
            return Err(SessionError::NotWaiting);
        }
        let info = self.game.info();
        if state.players.len() < info.min_players {
            return Err(SessionError::NotEnoughPlayers {
                need: info.min_players,
                have: state.players.len(),
            });
        }

        let player_ids = state.player_ids();
        state.current_match = Some(self.game.new_match(MatchConfig { player_ids }));
        state.status = SessionStatus::Playing;

        tracing::info!(code = %self.code, players = state.players.len(), "session started");
        Ok(())
    }

    /// Marks the session finished.
    pub async fn finish(&self) {
        let mut state = self.state.write().await;
        state.status = SessionStatus::Finished;
    }

    /// Enqueues the same frame into every player's mailbox.
    ///
    /// Non-blocking: a full mailbox drops its copy silently.
    pub async fn broadcast(&self, frame: &[u8]) {
        let state = self.state.read().await;
        for player in state.players.values() {
            player.deliver(frame.to_vec());
        }
    }

    /// Snapshot of session metadata.
    pub async fn info(&self) -> SessionInfo {
        let state = self.state.read().await;
        self.info_locked(&state)
    }

    /// Builds the info snapshot from an already-held guard.
    pub fn info_locked(&self, state: &SessionState) -> SessionInfo {
        SessionInfo {
            code: self.code.clone(),
            game_type: self.game_type.clone(),
            status: state.status,
            players: state.player_ids(),
            host_id: state.host_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_game::{Action, GameError, GameInfo, PlayerResult};
    use serde_json::Value;

    struct PairGame;
    struct PairMatch;

    impl Game for PairGame {
        fn info(&self) -> GameInfo {
            GameInfo {
                name: "pair".into(),
                min_players: 2,
                max_players: 2,
            }
        }
        fn new_match(&self, _config: MatchConfig) -> Box<dyn Match> {
            Box::new(PairMatch)
        }
    }

    impl Match for PairMatch {
        fn state(&self, _player_id: &str) -> Value {
            Value::Null
        }
        fn valid_actions(&self, _player_id: &str) -> Vec<Action> {
            Vec::new()
        }
        fn apply_action(&mut self, _player_id: &str, _action: Action) -> Result<(), String> {
            Ok(())
        }
        fn is_over(&self) -> bool {
            false
        }
        fn results(&self) -> Vec<PlayerResult> {
            Vec::new()
        }
        fn save(&self) -> Result<Vec<u8>, GameError> {
            Ok(Vec::new())
        }
        fn load(&mut self, _bytes: &[u8]) -> Result<(), GameError> {
            Ok(())
        }
    }

    fn session() -> Session {
        Session::new("0a1b2c".into(), "pair".into(), Arc::new(PairGame))
    }

    #[tokio::test]
    async fn test_first_player_becomes_host() {
        let s = session();
        s.add_player("alice").await.unwrap();
        s.add_player("bob").await.unwrap();

        let info = s.info().await;
        assert_eq!(info.host_id.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_host_survives_mailbox_rebind() {
        let s = session();
        s.add_player("alice").await.unwrap();
        s.add_player("bob").await.unwrap();

        let (tx, _rx) = mailbox();
        assert!(s.connect_player("alice", tx).await);
        assert_eq!(s.info().await.host_id.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_add_player_rejects_duplicates_and_overflow() {
        let s = session();
        s.add_player("alice").await.unwrap();
        assert!(matches!(
            s.add_player("alice").await.unwrap_err(),
            SessionError::DuplicatePlayer(_)
        ));

        s.add_player("bob").await.unwrap();
        assert!(matches!(
            s.add_player("carol").await.unwrap_err(),
            SessionError::Full
        ));
    }

    #[tokio::test]
    async fn test_add_player_rejected_once_started() {
        let s = session();
        s.add_player("alice").await.unwrap();
        s.add_player("bob").await.unwrap();
        s.start().await.unwrap();

        // The session is full AND playing; the status gate fires first.
        assert!(matches!(
            s.add_player("carol").await.unwrap_err(),
            SessionError::NotAccepting
        ));
    }

    #[tokio::test]
    async fn test_start_gate() {
        let s = session();
        s.add_player("alice").await.unwrap();
        assert!(matches!(
            s.start().await.unwrap_err(),
            SessionError::NotEnoughPlayers { need: 2, have: 1 }
        ));

        s.add_player("bob").await.unwrap();
        s.start().await.unwrap();
        assert_eq!(s.info().await.status, SessionStatus::Playing);
        assert!(s.read().await.current_match.is_some());

        // Second start fails: no longer waiting.
        assert!(matches!(
            s.start().await.unwrap_err(),
            SessionError::NotWaiting
        ));
    }

    #[tokio::test]
    async fn test_connect_player_rebinds_mailbox() {
        let s = session();
        s.add_player("alice").await.unwrap();

        let (tx, mut rx) = mailbox();
        assert!(s.connect_player("alice", tx.clone()).await);
        assert!(s
            .player_mailbox("alice")
            .await
            .unwrap()
            .same_channel(&tx));

        s.broadcast(b"hello").await;
        assert_eq!(rx.recv().await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_connect_unknown_player_is_refused() {
        let s = session();
        let (tx, _rx) = mailbox();
        assert!(!s.connect_player("ghost", tx).await);
        assert!(s.player_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_full_mailbox_does_not_block_other_recipients() {
        let s = session();
        s.add_player("alice").await.unwrap();
        s.add_player("bob").await.unwrap();

        let (slow_tx, _slow_rx) = mailbox();
        let (fast_tx, mut fast_rx) = mailbox();
        s.connect_player("alice", slow_tx).await;
        s.connect_player("bob", fast_tx).await;

        // Saturate alice's mailbox, then keep broadcasting.
        for _ in 0..(MAILBOX_CAPACITY + 8) {
            s.broadcast(b"snapshot").await;
        }

        // Bob still received frames up to his own capacity; nothing
        // panicked or blocked above.
        assert_eq!(fast_rx.recv().await.unwrap(), b"snapshot");
    }

    #[tokio::test]
    async fn test_remove_player_closes_mailbox() {
        let s = session();
        s.add_player("alice").await.unwrap();

        let (tx, mut rx) = mailbox();
        s.connect_player("alice", tx).await;
        s.remove_player("alice").await;

        // The session held the only sender; removing the player dropped it,
        // so the receiver sees the channel close.
        assert_eq!(rx.recv().await, None);
        assert!(s.player_ids().await.is_empty());
    }
}
