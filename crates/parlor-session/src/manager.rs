//! The session manager: creates, tracks, persists, and evicts sessions.
//!
//! This is the central piece of the session layer. It owns the
//! `code → Session` map and the store, and it is the only component that
//! touches persistence. Lock ordering is "manager map lock first, session
//! lock second"; neither is ever held across store or network I/O.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use parlor_game::{MatchConfig, Registry};
use parlor_protocol::{SessionInfo, SessionStatus};
use parlor_store::{Store, StoreError};

use crate::{Session, SessionError};

/// The persisted roster snapshot, stored as opaque JSON in the
/// `session_players` table and consulted on restore.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RosterSnapshot {
    players: Vec<String>,
    host_id: Option<String>,
}

/// Manages all active sessions.
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    registry: Arc<Registry>,
    store: Store,
}

impl SessionManager {
    /// Creates a manager over a registry and an opened store.
    pub fn new(registry: Arc<Registry>, store: Store) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            registry,
            store,
        }
    }

    /// The game registry this manager resolves game types against.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Creates a new session and persists its row.
    ///
    /// A code collision is not retried here; the store's conflict error
    /// surfaces to the caller.
    pub async fn create(&self, game_type: &str) -> Result<Arc<Session>, SessionError> {
        let game = self
            .registry
            .get(game_type)
            .ok_or_else(|| SessionError::UnknownGame(game_type.to_string()))?;

        let code = generate_code();
        self.store.create_session(&code, game_type).await?;

        let session = Arc::new(Session::new(code.clone(), game_type.to_string(), game));
        self.sessions
            .write()
            .await
            .insert(code.clone(), Arc::clone(&session));

        tracing::info!(%code, game_type, "session created");
        Ok(session)
    }

    /// Looks up a session by code.
    pub async fn get(&self, code: &str) -> Option<Arc<Session>> {
        self.sessions.read().await.get(code).cloned()
    }

    /// Info snapshots for all in-memory sessions.
    pub async fn list(&self) -> Vec<SessionInfo> {
        let sessions: Vec<Arc<Session>> =
            self.sessions.read().await.values().cloned().collect();
        let mut infos = Vec::with_capacity(sessions.len());
        for session in sessions {
            infos.push(session.info().await);
        }
        infos
    }

    /// Persists a session's status and, when a match exists, its serialized
    /// snapshot.
    ///
    /// The snapshot is captured under the session read lock; the store
    /// writes happen after it is released.
    pub async fn save_match_state(&self, session: &Session) -> Result<(), SessionError> {
        let (status, snapshot) = {
            let state = session.read().await;
            let snapshot = match state.current_match.as_ref() {
                Some(m) => Some(m.save()?),
                None => None,
            };
            (state.status, snapshot)
        };

        self.store
            .update_session_status(session.code(), status.as_str())
            .await?;
        if let Some(bytes) = snapshot {
            self.store.save_match_state(session.code(), &bytes).await?;
        }
        Ok(())
    }

    /// Persists the roster snapshot (player ids + host) for restore.
    pub async fn save_roster(&self, session: &Session) -> Result<(), SessionError> {
        let snapshot = {
            let state = session.read().await;
            RosterSnapshot {
                players: state.player_ids(),
                host_id: state.host_id.clone(),
            }
        };
        let json = serde_json::to_string(&snapshot).map_err(SessionError::Roster)?;
        self.store.save_roster(session.code(), &json).await?;
        Ok(())
    }

    /// Rebuilds unfinished sessions from the store on startup.
    ///
    /// Rows with an unknown game type or an unreadable snapshot are logged
    /// and skipped. Restored rosters get detached mailboxes — players
    /// reattach through the protocol. Returns the number of sessions
    /// restored.
    pub async fn restore(&self) -> Result<usize, SessionError> {
        let rows = self.store.list_sessions(None).await?;
        let mut restored = 0;

        for row in rows {
            if row.status == SessionStatus::Finished.as_str() {
                continue;
            }
            let Some(status) = SessionStatus::parse(&row.status) else {
                tracing::warn!(code = %row.code, status = %row.status, "skipping session: unknown status");
                continue;
            };
            let Some(game) = self.registry.get(&row.game_type) else {
                tracing::warn!(
                    code = %row.code,
                    game_type = %row.game_type,
                    "skipping session: unknown game type"
                );
                continue;
            };

            let roster = match self.store.get_roster(&row.code).await {
                Ok(json) => match serde_json::from_str::<RosterSnapshot>(&json) {
                    Ok(snapshot) => Some(snapshot),
                    Err(e) => {
                        tracing::warn!(code = %row.code, error = %e, "ignoring unreadable roster row");
                        None
                    }
                },
                Err(StoreError::NotFound) => None,
                Err(e) => {
                    tracing::warn!(code = %row.code, error = %e, "ignoring unreadable roster row");
                    None
                }
            };

            let session = Session::new(row.code.clone(), row.game_type.clone(), Arc::clone(&game));
            {
                let mut state = session.write().await;
                state.status = status;
                if let Some(snapshot) = &roster {
                    for id in &snapshot.players {
                        state.restore_player(id.clone());
                    }
                    state.host_id = snapshot.host_id.clone();
                }

                if status == SessionStatus::Playing {
                    let bytes = match self.store.get_match_state(&row.code).await {
                        Ok(bytes) => bytes,
                        Err(e) => {
                            tracing::warn!(code = %row.code, error = %e, "skipping session: no match state");
                            continue;
                        }
                    };
                    // The real ids are baked into the snapshot; the
                    // construction roster only has to satisfy the game's
                    // player-count bounds.
                    let player_ids = match &roster {
                        Some(snapshot) if !snapshot.players.is_empty() => {
                            snapshot.players.clone()
                        }
                        _ => vec!["_".to_string(); game.info().min_players],
                    };
                    let mut current = game.new_match(MatchConfig { player_ids });
                    if let Err(e) = current.load(&bytes) {
                        tracing::warn!(code = %row.code, error = %e, "skipping session: bad match state");
                        continue;
                    }
                    state.current_match = Some(current);
                }
            }

            self.sessions
                .write()
                .await
                .insert(row.code.clone(), Arc::new(session));
            restored += 1;
            tracing::info!(code = %row.code, status = %status, "session restored");
        }

        Ok(restored)
    }

    /// Drops a session from memory and deletes its rows.
    pub async fn remove(&self, code: &str) {
        self.sessions.write().await.remove(code);
        if let Err(e) = self.store.delete_session(code).await {
            tracing::warn!(code, error = %e, "delete session failed");
        }
    }

    /// Periodic eviction of stale sessions. Runs until the task is dropped.
    pub async fn run_cleanup(&self, interval: Duration, max_age: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // first tick fires immediately; skip it
        loop {
            ticker.tick().await;
            self.cleanup_once(max_age).await;
        }
    }

    /// One eviction sweep: empty sessions go unconditionally, finished
    /// sessions once their persisted `created_at` is older than `max_age`.
    pub async fn cleanup_once(&self, max_age: Duration) {
        let candidates: Vec<(String, Arc<Session>)> = self
            .sessions
            .read()
            .await
            .iter()
            .map(|(code, session)| (code.clone(), Arc::clone(session)))
            .collect();

        let now = Utc::now();
        let max_age =
            chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX);

        for (code, session) in candidates {
            let (empty, finished) = {
                let state = session.read().await;
                (
                    state.player_count() == 0,
                    state.status == SessionStatus::Finished,
                )
            };
            if !(empty || finished) {
                continue;
            }

            let row = match self.store.get_session(&code).await {
                Ok(row) => Some(row),
                Err(StoreError::NotFound) => None,
                Err(e) => {
                    tracing::warn!(%code, error = %e, "cleanup: session row unreadable");
                    continue;
                }
            };
            let Some(row) = row else {
                // Row already gone; just forget the in-memory entry.
                self.sessions.write().await.remove(&code);
                continue;
            };

            let expired = now.signed_duration_since(row.created_at) > max_age;
            if empty || expired {
                tracing::info!(%code, empty, expired, "cleaning up session");
                if let Err(e) = self.store.delete_session(&code).await {
                    tracing::warn!(%code, error = %e, "cleanup: delete failed");
                }
                self.sessions.write().await.remove(&code);
            }
        }
    }
}

/// Generates a 6-character lowercase hex session code from a
/// cryptographically secure RNG.
fn generate_code() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 3] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
