//! The SQLite row store.

use std::path::Path;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::StoreError;

/// A session row as persisted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRow {
    pub code: String,
    pub game_type: String,
    /// Lowercase status spelling ("waiting", "playing", "finished").
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Handle to the session database. Cheap to clone — wraps a pool.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens (or creates) the database at `path` and bootstraps the schema.
    ///
    /// WAL journaling is enabled so readers proceed while a write is in
    /// flight.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        tracing::debug!(path = %path.as_ref().display(), "session store opened");
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS sessions (
                code       TEXT PRIMARY KEY,
                game_type  TEXT NOT NULL,
                status     TEXT NOT NULL DEFAULT 'waiting',
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS match_state (
                session_code TEXT PRIMARY KEY REFERENCES sessions(code),
                state        BLOB NOT NULL,
                updated_at   TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS session_players (
                session_code TEXT PRIMARY KEY REFERENCES sessions(code),
                roster       TEXT NOT NULL,
                updated_at   TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts a new session in the `waiting` state.
    ///
    /// # Errors
    /// [`StoreError::Conflict`] when the code is already taken.
    pub async fn create_session(&self, code: &str, game_type: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO sessions (code, game_type, status, created_at) VALUES (?, ?, 'waiting', ?)",
        )
        .bind(code)
        .bind(game_type)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(())
    }

    /// Fetches a session row by code.
    pub async fn get_session(&self, code: &str) -> Result<SessionRow, StoreError> {
        sqlx::query_as::<_, SessionRow>(
            "SELECT code, game_type, status, created_at FROM sessions WHERE code = ?",
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    /// Lists sessions, newest first, optionally filtered by status.
    pub async fn list_sessions(&self, status: Option<&str>) -> Result<Vec<SessionRow>, StoreError> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, SessionRow>(
                    "SELECT code, game_type, status, created_at FROM sessions
                     WHERE status = ? ORDER BY created_at DESC",
                )
                .bind(status)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, SessionRow>(
                    "SELECT code, game_type, status, created_at FROM sessions
                     ORDER BY created_at DESC",
                )
                .fetch_all(&self.pool)
                .await
            }
        };
        rows.map_err(StoreError::from_sqlx)
    }

    /// Updates a session's status.
    pub async fn update_session_status(&self, code: &str, status: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE sessions SET status = ? WHERE code = ?")
            .bind(status)
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(())
    }

    /// Upserts the serialized match snapshot for a session.
    pub async fn save_match_state(&self, code: &str, state: &[u8]) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO match_state (session_code, state, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(session_code) DO UPDATE
             SET state = excluded.state, updated_at = excluded.updated_at",
        )
        .bind(code)
        .bind(state)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(())
    }

    /// Fetches the serialized match snapshot for a session.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] when no snapshot was ever saved.
    pub async fn get_match_state(&self, code: &str) -> Result<Vec<u8>, StoreError> {
        sqlx::query_scalar::<_, Vec<u8>>("SELECT state FROM match_state WHERE session_code = ?")
            .bind(code)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    /// Upserts the roster snapshot (opaque JSON) for a session.
    pub async fn save_roster(&self, code: &str, roster: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO session_players (session_code, roster, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(session_code) DO UPDATE
             SET roster = excluded.roster, updated_at = excluded.updated_at",
        )
        .bind(code)
        .bind(roster)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(())
    }

    /// Fetches the roster snapshot for a session.
    pub async fn get_roster(&self, code: &str) -> Result<String, StoreError> {
        sqlx::query_scalar::<_, String>("SELECT roster FROM session_players WHERE session_code = ?")
            .bind(code)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    /// Deletes a session and its dependent rows.
    ///
    /// Dependents go first so a failure between statements leaves nothing
    /// dangling that a retry cannot clean up; deleting an absent session is
    /// a no-op.
    pub async fn delete_session(&self, code: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM match_state WHERE session_code = ?")
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        sqlx::query("DELETE FROM session_players WHERE session_code = ?")
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        sqlx::query("DELETE FROM sessions WHERE code = ?")
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(())
    }
}
