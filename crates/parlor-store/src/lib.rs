//! Durable storage for Parlor sessions.
//!
//! A thin row store over SQLite (via `sqlx`). Three tables:
//!
//! - `sessions` — one row per session (code, game type, status, created_at).
//! - `match_state` — the serialized match snapshot, keyed by session code.
//!   The bytes are whatever the match's serializer produced; the store
//!   never parses them.
//! - `session_players` — a roster snapshot consulted on restore.
//!
//! Writes are serialized by SQLite; WAL journaling keeps concurrent reads
//! safe. The store is only touched through the session manager.

mod error;
mod store;

pub use error::StoreError;
pub use store::{SessionRow, Store};
