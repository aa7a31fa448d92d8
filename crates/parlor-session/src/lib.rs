//! Session runtime for Parlor.
//!
//! This crate owns the in-memory heart of the service:
//!
//! 1. **Sessions** — one [`Session`] per short code: lifecycle status,
//!    player roster, per-player outbound mailboxes, and the current match.
//! 2. **The manager** — [`SessionManager`] creates, looks up, persists,
//!    restores, and evicts sessions. It is the only component that touches
//!    the store.
//!
//! # How it fits in the stack
//!
//! ```text
//! server (REST + websocket) → session (this crate) → store (SQLite)
//!                                   ↓
//!                              game contract
//! ```
//!
//! Connections never own session state. They rebind a player's mailbox on
//! reconnect and drain it to the socket; everything else lives here, behind
//! each session's rw-lock.

mod error;
mod manager;
mod session;

pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{mailbox, Mailbox, MailboxReceiver, Player, Session, SessionState, MAILBOX_CAPACITY};
