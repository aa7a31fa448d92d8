//! Game contract for Parlor.
//!
//! This crate defines the boundary between the session runtime and the games
//! it hosts:
//!
//! - **Traits** ([`Game`], [`Match`]) — what a game module implements. The
//!   runtime drives matches exclusively through these operations and never
//!   inspects action payloads or state shapes.
//! - **Types** ([`GameInfo`], [`Action`], [`PlayerResult`]) — the shared
//!   vocabulary that crosses the boundary (and, serialized, the wire).
//! - **Registry** ([`Registry`]) — the name → game mapping the server and
//!   session manager look games up in.

mod contract;
mod error;
mod registry;
mod types;

pub use contract::{Game, Match};
pub use error::GameError;
pub use registry::Registry;
pub use types::{Action, GameInfo, MatchConfig, PlayerResult};
