//! Wire protocol for Parlor.
//!
//! This crate defines the "language" that clients and servers speak over
//! the persistent stream:
//!
//! - **Frame** ([`Frame`]) — the `{type, payload}` envelope every message
//!   travels in, plus typed payload structs for each frame kind.
//! - **Session vocabulary** ([`SessionStatus`], [`SessionInfo`]) — the
//!   lifecycle values embedded in every `state` frame.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding or
//!   decoding.
//!
//! The protocol layer sits between the socket (raw text frames) and the
//! session runtime (player context). It knows nothing about connections or
//! sessions — only how messages are shaped.

mod error;
mod frame;
mod session_info;

pub use error::ProtocolError;
pub use frame::{
    frame_type, ActionPayload, ErrorPayload, Frame, JoinPayload, StatePayload,
};
pub use session_info::{SessionInfo, SessionStatus};
