//! The `{type, payload}` frame envelope and its typed payloads.
//!
//! Every message on the persistent stream is one [`Frame`]. The `payload`
//! is always a structured JSON value — never a string containing more JSON.
//! Double-encoding is a classic client bug, so payload extraction goes
//! through [`Frame::payload_as`], which fails cleanly when the payload
//! arrives as a string instead of an object.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use parlor_game::{Action, PlayerResult};

use crate::{ProtocolError, SessionInfo};

/// Frame type tags used on the wire.
pub mod frame_type {
    /// Inbound: first message on every connection.
    pub const JOIN: &str = "join";
    /// Inbound: host requests the match to start.
    pub const START: &str = "start";
    /// Inbound: a player submits a move.
    pub const ACTION: &str = "action";
    /// Outbound: per-recipient state snapshot.
    pub const STATE: &str = "state";
    /// Outbound: targeted error report.
    pub const ERROR: &str = "error";
}

/// A single message on the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl Frame {
    /// Builds an outbound `state` frame for one recipient.
    pub fn state(payload: &StatePayload) -> Result<Self, ProtocolError> {
        Ok(Self {
            kind: frame_type::STATE.into(),
            payload: serde_json::to_value(payload).map_err(ProtocolError::Encode)?,
        })
    }

    /// Builds an outbound `error` frame.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: frame_type::ERROR.into(),
            // Serializing a {message: String} struct cannot fail.
            payload: serde_json::to_value(ErrorPayload {
                message: message.into(),
            })
            .unwrap_or(Value::Null),
        }
    }

    /// Serializes the frame to its wire bytes (UTF-8 JSON).
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(self).map_err(ProtocolError::Encode)
    }

    /// Parses a frame from wire bytes.
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }

    /// Extracts the payload as a typed struct.
    ///
    /// This is the single decode point for payloads. A payload that arrived
    /// as a JSON string (double-encoded) fails here because a string cannot
    /// deserialize into the expected object shape.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, ProtocolError> {
        serde_json::from_value(self.payload.clone()).map_err(ProtocolError::Decode)
    }
}

/// Payload of an inbound `join` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPayload {
    pub player_id: String,
}

/// Payload of an inbound `action` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPayload {
    pub action: Action,
}

/// Payload of an outbound `state` frame. `state` and `valid_actions` are
/// specific to the recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatePayload {
    pub session_info: SessionInfo,
    pub state: Value,
    pub valid_actions: Vec<Action>,
    /// Present only when the match is over.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<PlayerResult>>,
}

/// Payload of an outbound `error` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}
