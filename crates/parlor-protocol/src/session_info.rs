//! Session lifecycle vocabulary shared by the wire, the runtime, and the
//! store.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The lifecycle state of a session.
///
/// Transitions form a DAG with no back-edges:
///
/// ```text
/// waiting → playing → finished
/// ```
///
/// - **Waiting**: accepting players; no match exists yet.
/// - **Playing**: the match is in progress.
/// - **Finished**: the match ended; the session lingers until evicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Waiting,
    Playing,
    Finished,
}

impl SessionStatus {
    /// The lowercase wire/store spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Playing => "playing",
            Self::Finished => "finished",
        }
    }

    /// Parses the lowercase spelling, as stored in session rows.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "waiting" => Some(Self::Waiting),
            "playing" => Some(Self::Playing),
            "finished" => Some(Self::Finished),
            _ => None,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A snapshot of session metadata, embedded in `state` frames and returned
/// by the REST surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub code: String,
    pub game_type: String,
    pub status: SessionStatus,
    pub players: Vec<String>,
    /// Identifier of the first player to join. Absent until someone does.
    pub host_id: Option<String>,
}
