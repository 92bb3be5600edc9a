mod battle;
mod battle_state;

pub use battle::{BattleId, BattleMode, BattleStatus, Side};
pub use battle_state::{BattleSnapshot, CombatantSnapshot, LogEntry, MoveSnapshot, Stats};

use crate::ParseError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Events the server pushes to a connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full battle state, replacing the receiver's view
    Snapshot(BattleSnapshot),

    /// A battle was created on behalf of this connection
    #[serde(rename_all = "camelCase")]
    Created { battle_id: BattleId },

    /// A command from this connection was rejected
    Error { code: ErrorCode, message: String },
}

impl ServerEvent {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }

    /// Serialize to wire format (one JSON object per text frame)
    pub fn to_wire_format(&self) -> String {
        // Every field is a plain string, number or enum, so encoding can not fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Closed set of error kinds reported to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotYourTurn,
    UnknownMove,
    /// Command against a finished, expired or unknown battle
    InvalidState,
    /// Frame could not be read or decoded
    TransportError,
    /// Battle creation named a combatant the roster does not have
    UnknownCombatant,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotYourTurn => "not_your_turn",
            ErrorCode::UnknownMove => "unknown_move",
            ErrorCode::InvalidState => "invalid_state",
            ErrorCode::TransportError => "transport_error",
            ErrorCode::UnknownCombatant => "unknown_combatant",
        }
    }
}

/// Parse a text frame from the server
pub fn parse_server_event(frame: &str) -> Result<ServerEvent> {
    let frame = frame.trim();
    if frame.is_empty() {
        return Err(ParseError::EmptyMessage.into());
    }

    serde_json::from_str(frame)
        .map_err(|e| ParseError::InvalidFormat(format!("invalid server event: {}", e)).into())
}
