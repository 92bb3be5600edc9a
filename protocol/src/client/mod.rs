use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::ParseError;
use crate::server::{BattleId, BattleMode, Side};

const EVENT_NAMES: [&str; 5] = ["join", "leave", "attack", "surrender", "create"];

/// Events clients can send to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// {"type":"join","battleId":ID} - observe a battle, optionally claiming a side
    #[serde(rename_all = "camelCase")]
    Join {
        battle_id: BattleId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        side: Option<Side>,
    },

    /// {"type":"leave","battleId":ID}
    #[serde(rename_all = "camelCase")]
    Leave { battle_id: BattleId },

    /// {"type":"attack","battleId":ID,"moveName":NAME}
    #[serde(rename_all = "camelCase")]
    Attack {
        battle_id: BattleId,
        move_name: String,
    },

    /// {"type":"surrender","battleId":ID}
    #[serde(rename_all = "camelCase")]
    Surrender { battle_id: BattleId },

    /// {"type":"create","pokemon":NAME} - start a battle from the prefab roster
    #[serde(rename_all = "camelCase")]
    Create {
        pokemon: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        opponent: Option<String>,
        #[serde(default)]
        mode: BattleMode,
    },
}

impl ClientEvent {
    /// Battle this event targets, if any
    pub fn battle_id(&self) -> Option<BattleId> {
        match self {
            Self::Join { battle_id, .. }
            | Self::Leave { battle_id }
            | Self::Attack { battle_id, .. }
            | Self::Surrender { battle_id } => Some(*battle_id),
            Self::Create { .. } => None,
        }
    }

    /// Serialize to wire format
    pub fn to_wire_format(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Parse a text frame from a client into a ClientEvent
pub fn parse_client_event(frame: &str) -> Result<ClientEvent> {
    let frame = frame.trim();
    if frame.is_empty() {
        return Err(ParseError::EmptyMessage.into());
    }

    let value: serde_json::Value = serde_json::from_str(frame)
        .map_err(|e| ParseError::InvalidFormat(format!("not a JSON object: {}", e)))?;

    let event_name = value
        .get("type")
        .and_then(|t| t.as_str())
        .ok_or_else(|| ParseError::MissingField("type".to_string()))?;

    if !EVENT_NAMES.contains(&event_name) {
        return Err(ParseError::UnknownEvent(event_name.to_string()).into());
    }

    serde_json::from_value(value)
        .map_err(|e| ParseError::InvalidFormat(format!("invalid payload: {}", e)).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "6f1c1b52-8d3e-4f7a-9a8e-0c2b5d7e9f10";

    #[test]
    fn test_parse_join() {
        let frame = format!(r#"{{"type":"join","battleId":"{}"}}"#, ID);
        let event = parse_client_event(&frame).unwrap();

        assert_eq!(
            event,
            ClientEvent::Join {
                battle_id: ID.parse().unwrap(),
                side: None,
            }
        );
    }

    #[test]
    fn test_parse_join_with_side() {
        let frame = format!(r#"{{"type":"join","battleId":"{}","side":"opponent"}}"#, ID);
        let event = parse_client_event(&frame).unwrap();

        assert!(matches!(
            event,
            ClientEvent::Join {
                side: Some(Side::Opponent),
                ..
            }
        ));
    }

    #[test]
    fn test_parse_attack() {
        let frame = format!(
            r#"{{"type":"attack","battleId":"{}","moveName":"Thunderbolt"}}"#,
            ID
        );
        let event = parse_client_event(&frame).unwrap();

        assert_eq!(
            event,
            ClientEvent::Attack {
                battle_id: ID.parse().unwrap(),
                move_name: "Thunderbolt".to_string(),
            }
        );
        assert_eq!(event.battle_id(), Some(ID.parse().unwrap()));
    }

    #[test]
    fn test_parse_surrender() {
        let frame = format!(r#"{{"type":"surrender","battleId":"{}"}}"#, ID);
        let event = parse_client_event(&frame).unwrap();

        assert!(matches!(event, ClientEvent::Surrender { .. }));
    }

    #[test]
    fn test_parse_create_defaults_to_vs_computer() {
        let event = parse_client_event(r#"{"type":"create","pokemon":"pikachu"}"#).unwrap();

        assert_eq!(
            event,
            ClientEvent::Create {
                pokemon: "pikachu".to_string(),
                opponent: None,
                mode: BattleMode::VsComputer,
            }
        );
        assert_eq!(event.battle_id(), None);
    }

    #[test]
    fn test_parse_attack_missing_move() {
        let frame = format!(r#"{{"type":"attack","battleId":"{}"}}"#, ID);
        let err = parse_client_event(&frame).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ParseError>(),
            Some(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_unknown_event() {
        let err = parse_client_event(r#"{"type":"dance"}"#).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ParseError>(),
            Some(ParseError::UnknownEvent(name)) if name == "dance"
        ));
    }

    #[test]
    fn test_parse_missing_type() {
        let err = parse_client_event(r#"{"battleId":"x"}"#).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ParseError>(),
            Some(ParseError::MissingField(_))
        ));
    }

    #[test]
    fn test_parse_empty() {
        let err = parse_client_event("   ").unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ParseError>(),
            Some(ParseError::EmptyMessage)
        ));
    }

    #[test]
    fn test_wire_format_uses_camel_case_fields() {
        let event = ClientEvent::Attack {
            battle_id: ID.parse().unwrap(),
            move_name: "Ember".to_string(),
        };
        let wire = event.to_wire_format();

        assert!(wire.contains(r#""type":"attack""#));
        assert!(wire.contains(r#""moveName":"Ember""#));
        assert_eq!(parse_client_event(&wire).unwrap(), event);
    }
}
