//! Move reference data

use pokeduel_protocol::MoveSnapshot;

use super::pokemon_type::Type;
use crate::errors::CombatantError;

/// A named attack. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub name: String,

    pub move_type: Type,

    pub power: u32,

    /// Hit chance in percent (None = always hits)
    pub accuracy: Option<u8>,
}

impl Move {
    /// Create a move that always hits
    pub fn new(name: impl Into<String>, move_type: Type, power: u32) -> Self {
        Self {
            name: name.into(),
            move_type,
            power,
            accuracy: None,
        }
    }

    pub fn with_accuracy(mut self, accuracy: u8) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    /// Effective accuracy in percent
    pub fn accuracy(&self) -> u8 {
        self.accuracy.unwrap_or(100)
    }

    /// Build from catalog data
    pub fn from_protocol(snapshot: &MoveSnapshot) -> Result<Self, CombatantError> {
        if let Some(accuracy) = snapshot.accuracy
            && accuracy > 100
        {
            return Err(CombatantError::InvalidAccuracy {
                name: snapshot.name.clone(),
                accuracy,
            });
        }

        Ok(Self {
            name: snapshot.name.clone(),
            move_type: Type::from_protocol_lenient(&snapshot.move_type),
            power: snapshot.power,
            accuracy: snapshot.accuracy,
        })
    }

    pub fn to_protocol(&self) -> MoveSnapshot {
        MoveSnapshot {
            name: self.name.clone(),
            move_type: self.move_type.as_str().to_string(),
            power: self.power,
            accuracy: self.accuracy,
        }
    }
}
