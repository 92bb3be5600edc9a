//! Combatant state

use pokeduel_protocol::{CombatantSnapshot, Stats};

use super::moves::Move;
use super::pokemon_type::Type;
use crate::errors::CombatantError;

/// One side's fighter within a battle.
///
/// Copied from catalog data at battle creation and owned by that battle;
/// HP is the only field that changes while fighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combatant {
    pub name: String,

    /// Elemental types, primary first (never empty)
    pub types: Vec<Type>,

    pub stats: Stats,

    /// Current HP, 0..=stats.max_hp
    hp: u32,

    /// Known moves in catalog order (never empty)
    pub moves: Vec<Move>,
}

impl Combatant {
    /// Create a combatant at full HP
    pub fn new(
        name: impl Into<String>,
        types: Vec<Type>,
        stats: Stats,
        moves: Vec<Move>,
    ) -> Result<Self, CombatantError> {
        let name = name.into();

        if types.is_empty() {
            return Err(CombatantError::NoTypes(name));
        }
        if moves.is_empty() {
            return Err(CombatantError::NoMoves(name));
        }
        if stats.max_hp == 0 {
            return Err(CombatantError::ZeroMaxHp(name));
        }
        if let Some(bad) = moves.iter().find(|m| m.accuracy() > 100) {
            return Err(CombatantError::InvalidAccuracy {
                name: bad.name.clone(),
                accuracy: bad.accuracy(),
            });
        }

        Ok(Self {
            name,
            types,
            hp: stats.max_hp,
            stats,
            moves,
        })
    }

    /// Build from catalog data. Current HP is clamped to max HP.
    pub fn from_protocol(snapshot: &CombatantSnapshot) -> Result<Self, CombatantError> {
        let types = snapshot
            .types
            .iter()
            .map(|t| Type::from_protocol_lenient(t))
            .collect();
        let moves = snapshot
            .moves
            .iter()
            .map(Move::from_protocol)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(&snapshot.name, types, snapshot.stats, moves)?.with_hp(snapshot.hp))
    }

    pub fn to_protocol(&self) -> CombatantSnapshot {
        CombatantSnapshot {
            name: self.name.clone(),
            types: self.types.iter().map(|t| t.as_str().to_string()).collect(),
            stats: self.stats,
            hp: self.hp,
            moves: self.moves.iter().map(Move::to_protocol).collect(),
        }
    }

    /// Same combatant at a given HP (clamped to max HP)
    pub fn with_hp(mut self, hp: u32) -> Self {
        self.hp = hp.min(self.stats.max_hp);
        self
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    /// Look up a known move by exact name
    pub fn find_move(&self, name: &str) -> Option<&Move> {
        self.moves.iter().find(|m| m.name == name)
    }

    /// Subtract damage, flooring HP at 0. Returns the remaining HP.
    pub fn take_damage(&mut self, damage: u32) -> u32 {
        self.hp = self.hp.saturating_sub(damage);
        self.hp
    }
}
