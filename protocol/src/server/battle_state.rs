//! Battle snapshot types
//!
//! A snapshot is the full battle aggregate as observers see it. Every
//! snapshot replaces the receiver's local view entirely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::battle::{BattleId, BattleMode, BattleStatus, Side};

/// Full state of one battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleSnapshot {
    pub id: BattleId,

    pub mode: BattleMode,

    pub status: BattleStatus,

    /// Side expected to act next
    pub current_turn: Side,

    /// Set only once the battle is finished
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Side>,

    pub player: CombatantSnapshot,

    pub opponent: CombatantSnapshot,

    pub battle_log: Vec<LogEntry>,
}

impl BattleSnapshot {
    /// Get the combatant fighting for a side
    pub fn combatant(&self, side: Side) -> &CombatantSnapshot {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    /// Check if the battle has ended
    pub fn is_finished(&self) -> bool {
        self.status == BattleStatus::Finished
    }
}

/// One side's fighter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatantSnapshot {
    pub name: String,

    /// Elemental types, primary first
    pub types: Vec<String>,

    pub stats: Stats,

    /// Current HP (0..=stats.max_hp)
    pub hp: u32,

    pub moves: Vec<MoveSnapshot>,
}

/// Base stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
}

/// A known move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSnapshot {
    pub name: String,

    #[serde(rename = "type")]
    pub move_type: String,

    pub power: u32,

    /// Hit chance in percent; absent means the move always hits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<u8>,
}

/// One applied turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// 1-based turn number
    pub turn: u32,

    pub attacker: Side,

    #[serde(rename = "move")]
    pub move_name: String,

    pub damage: u32,

    pub timestamp: DateTime<Utc>,
}
