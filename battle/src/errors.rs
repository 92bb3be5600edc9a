//! Error types for battle construction and state transitions

use pokeduel_protocol::{ErrorCode, Side};
use thiserror::Error;

/// A command the state machine refused. The battle is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BattleError {
    #[error("it is {current}'s turn, not {attempted}'s")]
    NotYourTurn { attempted: Side, current: Side },

    #[error("{combatant} does not know the move {move_name:?}")]
    UnknownMove { combatant: String, move_name: String },

    #[error("invalid battle state: {0}")]
    InvalidState(String),
}

impl BattleError {
    /// Wire error code for this failure
    pub fn code(&self) -> ErrorCode {
        match self {
            BattleError::NotYourTurn { .. } => ErrorCode::NotYourTurn,
            BattleError::UnknownMove { .. } => ErrorCode::UnknownMove,
            BattleError::InvalidState(_) => ErrorCode::InvalidState,
        }
    }
}

/// Catalog data that can not form a legal combatant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CombatantError {
    #[error("{0} has no types")]
    NoTypes(String),

    #[error("{0} knows no moves")]
    NoMoves(String),

    #[error("{0} has zero max HP")]
    ZeroMaxHp(String),

    #[error("{0} has already fainted")]
    Fainted(String),

    #[error("move {name} has accuracy {accuracy}, expected 0-100")]
    InvalidAccuracy { name: String, accuracy: u8 },
}

pub type BattleResult<T> = Result<T, BattleError>;
