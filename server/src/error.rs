use pokeduel_battle::{BattleError, CombatantError};
use pokeduel_protocol::{BattleId, ErrorCode};
use thiserror::Error;

/// Why a single client command was refused.
///
/// Reported to the sending connection only; never broadcast.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error(transparent)]
    Battle(#[from] BattleError),

    #[error("battle {0} does not exist or has expired")]
    UnknownBattle(BattleId),

    #[error("no combatant named {name:?} (available: {available})")]
    UnknownCombatant { name: String, available: String },

    #[error("invalid combatant data: {0}")]
    Combatant(#[from] CombatantError),
}

impl CommandError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CommandError::Battle(err) => err.code(),
            CommandError::UnknownBattle(_) => ErrorCode::InvalidState,
            CommandError::UnknownCombatant { .. } | CommandError::Combatant(_) => {
                ErrorCode::UnknownCombatant
            }
        }
    }
}
