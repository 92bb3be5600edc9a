//! Battle - the authoritative state of one fight

use chrono::Utc;
use pokeduel_protocol::{BattleId, BattleMode, BattleSnapshot, BattleStatus, LogEntry, Side};

use crate::damage::DamageFormula;
use crate::errors::{BattleError, BattleResult, CombatantError};
use crate::types::Combatant;

/// Result of one successfully applied move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The log entry appended for this move
    pub entry: LogEntry,

    /// Defender HP after the hit
    pub defender_hp: u32,

    /// Whether the hit ended the battle
    pub finished: bool,
}

/// One battle between a player-side and an opponent-side combatant.
///
/// All mutation goes through [`Battle::apply_move`] and
/// [`Battle::apply_surrender`]. A rejected command leaves every field as
/// it was.
#[derive(Debug, Clone, PartialEq)]
pub struct Battle {
    id: BattleId,

    mode: BattleMode,

    // === Progress ===
    status: BattleStatus,

    /// Side expected to act next
    current_turn: Side,

    /// Set exactly when status is Finished
    winner: Option<Side>,

    // === Sides ===
    player: Combatant,

    opponent: Combatant,

    /// One entry per applied move, oldest first
    log: Vec<LogEntry>,

    /// Constants fixed at creation
    formula: DamageFormula,
}

impl Battle {
    /// Bind two combatants to a fresh battle. The player moves first.
    ///
    /// Both combatants must still be standing.
    pub fn new(player: Combatant, opponent: Combatant) -> Result<Self, CombatantError> {
        for combatant in [&player, &opponent] {
            if combatant.is_fainted() {
                return Err(CombatantError::Fainted(combatant.name.clone()));
            }
        }

        Ok(Self {
            id: BattleId::new(),
            mode: BattleMode::default(),
            status: BattleStatus::Active,
            current_turn: Side::Player,
            winner: None,
            player,
            opponent,
            log: Vec::new(),
            formula: DamageFormula::default(),
        })
    }

    pub fn with_id(mut self, id: BattleId) -> Self {
        self.id = id;
        self
    }

    pub fn with_mode(mut self, mode: BattleMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_formula(mut self, formula: DamageFormula) -> Self {
        self.formula = formula;
        self
    }

    pub fn id(&self) -> BattleId {
        self.id
    }

    pub fn mode(&self) -> BattleMode {
        self.mode
    }

    pub fn status(&self) -> BattleStatus {
        self.status
    }

    pub fn current_turn(&self) -> Side {
        self.current_turn
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Check if the battle is still accepting commands
    pub fn is_active(&self) -> bool {
        self.status == BattleStatus::Active
    }

    /// Get the combatant fighting for a side
    pub fn combatant(&self, side: Side) -> &Combatant {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        }
    }

    /// Fails with `InvalidState` once the battle is finished
    pub fn ensure_active(&self) -> BattleResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(BattleError::InvalidState(format!(
                "battle {} is already finished",
                self.id
            )))
        }
    }

    /// Apply `side`'s move against the other side.
    ///
    /// On a knockout the battle finishes with `side` as winner and the turn
    /// stays where it is; otherwise the turn passes to the other side.
    pub fn apply_move(&mut self, side: Side, move_name: &str) -> BattleResult<TurnOutcome> {
        self.ensure_active()?;

        if side != self.current_turn {
            return Err(BattleError::NotYourTurn {
                attempted: side,
                current: self.current_turn,
            });
        }

        let attacker = self.combatant(side);
        let defender = self.combatant(side.other());
        let move_used = attacker
            .find_move(move_name)
            .ok_or_else(|| BattleError::UnknownMove {
                combatant: attacker.name.clone(),
                move_name: move_name.to_string(),
            })?;
        let damage = self.formula.compute(move_used, attacker, defender);

        let entry = LogEntry {
            turn: self.log.len() as u32 + 1,
            attacker: side,
            move_name: move_used.name.clone(),
            damage,
            timestamp: Utc::now(),
        };
        self.log.push(entry.clone());

        let defender_hp = self.combatant_mut(side.other()).take_damage(damage);

        tracing::debug!(
            battle_id = %self.id,
            side = %side,
            move_name = %entry.move_name,
            damage,
            defender_hp,
            "move applied"
        );

        let finished = defender_hp == 0;
        if finished {
            self.finish(side);
        } else {
            self.current_turn = side.other();
        }

        Ok(TurnOutcome {
            entry,
            defender_hp,
            finished,
        })
    }

    /// `side` gives up; the other side wins immediately, whoever's turn it is.
    ///
    /// No log entry is appended.
    pub fn apply_surrender(&mut self, side: Side) -> BattleResult<Side> {
        self.ensure_active()?;

        let winner = side.other();
        tracing::info!(battle_id = %self.id, side = %side, "side surrendered");
        self.finish(winner);
        Ok(winner)
    }

    fn finish(&mut self, winner: Side) {
        self.status = BattleStatus::Finished;
        self.winner = Some(winner);
        tracing::info!(
            battle_id = %self.id,
            winner = %winner,
            turns = self.log.len(),
            "battle finished"
        );
    }

    /// Full snapshot for observers
    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            id: self.id,
            mode: self.mode,
            status: self.status,
            current_turn: self.current_turn,
            winner: self.winner,
            player: self.player.to_protocol(),
            opponent: self.opponent.to_protocol(),
            battle_log: self.log.clone(),
        }
    }
}
