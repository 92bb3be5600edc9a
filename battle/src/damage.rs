//! Damage formula
//!
//! ```text
//! attack_factor  = clamp(attack / attack_divisor, attack_min, attack_max)
//! defense_factor = clamp(1 - defense / defense_divisor, defense_min, defense_max)
//! type_factor    = effectiveness(move type, defender primary type)
//! damage         = max(1, floor(power * attack_factor * defense_factor * type_factor * base_multiplier))
//! ```
//!
//! Factors are `f64` and multiplied left to right; the only rounding is the
//! final floor, so results are reproducible across platforms.

use crate::types::{Combatant, Move};

/// Tunable constants of the damage formula
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageFormula {
    /// Overall battle pace
    pub base_multiplier: f64,
    pub attack_divisor: f64,
    pub attack_min: f64,
    pub attack_max: f64,
    pub defense_divisor: f64,
    pub defense_min: f64,
    pub defense_max: f64,
}

impl Default for DamageFormula {
    fn default() -> Self {
        Self {
            base_multiplier: 0.8,
            attack_divisor: 150.0,
            attack_min: 0.5,
            attack_max: 1.5,
            defense_divisor: 400.0,
            defense_min: 0.2,
            defense_max: 0.8,
        }
    }
}

impl DamageFormula {
    pub fn with_base_multiplier(mut self, base_multiplier: f64) -> Self {
        self.base_multiplier = base_multiplier;
        self
    }

    pub fn attack_factor(&self, attack: u32) -> f64 {
        (attack as f64 / self.attack_divisor).clamp(self.attack_min, self.attack_max)
    }

    pub fn defense_factor(&self, defense: u32) -> f64 {
        (1.0 - defense as f64 / self.defense_divisor).clamp(self.defense_min, self.defense_max)
    }

    /// Damage `attacker` deals to `defender` with `move_used`. Always at least 1.
    pub fn compute(&self, move_used: &Move, attacker: &Combatant, defender: &Combatant) -> u32 {
        let attack_factor = self.attack_factor(attacker.stats.attack);
        let defense_factor = self.defense_factor(defender.stats.defense);
        let type_factor = move_used.move_type.effectiveness_against(&defender.types);

        let raw = move_used.power as f64
            * attack_factor
            * defense_factor
            * type_factor
            * self.base_multiplier;

        // `as` saturates, so NaN or huge products stay in range
        (raw.floor() as u32).max(1)
    }
}

/// Damage using the default formula constants
pub fn compute_damage(move_used: &Move, attacker: &Combatant, defender: &Combatant) -> u32 {
    DamageFormula::default().compute(move_used, attacker, defender)
}
