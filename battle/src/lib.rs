//! Authoritative battle logic for pokeduel.
//!
//! This crate owns everything that decides what happens in a fight: the
//! type chart, the damage formula, the battle state machine and the
//! policies that play the computer side.
//!
//! # Overview
//!
//! ```text
//! pokeduel-protocol (wire format)
//!        │
//!        ▼
//! pokeduel-battle (domain types + state machine) ← THIS CRATE
//!        │
//!        ▼
//! pokeduel-server (websocket sync layer)
//! ```
//!
//! # Main Types
//!
//! - [`Type`] - Elemental types with effectiveness chart
//! - [`Combatant`], [`Move`] - Fighters and their attacks
//! - [`DamageFormula`] - Deterministic damage computation
//! - [`Battle`] - One battle's authoritative state
//! - [`MoveSelector`] - Pluggable opponent behaviour
//!
//! # Example Usage
//!
//! ```ignore
//! use pokeduel_battle::{engine, roster, Autopilot, Battle, RandomPolicy, Side};
//!
//! let player = roster::find("pikachu").unwrap().build()?;
//! let opponent = roster::find("charizard").unwrap().build()?;
//! let mut battle = Battle::new(player, opponent)?;
//! let mut policy = RandomPolicy::new();
//!
//! engine::submit_move(
//!     &mut battle,
//!     Side::Player,
//!     "Thunderbolt",
//!     Some(Autopilot::new(Side::Opponent, &mut policy)),
//! )?;
//! println!("{:?}", battle.snapshot());
//! ```

pub mod damage;
pub mod engine;
pub mod errors;
pub mod policy;
pub mod roster;
pub mod state;
pub mod types;

// Re-export main types at crate root for convenience
pub use damage::{DamageFormula, compute_damage};
pub use engine::{Autopilot, submit_move};
pub use errors::{BattleError, BattleResult, CombatantError};
pub use policy::{GreedyPolicy, MoveSelector, RandomPolicy, ScriptedPolicy};
pub use state::{Battle, TurnOutcome};
pub use types::{Combatant, Move, TYPE_CHART, Type};

// Re-export commonly used protocol types
pub use pokeduel_protocol::{BattleId, BattleMode, BattleSnapshot, BattleStatus, LogEntry, Side, Stats};
