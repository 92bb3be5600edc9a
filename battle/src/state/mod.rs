//! Authoritative battle state machine

mod battle;

pub use battle::{Battle, TurnOutcome};
