//! Domain types for battle state

mod moves;
mod pokemon;
mod pokemon_type;

pub use moves::Move;
pub use pokemon::Combatant;
pub use pokemon_type::{TYPE_CHART, Type};
