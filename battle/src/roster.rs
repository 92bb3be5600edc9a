//! Prefab combatants for quick battles

use pokeduel_protocol::Stats;
use rand::seq::SliceRandom;

use crate::errors::CombatantError;
use crate::types::{Combatant, Move, Type};

/// A predefined combatant entry
#[derive(Debug, Clone)]
pub struct PrefabCombatant {
    pub name: &'static str,
    pub types: &'static [Type],
    pub stats: Stats,
    pub moves: &'static [(&'static str, Type, u32)],
}

impl PrefabCombatant {
    /// Build a fresh, full-HP combatant from this entry
    pub fn build(&self) -> Result<Combatant, CombatantError> {
        Combatant::new(
            self.name,
            self.types.to_vec(),
            self.stats,
            self.moves
                .iter()
                .map(|(name, move_type, power)| Move::new(*name, *move_type, *power))
                .collect(),
        )
    }
}

const fn stats(max_hp: u32, attack: u32, defense: u32, speed: u32) -> Stats {
    Stats {
        max_hp,
        attack,
        defense,
        speed,
    }
}

pub static ROSTER: [PrefabCombatant; 6] = [
    PrefabCombatant {
        name: "Pikachu",
        types: &[Type::Electric],
        stats: stats(100, 55, 40, 90),
        moves: &[
            ("Thunder Shock", Type::Electric, 40),
            ("Quick Attack", Type::Normal, 40),
            ("Thunderbolt", Type::Electric, 90),
            ("Iron Tail", Type::Steel, 100),
        ],
    },
    PrefabCombatant {
        name: "Charizard",
        types: &[Type::Fire, Type::Flying],
        stats: stats(100, 84, 78, 100),
        moves: &[
            ("Flamethrower", Type::Fire, 90),
            ("Dragon Claw", Type::Dragon, 80),
            ("Air Slash", Type::Flying, 75),
            ("Fire Blast", Type::Fire, 110),
        ],
    },
    PrefabCombatant {
        name: "Blastoise",
        types: &[Type::Water],
        stats: stats(110, 83, 100, 78),
        moves: &[
            ("Water Gun", Type::Water, 40),
            ("Surf", Type::Water, 90),
            ("Ice Beam", Type::Ice, 90),
            ("Bite", Type::Dark, 60),
        ],
    },
    PrefabCombatant {
        name: "Venusaur",
        types: &[Type::Grass, Type::Poison],
        stats: stats(110, 82, 83, 80),
        moves: &[
            ("Vine Whip", Type::Grass, 45),
            ("Razor Leaf", Type::Grass, 55),
            ("Sludge Bomb", Type::Poison, 90),
            ("Body Slam", Type::Normal, 85),
        ],
    },
    PrefabCombatant {
        name: "Gengar",
        types: &[Type::Ghost, Type::Poison],
        stats: stats(90, 65, 60, 110),
        moves: &[
            ("Shadow Ball", Type::Ghost, 80),
            ("Sludge Bomb", Type::Poison, 90),
            ("Dark Pulse", Type::Dark, 80),
            ("Lick", Type::Ghost, 30),
        ],
    },
    PrefabCombatant {
        name: "Snorlax",
        types: &[Type::Normal],
        stats: stats(160, 110, 65, 30),
        moves: &[
            ("Body Slam", Type::Normal, 85),
            ("Crunch", Type::Dark, 80),
            ("Earthquake", Type::Ground, 100),
            ("Headbutt", Type::Normal, 70),
        ],
    },
];

/// Look up a prefab entry by name (case-insensitive)
pub fn find(name: &str) -> Option<&'static PrefabCombatant> {
    ROSTER.iter().find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}

/// Pick a random entry, avoiding `exclude` when any other entry exists
pub fn random_opponent(exclude: &str) -> &'static PrefabCombatant {
    let others: Vec<&PrefabCombatant> = ROSTER
        .iter()
        .filter(|p| !p.name.eq_ignore_ascii_case(exclude.trim()))
        .collect();
    others
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(&ROSTER[0])
}

/// Names of every prefab entry
pub fn names() -> impl Iterator<Item = &'static str> {
    ROSTER.iter().map(|p| p.name)
}
