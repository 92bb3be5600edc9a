//! Elemental types and the effectiveness chart

/// Elemental types (the 18 standard types plus an unknown "???" type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Type {
    Normal = 0,
    Fire = 1,
    Water = 2,
    Electric = 3,
    Grass = 4,
    Ice = 5,
    Fighting = 6,
    Poison = 7,
    Ground = 8,
    Flying = 9,
    Psychic = 10,
    Bug = 11,
    Rock = 12,
    Ghost = 13,
    Dragon = 14,
    Dark = 15,
    Steel = 16,
    Fairy = 17,
    /// Anything the chart has no row or column for; always neutral
    Unknown = 18,
}

impl Type {
    /// All 18 charted types
    pub const ALL: [Type; 18] = [
        Type::Normal,
        Type::Fire,
        Type::Water,
        Type::Electric,
        Type::Grass,
        Type::Ice,
        Type::Fighting,
        Type::Poison,
        Type::Ground,
        Type::Flying,
        Type::Psychic,
        Type::Bug,
        Type::Rock,
        Type::Ghost,
        Type::Dragon,
        Type::Dark,
        Type::Steel,
        Type::Fairy,
    ];

    /// Get type effectiveness against a single defending type.
    ///
    /// A lookup miss on either axis (an `Unknown` type) is neutral.
    pub fn effectiveness(&self, defender: Type) -> f64 {
        if *self == Type::Unknown || defender == Type::Unknown {
            return 1.0;
        }
        TYPE_CHART[*self as usize][defender as usize]
    }

    /// Get type effectiveness against a defender's type list.
    ///
    /// Only the primary (first) type participates; dual types are not
    /// stacked. An empty list is neutral.
    pub fn effectiveness_against(&self, defender_types: &[Type]) -> f64 {
        defender_types
            .first()
            .map(|primary| self.effectiveness(*primary))
            .unwrap_or(1.0)
    }

    /// Parse from catalog string (case-insensitive). `"???"` is `Unknown`.
    pub fn from_protocol(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .chain([Type::Unknown])
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
    }

    /// Parse from catalog string, mapping anything unrecognised to `Unknown`
    pub fn from_protocol_lenient(s: &str) -> Self {
        Self::from_protocol(s).unwrap_or(Type::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        NAMES[*self as usize]
    }
}

const NAMES: [&str; 19] = [
    "Normal", "Fire", "Water", "Electric", "Grass", "Ice", "Fighting", "Poison", "Ground",
    "Flying", "Psychic", "Bug", "Rock", "Ghost", "Dragon", "Dark", "Steel", "Fairy", "???",
];

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-neutral matchups of one attacking type
struct Matchup {
    attacker: Type,
    double: &'static [Type],
    half: &'static [Type],
    immune: &'static [Type],
}

const fn matchup(
    attacker: Type,
    double: &'static [Type],
    half: &'static [Type],
    immune: &'static [Type],
) -> Matchup {
    Matchup {
        attacker,
        double,
        half,
        immune,
    }
}

use Type::*;

const MATCHUPS: [Matchup; 18] = [
    matchup(Normal, &[], &[Rock, Steel], &[Ghost]),
    matchup(Fire, &[Grass, Ice, Bug, Steel], &[Fire, Water, Rock, Dragon], &[]),
    matchup(Water, &[Fire, Ground, Rock], &[Water, Grass, Dragon], &[]),
    matchup(Electric, &[Water, Flying], &[Electric, Grass, Dragon], &[Ground]),
    matchup(
        Grass,
        &[Water, Ground, Rock],
        &[Fire, Grass, Poison, Flying, Bug, Dragon, Steel],
        &[],
    ),
    matchup(Ice, &[Grass, Ground, Flying, Dragon], &[Fire, Water, Ice, Steel], &[]),
    matchup(
        Fighting,
        &[Normal, Ice, Rock, Dark, Steel],
        &[Poison, Flying, Psychic, Bug, Fairy],
        &[Ghost],
    ),
    matchup(Poison, &[Grass, Fairy], &[Poison, Ground, Rock, Ghost], &[Steel]),
    matchup(Ground, &[Fire, Electric, Poison, Rock, Steel], &[Grass, Bug], &[Flying]),
    matchup(Flying, &[Grass, Fighting, Bug], &[Electric, Rock, Steel], &[]),
    matchup(Psychic, &[Fighting, Poison], &[Psychic, Steel], &[Dark]),
    matchup(
        Bug,
        &[Grass, Psychic, Dark],
        &[Fire, Fighting, Poison, Flying, Ghost, Steel, Fairy],
        &[],
    ),
    matchup(Rock, &[Fire, Ice, Flying, Bug], &[Fighting, Ground, Steel], &[]),
    matchup(Ghost, &[Psychic, Ghost], &[Dark], &[Normal]),
    matchup(Dragon, &[Dragon], &[Steel], &[Fairy]),
    matchup(Dark, &[Psychic, Ghost], &[Fighting, Dark, Fairy], &[]),
    matchup(Steel, &[Ice, Rock, Fairy], &[Fire, Water, Electric, Steel], &[]),
    matchup(Fairy, &[Fighting, Dragon, Dark], &[Fire, Poison, Steel], &[]),
];

const fn fill(row: &mut [f64; 18], defenders: &[Type], value: f64) {
    let mut i = 0;
    while i < defenders.len() {
        row[defenders[i] as usize] = value;
        i += 1;
    }
}

const fn build_chart() -> [[f64; 18]; 18] {
    let mut chart = [[1.0; 18]; 18];
    let mut i = 0;
    while i < MATCHUPS.len() {
        let m = &MATCHUPS[i];
        let row = &mut chart[m.attacker as usize];
        fill(row, m.double, 2.0);
        fill(row, m.half, 0.5);
        fill(row, m.immune, 0.0);
        i += 1;
    }
    chart
}

/// Effectiveness multipliers, indexed `[attacker][defender]` in
/// [`Type::ALL`] order: 0.0, 0.5, 1.0 or 2.0.
pub static TYPE_CHART: [[f64; 18]; 18] = build_chart();
