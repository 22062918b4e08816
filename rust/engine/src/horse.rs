use serde::{Deserialize, Serialize};

/// Identifier of a horse; also the value printed on its cards.
pub type HorseId = usize;

/// Names and body colors handed out in id order, wrapping after the tenth horse.
pub const ROSTER: [(&str, &str); 10] = [
    ("Pink Lightning", "#fbcfe8"),
    ("Azure Star", "#bae6fd"),
    ("Emerald Knight", "#bbf7d0"),
    ("Lavender Runner", "#e9d5ff"),
    ("Golden Sun Dash", "#fef08a"),
    ("Crimson Blaze", "#fca5a5"),
    ("Orange Storm", "#fed7aa"),
    ("Bronze Earth", "#d97706"),
    ("Silver Mist", "#cbd5e1"),
    ("Snow Dawn", "#f8fafc"),
];

/// A horse in the field.
///
/// Identity (`id`, `name`, `color`) and `tournament_points` survive from round
/// to round; `position`, `drawn_cards` and `finish_rank` belong to the current
/// round only.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Horse {
    pub id: HorseId,
    pub name: String,
    /// Display color (CSS hex)
    pub color: String,
    /// Distance covered this round, `0..=track_length`
    pub position: u32,
    /// Cards drawn for this horse this round, in draw order
    pub drawn_cards: Vec<HorseId>,
    /// 1-based finishing place, set once when the horse crosses the line
    pub finish_rank: Option<u8>,
    pub tournament_points: u32,
}

impl Horse {
    pub fn new(id: HorseId) -> Self {
        let (name, color) = ROSTER[id % ROSTER.len()];
        Self {
            id,
            name: name.to_string(),
            color: color.to_string(),
            position: 0,
            drawn_cards: Vec::new(),
            finish_rank: None,
            tournament_points: 0,
        }
    }

    /// Builds `count` fresh horses with ids `0..count`.
    pub fn field(count: usize) -> Vec<Horse> {
        (0..count).map(Horse::new).collect()
    }

    /// Same horse at the starting gate: identity and points kept, round fields cleared.
    pub fn at_gate(&self) -> Self {
        Self {
            position: 0,
            drawn_cards: Vec::new(),
            finish_rank: None,
            ..self.clone()
        }
    }

    pub fn has_finished(&self) -> bool {
        self.finish_rank.is_some()
    }
}
