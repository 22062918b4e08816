use serde::{Deserialize, Serialize};

/// Whether a series is a one-off race or a multi-round tournament.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceMode {
    /// One round; the series ends when it finishes.
    Single,
    /// `total_rounds` rounds with points carried between them.
    Tournament,
}

impl RaceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RaceMode::Single => "single",
            RaceMode::Tournament => "tournament",
        }
    }
}

/// Settings for a race series. Fixed for the lifetime of the series; changing
/// them means starting a new one.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Number of horses in the field
    pub horse_count: usize,
    /// Distance units from the gate to the finish line
    pub track_length: u32,
    /// Cards carrying each horse's id; kept within `[track_length, 2 * track_length]`
    pub cards_per_horse: u32,
    /// Cards taken off the deck per turn
    pub draw_count: usize,
    /// Single race or tournament
    pub mode: RaceMode,
    /// Rounds in a tournament (ignored in single mode)
    pub total_rounds: u32,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            horse_count: 6,
            track_length: 15,
            cards_per_horse: 20,
            draw_count: 1,
            mode: RaceMode::Tournament,
            total_rounds: 3,
        }
    }
}

impl RaceConfig {
    /// Returns a copy with every field pulled into its legal range.
    ///
    /// Out-of-range settings are corrected, never rejected: counts below one
    /// become one and `cards_per_horse` is clamped to
    /// `[track_length, 2 * track_length]`.
    ///
    /// ```
    /// use derby_engine::config::RaceConfig;
    ///
    /// let cfg = RaceConfig { track_length: 10, cards_per_horse: 3, ..RaceConfig::default() };
    /// assert_eq!(cfg.normalized().cards_per_horse, 10);
    /// ```
    pub fn normalized(&self) -> Self {
        let horse_count = self.horse_count.max(1);
        let track_length = self.track_length.max(1);
        Self {
            horse_count,
            track_length,
            cards_per_horse: clamp_cards(self.cards_per_horse, track_length),
            draw_count: self.draw_count.max(1),
            mode: self.mode,
            total_rounds: self.total_rounds.max(1),
        }
    }

    /// Changes the track length and re-clamps `cards_per_horse` to follow it.
    pub fn with_track_length(mut self, track_length: u32) -> Self {
        self.track_length = track_length.max(1);
        self.cards_per_horse = clamp_cards(self.cards_per_horse, self.track_length);
        self
    }

    /// Size of a freshly built deck.
    pub fn deck_size(&self) -> usize {
        self.horse_count * self.cards_per_horse as usize
    }

    /// Finishers needed to close a round: three, or the whole field if smaller.
    pub fn min_finishers(&self) -> usize {
        crate::race::MAX_FINISHERS.min(self.horse_count)
    }

    pub fn is_tournament(&self) -> bool {
        self.mode == RaceMode::Tournament
    }
}

fn clamp_cards(cards: u32, track_length: u32) -> u32 {
    cards.clamp(track_length, track_length.saturating_mul(2))
}
