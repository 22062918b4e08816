use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::commentary::IDLE_LINE;
use crate::config::RaceConfig;
use crate::errors::GameError;
use crate::horse::Horse;
use crate::race::{RaceState, RaceStatus, TurnStamp};

/// Runs a race series: starts rounds, carries horses and points between them
/// and knows when the series is over.
///
/// Owns the random source, so one seed reproduces the whole series. Every
/// intent either moves to a new [`RaceState`] or returns the reason it was
/// refused and keeps the current one.
///
/// ```
/// use derby_engine::config::{RaceConfig, RaceMode};
/// use derby_engine::race::RaceStatus;
/// use derby_engine::series::Series;
///
/// let mut series = Series::new(Some(9));
/// series.start_series(RaceConfig { mode: RaceMode::Single, ..RaceConfig::default() });
/// while series.draw().is_ok() {}
/// let state = series.state().expect("race in progress");
/// assert_eq!(state.status, RaceStatus::RoundFinished);
/// ```
#[derive(Debug)]
pub struct Series {
    seed: u64,
    rng: ChaCha20Rng,
    /// Bumped on every start and reset so stamps from an older series never match
    generation: u64,
    config: RaceConfig,
    state: Option<RaceState>,
}

impl Series {
    /// A series in the setup state. `None` picks a random seed.
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            seed,
            rng: ChaCha20Rng::seed_from_u64(seed),
            generation: 0,
            config: RaceConfig::default(),
            state: None,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Configuration of the current (or last) series, already normalized.
    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn state(&self) -> Option<&RaceState> {
        self.state.as_ref()
    }

    /// Copy of the current state for presentation.
    pub fn snapshot(&self) -> Option<RaceState> {
        self.state.clone()
    }

    /// Line to display: the race commentary, or the idle line during setup.
    pub fn commentary(&self) -> &str {
        self.state
            .as_ref()
            .map(|s| s.commentary.as_str())
            .unwrap_or(IDLE_LINE)
    }

    /// Discards whatever was running and starts round 1 with a fresh field.
    pub fn start_series(&mut self, config: RaceConfig) -> &RaceState {
        self.config = config.normalized();
        self.generation += 1;
        tracing::info!(
            generation = self.generation,
            seed = self.seed,
            mode = self.config.mode.as_str(),
            horses = self.config.horse_count,
            track = self.config.track_length,
            "series started"
        );
        let state = RaceState::start_round(&self.config, 1, self.generation, None, &mut self.rng);
        self.state.insert(state)
    }

    /// Applies the pending draw.
    pub fn draw(&mut self) -> Result<&RaceState, GameError> {
        let current = self.state.as_ref().ok_or(GameError::NoRaceInProgress)?;
        match current.resolve_turn(&mut self.rng) {
            Ok(next) => Ok(&*self.state.insert(next)),
            Err(e) => Err(rejected("draw", e)),
        }
    }

    /// Starts the next tournament round with the same horses.
    pub fn advance_round(&mut self) -> Result<&RaceState, GameError> {
        let current = self.state.as_ref().ok_or(GameError::NoRaceInProgress)?;
        if let Err(e) = check_can_advance(current) {
            return Err(rejected("advance_round", e));
        }
        let next = RaceState::start_round(
            &self.config,
            current.current_round + 1,
            self.generation,
            Some(&current.horses),
            &mut self.rng,
        );
        Ok(&*self.state.insert(next))
    }

    /// Replaces the displayed line of the current round if `stamp` still
    /// names its latest turn. Returns whether it was applied.
    pub fn apply_commentary(&mut self, stamp: TurnStamp, line: &str) -> bool {
        self.state
            .as_mut()
            .is_some_and(|state| state.apply_commentary(stamp, line))
    }

    /// Drops all state and returns to setup.
    pub fn reset_series(&mut self) {
        if self.state.take().is_some() {
            self.generation += 1;
            tracing::info!(generation = self.generation, "series reset");
        }
    }

    /// Horses by tournament points, highest first; ties keep field order.
    pub fn standings(&self) -> Vec<Horse> {
        self.state
            .as_ref()
            .map(|s| standings(&s.horses))
            .unwrap_or_default()
    }

    pub fn is_finished(&self) -> bool {
        match &self.state {
            Some(s) => match s.status {
                RaceStatus::TournamentFinished => true,
                RaceStatus::RoundFinished => !s.config.is_tournament(),
                RaceStatus::Playing => false,
            },
            None => false,
        }
    }
}

/// Stable sort of `horses` by points, descending.
pub fn standings(horses: &[Horse]) -> Vec<Horse> {
    let mut sorted = horses.to_vec();
    sorted.sort_by(|a, b| b.tournament_points.cmp(&a.tournament_points));
    sorted
}

fn check_can_advance(state: &RaceState) -> Result<(), GameError> {
    match state.status {
        RaceStatus::Playing => Err(GameError::RoundNotFinished {
            round: state.current_round,
        }),
        RaceStatus::TournamentFinished => Err(GameError::SeriesComplete {
            total_rounds: state.config.total_rounds,
        }),
        RaceStatus::RoundFinished if !state.config.is_tournament() => {
            Err(GameError::NotTournament)
        }
        RaceStatus::RoundFinished if state.current_round >= state.config.total_rounds => {
            Err(GameError::SeriesComplete {
                total_rounds: state.config.total_rounds,
            })
        }
        RaceStatus::RoundFinished => Ok(()),
    }
}

fn rejected(intent: &'static str, e: GameError) -> GameError {
    tracing::debug!(intent, reason = %e, "intent ignored");
    e
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RaceMode;

    fn quick(mode: RaceMode, rounds: u32) -> RaceConfig {
        RaceConfig {
            horse_count: 4,
            track_length: 5,
            cards_per_horse: 6,
            draw_count: 2,
            mode,
            total_rounds: rounds,
        }
    }

    fn run_round(series: &mut Series) {
        while series.draw().is_ok() {}
    }

    #[test]
    fn intents_before_start_are_refused() {
        let mut series = Series::new(Some(1));
        assert_eq!(series.draw().unwrap_err(), GameError::NoRaceInProgress);
        assert_eq!(
            series.advance_round().unwrap_err(),
            GameError::NoRaceInProgress
        );
        assert_eq!(series.commentary(), IDLE_LINE);
        assert!(series.standings().is_empty());
    }

    #[test]
    fn advance_requires_finished_round() {
        let mut series = Series::new(Some(3));
        series.start_series(quick(RaceMode::Tournament, 2));
        let before = series.snapshot();
        assert_eq!(
            series.advance_round().unwrap_err(),
            GameError::RoundNotFinished { round: 1 }
        );
        assert_eq!(series.snapshot(), before);
    }

    #[test]
    fn single_mode_never_advances() {
        let mut series = Series::new(Some(3));
        series.start_series(quick(RaceMode::Single, 5));
        run_round(&mut series);
        assert!(series.is_finished());
        assert_eq!(series.advance_round().unwrap_err(), GameError::NotTournament);
    }

    #[test]
    fn tournament_carries_points_between_rounds() {
        let mut series = Series::new(Some(21));
        series.start_series(quick(RaceMode::Tournament, 2));
        run_round(&mut series);
        let after_one: Vec<u32> = series
            .state()
            .unwrap()
            .horses
            .iter()
            .map(|h| h.tournament_points)
            .collect();
        assert_eq!(after_one.iter().sum::<u32>(), 17);

        let state = series.advance_round().expect("round 2");
        assert_eq!(state.current_round, 2);
        assert_eq!(state.status, RaceStatus::Playing);
        assert!(state.horses.iter().all(|h| h.position == 0 && h.finish_rank.is_none()));
        let carried: Vec<u32> = state.horses.iter().map(|h| h.tournament_points).collect();
        assert_eq!(carried, after_one);
    }

    #[test]
    fn reset_returns_to_setup_and_bumps_generation() {
        let mut series = Series::new(Some(4));
        series.start_series(quick(RaceMode::Single, 1));
        let generation = series.generation();
        series.reset_series();
        assert!(series.state().is_none());
        assert_eq!(series.generation(), generation + 1);
        let state = series.start_series(quick(RaceMode::Single, 1));
        assert_eq!(state.series, generation + 2);
    }

    #[test]
    fn standings_sort_is_stable() {
        let mut horses = Horse::field(4);
        horses[0].tournament_points = 5;
        horses[1].tournament_points = 10;
        horses[2].tournament_points = 5;
        horses[3].tournament_points = 0;
        let ids: Vec<usize> = standings(&horses).iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 0, 2, 3]);
    }

    #[test]
    fn commentary_from_an_older_series_is_dropped() {
        let mut series = Series::new(Some(6));
        series.start_series(quick(RaceMode::Single, 1));
        let old = series.state().unwrap().stamp();
        series.start_series(quick(RaceMode::Single, 1));
        assert!(!series.apply_commentary(old, "stale"));
        let current = series.state().unwrap().stamp();
        assert_eq!((old.round, old.turn), (current.round, current.turn));
        assert!(series.apply_commentary(current, "fresh"));
        assert_eq!(series.commentary(), "fresh");
    }

    #[test]
    fn config_reports_the_normalized_settings() {
        let mut series = Series::new(Some(8));
        series.start_series(RaceConfig {
            draw_count: 0,
            cards_per_horse: 40,
            ..quick(RaceMode::Tournament, 0)
        });
        let config = series.config();
        assert_eq!(config.draw_count, 1);
        assert_eq!(config.cards_per_horse, 10);
        assert_eq!(config.total_rounds, 1);
        assert_eq!(series.state().map(|s| &s.config), Some(config));
    }
}
