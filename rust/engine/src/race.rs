use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::commentary::{round_start_line, select_commentary, CommentaryContext, CommentaryEvent};
use crate::config::RaceConfig;
use crate::deck::Deck;
use crate::errors::GameError;
use crate::horse::{Horse, HorseId};

/// Places that earn a finish rank (and points).
pub const MAX_FINISHERS: usize = 3;

/// Tournament points for a finishing place; unranked horses score nothing.
pub fn points_for_rank(rank: Option<u8>) -> u32 {
    match rank {
        Some(1) => 10,
        Some(2) => 5,
        Some(3) => 2,
        _ => 0,
    }
}

/// Where a round is in its lifecycle. Only moves forward within a round.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceStatus {
    /// Draws are being taken
    Playing,
    /// The round closed; a tournament may start the next one
    RoundFinished,
    /// The last tournament round closed
    TournamentFinished,
}

/// The next draw, worked out ahead of time so the draw action is instant and
/// the line shown with it describes exactly these cards.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PendingTurn {
    pub drawn_ids: Vec<HorseId>,
    pub commentary: String,
}

/// Identifies one turn of one round of one series. Asynchronous work is tagged
/// with the stamp it was started for and dropped if the race has moved on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TurnStamp {
    pub series: u64,
    pub round: u32,
    pub turn: u32,
}

/// Authoritative state of the round being run.
///
/// Transitions never mutate in place: each returns a new state built from the
/// previous one, so a refused transition leaves the caller's copy as it was.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RaceState {
    pub config: RaceConfig,
    pub horses: Vec<Horse>,
    pub deck: Deck,
    /// Draws applied this round
    pub current_turn: u32,
    /// 1-based round number
    pub current_round: u32,
    pub status: RaceStatus,
    /// Horse ids in crossing order, at most [`MAX_FINISHERS`]
    pub finishers: Vec<HorseId>,
    /// Cards applied by the most recent draw
    pub last_drawn: Vec<HorseId>,
    pub pending_turn: Option<PendingTurn>,
    /// Line currently on display
    pub commentary: String,
    /// Generation of the series this round belongs to
    pub series: u64,
}

impl RaceState {
    /// Puts the field at the gate for round `round` and prepares the first draw.
    ///
    /// With `carry_over` the given horses keep their identity and points;
    /// otherwise a fresh field is built from `config`.
    pub fn start_round<R: Rng + ?Sized>(
        config: &RaceConfig,
        round: u32,
        series: u64,
        carry_over: Option<&[Horse]>,
        rng: &mut R,
    ) -> RaceState {
        let config = config.normalized();
        let horses: Vec<Horse> = match carry_over {
            Some(previous) => previous.iter().map(Horse::at_gate).collect(),
            None => Horse::field(config.horse_count),
        };
        let deck = Deck::shuffled(horses.iter().map(|h| h.id), config.cards_per_horse, rng);

        tracing::info!(
            series,
            round,
            horses = horses.len(),
            deck = deck.remaining(),
            "round started"
        );

        let state = RaceState {
            config,
            horses,
            deck,
            current_turn: 0,
            current_round: round,
            status: RaceStatus::Playing,
            finishers: Vec::new(),
            last_drawn: Vec::new(),
            pending_turn: None,
            commentary: round_start_line(round),
            series,
        };
        state.prepare_next_turn(rng)
    }

    /// Computes the look-ahead for the next draw without touching the deck.
    ///
    /// Returns the state unchanged when the round is not being played, the
    /// deck is empty or enough horses have already finished.
    pub fn prepare_next_turn<R: Rng + ?Sized>(&self, rng: &mut R) -> RaceState {
        let mut next = self.clone();
        if self.status != RaceStatus::Playing
            || self.deck.is_empty()
            || self.finishers.len() >= self.min_finishers()
        {
            return next;
        }

        let drawn_ids = self.deck.peek(self.config.draw_count);
        let mut projected = self.horses.clone();
        let mut projected_finishers = self.finishers.clone();
        apply_draw(
            &mut projected,
            &mut projected_finishers,
            &drawn_ids,
            self.config.track_length,
        );
        let commentary = select_commentary(
            &CommentaryContext {
                drawn: &drawn_ids,
                horses: &projected,
                finishers: &self.finishers,
                track_length: self.config.track_length,
                event: CommentaryEvent::Draw,
            },
            rng,
        );

        tracing::debug!(
            round = self.current_round,
            turn = self.current_turn + 1,
            drawn = ?drawn_ids,
            "next draw prepared"
        );

        next.pending_turn = Some(PendingTurn {
            drawn_ids,
            commentary,
        });
        next
    }

    /// Commits the pending draw: the cards leave the deck, horses move, ranks
    /// and points are settled, and the next look-ahead is prepared.
    ///
    /// # Errors
    ///
    /// [`GameError::RoundNotInProgress`] unless the round is being played,
    /// [`GameError::NoPendingTurn`] when there is nothing prepared. The pending
    /// turn is consumed by a successful call, so it is never applied twice.
    pub fn resolve_turn<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RaceState, GameError> {
        if self.status != RaceStatus::Playing {
            return Err(GameError::RoundNotInProgress {
                round: self.current_round,
            });
        }
        let mut next = self.clone();
        let pending = next.pending_turn.take().ok_or(GameError::NoPendingTurn {
            turn: self.current_turn + 1,
        })?;

        let drawn = next.deck.draw(pending.drawn_ids.len());
        debug_assert_eq!(drawn, pending.drawn_ids);
        let track_length = next.config.track_length;
        apply_draw(&mut next.horses, &mut next.finishers, &drawn, track_length);
        next.current_turn += 1;
        next.last_drawn = drawn;
        next.commentary = pending.commentary;

        if next.finishers.len() >= next.min_finishers() || next.deck.is_empty() {
            next.finish_round(rng);
            Ok(next)
        } else {
            Ok(next.prepare_next_turn(rng))
        }
    }

    fn finish_round<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.status = RaceStatus::RoundFinished;
        self.pending_turn = None;
        self.commentary = select_commentary(
            &CommentaryContext {
                drawn: &[],
                horses: &self.horses,
                finishers: &self.finishers,
                track_length: self.config.track_length,
                event: CommentaryEvent::RoundEnd,
            },
            rng,
        );
        for horse in &mut self.horses {
            horse.tournament_points += points_for_rank(horse.finish_rank);
        }
        if self.config.is_tournament() && self.current_round >= self.config.total_rounds {
            self.status = RaceStatus::TournamentFinished;
        }

        tracing::info!(
            round = self.current_round,
            turns = self.current_turn,
            finishers = ?self.finishers,
            deck = self.deck.remaining(),
            status = ?self.status,
            "round finished"
        );
    }

    /// Replaces the displayed line if `stamp` still names the current turn.
    /// Returns whether it was applied.
    pub fn apply_commentary(&mut self, stamp: TurnStamp, line: impl Into<String>) -> bool {
        if stamp != self.stamp() {
            return false;
        }
        self.commentary = line.into();
        true
    }

    pub fn stamp(&self) -> TurnStamp {
        TurnStamp {
            series: self.series,
            round: self.current_round,
            turn: self.current_turn,
        }
    }

    pub fn min_finishers(&self) -> usize {
        MAX_FINISHERS.min(self.horses.len())
    }

    pub fn deck_remaining(&self) -> usize {
        self.deck.remaining()
    }

    pub fn horse(&self, id: HorseId) -> Option<&Horse> {
        self.horses.iter().find(|h| h.id == id)
    }

    /// Furthest horse; the earlier horse wins ties.
    pub fn leader(&self) -> Option<&Horse> {
        self.horses.iter().rev().max_by_key(|h| h.position)
    }

    pub fn is_playing(&self) -> bool {
        self.status == RaceStatus::Playing
    }

    /// Total cards drawn this round across all horses.
    pub fn cards_drawn(&self) -> usize {
        self.horses.iter().map(|h| h.drawn_cards.len()).sum()
    }
}

/// Moves horses for one batch of cards. Horses are visited in field order, so
/// two horses crossing on the same draw are ranked by their position in the field.
fn apply_draw(
    horses: &mut [Horse],
    finishers: &mut Vec<HorseId>,
    drawn: &[HorseId],
    track_length: u32,
) {
    for horse in horses.iter_mut() {
        let moves = drawn.iter().filter(|&&id| id == horse.id).count();
        if moves == 0 {
            continue;
        }
        horse
            .drawn_cards
            .extend(std::iter::repeat_n(horse.id, moves));
        // a ranked horse has locked its result; its cards are spent for nothing
        if horse.has_finished() {
            continue;
        }
        horse.position = horse
            .position
            .saturating_add(moves as u32)
            .min(track_length);
        if horse.position >= track_length && finishers.len() < MAX_FINISHERS {
            finishers.push(horse.id);
            horse.finish_rank = Some(finishers.len() as u8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RaceMode;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn config(horses: usize, track: u32, draw: usize) -> RaceConfig {
        RaceConfig {
            horse_count: horses,
            track_length: track,
            cards_per_horse: track,
            draw_count: draw,
            mode: RaceMode::Single,
            total_rounds: 1,
        }
    }

    #[test]
    fn points_mapping() {
        assert_eq!(points_for_rank(Some(1)), 10);
        assert_eq!(points_for_rank(Some(2)), 5);
        assert_eq!(points_for_rank(Some(3)), 2);
        assert_eq!(points_for_rank(Some(4)), 0);
        assert_eq!(points_for_rank(None), 0);
    }

    #[test]
    fn start_round_prepares_first_draw() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let state = RaceState::start_round(&config(4, 6, 2), 1, 0, None, &mut rng);
        assert_eq!(state.status, RaceStatus::Playing);
        assert_eq!(state.current_turn, 0);
        assert_eq!(state.deck_remaining(), 24);
        let pending = state.pending_turn.as_ref().expect("pending draw");
        assert_eq!(pending.drawn_ids, state.deck.peek(2));
        assert!(state.commentary.starts_with("Round 1"));
    }

    #[test]
    fn simultaneous_crossing_ranks_by_field_order() {
        let mut horses = Horse::field(3);
        horses[0].position = 4;
        horses[2].position = 4;
        let mut finishers = Vec::new();
        apply_draw(&mut horses, &mut finishers, &[2, 0], 5);
        assert_eq!(finishers, vec![0, 2]);
        assert_eq!(horses[0].finish_rank, Some(1));
        assert_eq!(horses[2].finish_rank, Some(2));
    }

    #[test]
    fn finished_horse_keeps_position_but_records_card() {
        let mut horses = Horse::field(2);
        horses[0].position = 5;
        horses[0].finish_rank = Some(1);
        let mut finishers = vec![0];
        apply_draw(&mut horses, &mut finishers, &[0, 0], 5);
        assert_eq!(horses[0].position, 5);
        assert_eq!(horses[0].drawn_cards, vec![0, 0]);
        assert_eq!(finishers, vec![0]);
    }

    #[test]
    fn fourth_crosser_gets_no_rank() {
        let mut horses = Horse::field(4);
        for h in &mut horses {
            h.position = 2;
        }
        let mut finishers = Vec::new();
        apply_draw(&mut horses, &mut finishers, &[3, 2, 1, 0], 3);
        assert_eq!(finishers, vec![0, 1, 2]);
        assert_eq!(horses[3].position, 3);
        assert_eq!(horses[3].finish_rank, None);
    }

    #[test]
    fn pending_commentary_calls_the_finish() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let mut state = RaceState::start_round(&config(2, 3, 1), 1, 0, None, &mut rng);
        let next_id = *state.deck.cards().last().expect("card");
        state.horses[next_id].position = 2;
        state.horses[next_id].drawn_cards = vec![next_id; 2];
        let state = state.prepare_next_turn(&mut rng);
        let pending = state.pending_turn.expect("pending");
        assert!(pending
            .commentary
            .contains(&state.horses[next_id].name));
        assert!(crate::commentary::FINISH_TEMPLATES
            .iter()
            .any(|t| t.replace("{name}", &state.horses[next_id].name) == pending.commentary));
    }

    #[test]
    fn stale_commentary_is_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let state = RaceState::start_round(&config(3, 4, 1), 1, 7, None, &mut rng);
        let old = state.stamp();
        let mut next = state.resolve_turn(&mut rng).expect("draw");
        assert!(!next.apply_commentary(old, "late"));
        let current = next.stamp();
        assert_eq!(current.turn, 1);
        assert!(next.apply_commentary(current, "fresh"));
        assert_eq!(next.commentary, "fresh");
    }

    #[test]
    fn leader_prefers_earlier_horse_on_tie() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let mut state = RaceState::start_round(&config(3, 4, 1), 1, 0, None, &mut rng);
        state.horses[1].position = 2;
        state.horses[2].position = 2;
        assert_eq!(state.leader().map(|h| h.id), Some(1));
    }
}
