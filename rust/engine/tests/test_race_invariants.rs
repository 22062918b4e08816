//! Invariant sweep: many seeds and shapes, every reachable state checked.

use derby_engine::config::{RaceConfig, RaceMode};
use derby_engine::race::{RaceState, RaceStatus};
use derby_engine::series::Series;

fn check(state: &RaceState, previous: Option<&RaceState>) {
    let cfg = &state.config;

    // cards are conserved
    assert_eq!(
        state.deck_remaining() + state.cards_drawn(),
        state.horses.len() * cfg.cards_per_horse as usize
    );

    for horse in &state.horses {
        assert!(horse.position <= cfg.track_length);
        let own = horse.drawn_cards.len() as u32;
        assert!(horse.drawn_cards.iter().all(|&c| c == horse.id));
        assert!(horse.position <= own);
        if horse.finish_rank.is_none() {
            assert_eq!(horse.position, own.min(cfg.track_length));
        }
        if let Some(prev) = previous.and_then(|p| p.horse(horse.id)) {
            assert!(horse.position >= prev.position, "position went backwards");
            if prev.finish_rank.is_some() {
                assert_eq!(horse.finish_rank, prev.finish_rank, "rank changed");
            }
        }
    }

    // a round never leaves a finished status
    if let Some(prev) = previous {
        assert!(
            prev.status == RaceStatus::Playing || state.status == prev.status,
            "status went from {:?} to {:?}",
            prev.status,
            state.status
        );
    }

    // finisher cap and forced end
    assert!(state.finishers.len() <= state.min_finishers());
    if state.finishers.len() == state.min_finishers() {
        assert_ne!(state.status, RaceStatus::Playing);
    }

    // ranks are 1..=n in finisher order
    for (i, id) in state.finishers.iter().enumerate() {
        let horse = state.horse(*id).expect("finisher exists");
        assert_eq!(horse.finish_rank, Some(i as u8 + 1));
        assert_eq!(horse.position, cfg.track_length);
    }
    let ranked = state.horses.iter().filter(|h| h.finish_rank.is_some()).count();
    assert_eq!(ranked, state.finishers.len());

    // look-ahead only while playing
    if state.status != RaceStatus::Playing {
        assert!(state.pending_turn.is_none());
    } else {
        let pending = state.pending_turn.as_ref().expect("playing state has a draw ready");
        assert!(!pending.drawn_ids.is_empty());
        assert!(pending.drawn_ids.len() <= cfg.draw_count);
    }
}

#[test]
fn invariants_hold_for_every_reachable_state() {
    let shapes = [
        (2, 5, 5, 1),
        (3, 5, 10, 2),
        (6, 15, 20, 1),
        (10, 8, 12, 5),
        (4, 1, 2, 3),
        (1, 3, 6, 2),
    ];
    for (seed, &(horses, track, cards, draw)) in (0u64..20).flat_map(|s| shapes.iter().map(move |sh| (s, sh))) {
        let mut series = Series::new(Some(seed));
        series.start_series(RaceConfig {
            horse_count: horses,
            track_length: track,
            cards_per_horse: cards,
            draw_count: draw,
            mode: RaceMode::Tournament,
            total_rounds: 2,
        });
        loop {
            let mut previous = series.snapshot().expect("started");
            check(&previous, None);
            while let Ok(next) = series.draw() {
                check(next, Some(&previous));
                previous = next.clone();
            }
            assert_ne!(previous.status, RaceStatus::Playing);
            assert!(series.draw().is_err());
            check(&series.snapshot().expect("still there"), Some(&previous));
            if series.advance_round().is_err() {
                break;
            }
        }
        assert_eq!(
            series.state().map(|s| s.status),
            Some(RaceStatus::TournamentFinished)
        );
    }
}

#[test]
fn turn_counter_is_monotonic() {
    let mut series = Series::new(Some(99));
    series.start_series(RaceConfig::default());
    let mut last = 0;
    while let Ok(state) = series.draw() {
        assert_eq!(state.current_turn, last + 1);
        last = state.current_turn;
    }
}
