//! # derby-engine: Card Derby Race Engine
//!
//! A deterministic card-driven horse race. Each horse owns a stack of cards in
//! a shared shuffled deck; every turn a batch of cards is drawn and each card
//! moves its horse one step. The round ends when enough horses cross the line
//! or the deck runs out. Rounds can be chained into a tournament with points.
//!
//! ## Core Modules
//!
//! - [`config`] - Race settings and their clamping rules
//! - [`horse`] - Horse identity, per-round progress and the name roster
//! - [`deck`] - Deck construction, seeded shuffling and tail draws
//! - [`commentary`] - Local commentary templates and selection rules
//! - [`race`] - The round state machine: look-ahead, draw resolution, ranking, scoring
//! - [`series`] - Tournament sequencing, reset and standings
//! - [`errors`] - Reasons a transition is refused
//!
//! ## Quick Start
//!
//! ```rust
//! use derby_engine::config::{RaceConfig, RaceMode};
//! use derby_engine::race::RaceStatus;
//! use derby_engine::series::Series;
//!
//! let mut series = Series::new(Some(42));
//! series.start_series(RaceConfig {
//!     horse_count: 3,
//!     track_length: 5,
//!     cards_per_horse: 5,
//!     draw_count: 1,
//!     mode: RaceMode::Tournament,
//!     total_rounds: 2,
//! });
//!
//! // The first draw is already prepared, commentary included
//! let pending = series.state().and_then(|s| s.pending_turn.clone());
//! assert!(pending.is_some());
//!
//! while series.draw().is_ok() {}
//! series.advance_round().expect("second round");
//! while series.draw().is_ok() {}
//!
//! assert_eq!(series.state().map(|s| s.status), Some(RaceStatus::TournamentFinished));
//! let podium = series.standings();
//! println!("Series winner: {}", podium[0].name);
//! ```
//!
//! ## Deterministic Races
//!
//! The random source is seedable; the same seed and configuration replay the
//! same deck order and the same commentary picks:
//!
//! ```rust
//! use derby_engine::config::RaceConfig;
//! use derby_engine::series::Series;
//!
//! let mut a = Series::new(Some(7));
//! let mut b = Series::new(Some(7));
//! assert_eq!(a.start_series(RaceConfig::default()), b.start_series(RaceConfig::default()));
//! ```

pub mod commentary;
pub mod config;
pub mod deck;
pub mod errors;
pub mod horse;
pub mod race;
pub mod series;
