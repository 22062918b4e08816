//! Simulation command: runs a whole series without input.
//!
//! Each turn prints one line (drawn horses and the commentary that came with
//! them) and each round prints its final board. `--quiet` keeps only the
//! result. The seed is always printed so a run can be replayed.

use crate::config::Config;
use crate::error::CliError;
use crate::formatters::{format_drawn, format_leaderboard, format_race, format_result};
use derby_engine::series::Series;
use std::io::Write;

/// Handle the sim command.
///
/// # Errors
///
/// Returns `CliError::Io` if writing to `out` fails and `CliError::Engine`
/// if the engine refuses to start the next round.
pub fn handle_sim_command(cfg: &Config, quiet: bool, out: &mut dyn Write) -> Result<(), CliError> {
    let mut series = Series::new(cfg.seed);
    series.start_series(cfg.race_config());
    let race = series.config();
    writeln!(
        out,
        "sim: horses={} track={} cards={} draw={} mode={} rounds={} seed={}",
        race.horse_count,
        race.track_length,
        race.cards_per_horse,
        race.draw_count,
        race.mode.as_str(),
        race.total_rounds,
        series.seed()
    )?;

    loop {
        if !quiet
            && let Some(state) = series.state()
        {
            writeln!(out, "{}", state.commentary)?;
        }
        while let Ok(state) = series.draw() {
            if !quiet {
                writeln!(
                    out,
                    "turn {:>3}: {:<40} {}",
                    state.current_turn,
                    format_drawn(state),
                    state.commentary
                )?;
            }
        }
        let Some(state) = series.state() else {
            break;
        };
        if !quiet {
            write!(out, "{}", format_race(state))?;
        }
        if series.is_finished() {
            write!(out, "{}", format_result(state))?;
            break;
        }
        if !quiet {
            write!(out, "{}", format_leaderboard(&state.horses))?;
        }
        series
            .advance_round()
            .map_err(|e| CliError::Engine(e.to_string()))?;
    }

    writeln!(out, "Seed: {}", series.seed())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use derby_engine::config::RaceMode;

    fn run(cfg: &Config, quiet: bool) -> String {
        let mut out = Vec::new();
        handle_sim_command(cfg, quiet, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn same_seed_prints_the_same_series() {
        let cfg = Config {
            seed: Some(77),
            ..Config::default()
        };
        assert_eq!(run(&cfg, false), run(&cfg, false));
    }

    #[test]
    fn tournament_runs_every_round() {
        let cfg = Config {
            seed: Some(5),
            rounds: 2,
            ..Config::default()
        };
        let text = run(&cfg, false);
        assert!(text.contains("Round 1/2"));
        assert!(text.contains("Round 2/2"));
        assert!(text.contains("Tournament finished."));
        assert!(text.contains("Champion: "));
        assert!(text.ends_with("Seed: 5\n"));
    }

    #[test]
    fn quiet_prints_only_the_result() {
        let cfg = Config {
            seed: Some(6),
            mode: RaceMode::Single,
            ..Config::default()
        };
        let text = run(&cfg, true);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("sim: horses=6"));
        assert_eq!(lines[1], "Podium:");
        assert_eq!(lines.len(), 1 + 1 + 3 + 1);
        assert!(!text.contains("turn "));
    }

    #[test]
    fn header_shows_the_settings_the_race_runs_with() {
        let cfg = Config {
            seed: Some(2),
            track: 5,
            cards: 99,
            mode: RaceMode::Single,
            ..Config::default()
        };
        let text = run(&cfg, true);
        assert!(
            text.starts_with("sim: horses=6 track=5 cards=10 draw=1 mode=single"),
            "unexpected header: {text}"
        );
    }
}
