//! # Play Command
//!
//! Runs a race series one command at a time from stdin. Pressing enter draws
//! the next batch of cards; see [`HELP_TEXT`] for the rest.
//!
//! Refused actions (drawing after the round closed, asking for the next round
//! mid-race) print a warning and leave the race as it was.

use crate::config::Config;
use crate::error::CliError;
use crate::formatters::{format_leaderboard, format_race, format_result};
use crate::io_utils::read_stdin_line;
use crate::ui;
use crate::validation::{parse_race_command, ParseResult, RaceCommand, HELP_TEXT};
use derby_engine::race::RaceState;
use derby_engine::series::Series;
use std::io::{BufRead, Write};

/// Handle the play command: an interactive race series.
///
/// # Arguments
///
/// * `cfg` - Resolved and clamped configuration
/// * `out` - Output stream for the race board
/// * `err` - Error stream for warnings
/// * `stdin` - Input stream for race commands
///
/// # Returns
///
/// `Ok(())` when the user quits or input ends, `Err(CliError::Io)` on write failures.
pub fn handle_play_command(
    cfg: &Config,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<(), CliError> {
    let race = cfg.race_config();
    let mut series = Series::new(cfg.seed);
    writeln!(
        out,
        "play: horses={} track={} mode={} seed={}",
        race.horse_count,
        race.track_length,
        race.mode.as_str(),
        series.seed()
    )?;
    writeln!(out, "{}", HELP_TEXT)?;
    let state = series.start_series(race.clone()).clone();
    write!(out, "{}", format_race(&state))?;

    loop {
        write!(out, "derby> ")?;
        out.flush()?;
        let Some(line) = read_stdin_line(stdin) else {
            writeln!(out)?;
            break;
        };
        let command = match parse_race_command(&line) {
            ParseResult::Command(command) => command,
            ParseResult::Quit => break,
            ParseResult::Invalid(msg) => {
                ui::display_warning(err, &msg)?;
                continue;
            }
        };
        match command {
            RaceCommand::Draw => match series.draw().cloned() {
                Ok(state) => {
                    write!(out, "{}", format_race(&state))?;
                    if !state.is_playing() {
                        write_round_end(&series, &state, out)?;
                    }
                }
                Err(e) => ui::display_warning(err, &e.to_string())?,
            },
            RaceCommand::Next => match series.advance_round() {
                Ok(state) => write!(out, "{}", format_race(state))?,
                Err(e) => ui::display_warning(err, &e.to_string())?,
            },
            RaceCommand::Reset => {
                series.reset_series();
                writeln!(out, "New series.")?;
                let state = series.start_series(race.clone());
                write!(out, "{}", format_race(state))?;
            }
            RaceCommand::Standings => {
                if let Some(state) = series.state() {
                    write!(out, "{}", format_leaderboard(&state.horses))?;
                }
            }
            RaceCommand::Help => writeln!(out, "{}", HELP_TEXT)?,
        }
    }

    writeln!(out, "Thanks for watching.")?;
    Ok(())
}

fn write_round_end(series: &Series, state: &RaceState, out: &mut dyn Write) -> Result<(), CliError> {
    if series.is_finished() {
        write!(out, "{}", format_result(state))?;
        writeln!(out, "Type 'reset' for a new series or 'quit' to leave.")?;
    } else {
        write!(out, "{}", format_leaderboard(&state.horses))?;
        writeln!(
            out,
            "Type 'next' for round {}.",
            state.current_round + 1
        )?;
    }
    Ok(())
}
