//! Race board and leaderboard formatters for terminal display.
//!
//! Pure functions from engine state to text. Lanes are drawn with Unicode
//! block characters where the terminal supports them and plain ASCII
//! otherwise.
//!
//! ```rust
//! use derby_engine::horse::Horse;
//! use derby_cli::formatters::format_lane;
//!
//! let horse = Horse::new(0);
//! let lane = format_lane(&horse, 10, 14);
//! assert!(lane.starts_with("Pink Lightning"));
//! assert!(lane.ends_with(" 0/10"));
//! ```

use derby_engine::horse::Horse;
use derby_engine::race::{RaceState, RaceStatus};
use derby_engine::series::standings;

/// Check if the terminal supports Unicode symbols by detecting modern terminal environments.
///
/// On Windows, checks for Windows Terminal (WT_SESSION), modern terminals (TERM_PROGRAM),
/// or VS Code (VSCODE_INJECTION). On Unix-like systems, assumes Unicode support.
pub fn supports_unicode() -> bool {
    if cfg!(windows) {
        std::env::var("WT_SESSION").is_ok()
            || std::env::var("TERM_PROGRAM").is_ok()
            || std::env::var("VSCODE_INJECTION").is_ok()
    } else {
        true
    }
}

fn glyphs() -> (char, char, char) {
    if supports_unicode() {
        ('█', '·', '┃')
    } else {
        ('#', '.', '|')
    }
}

/// Finishing place as shown next to a lane.
pub fn format_rank(rank: u8) -> String {
    match rank {
        1 => "1st".into(),
        2 => "2nd".into(),
        3 => "3rd".into(),
        n => format!("{}th", n),
    }
}

/// One lane: padded name, progress bar, finish post, then position.
pub fn format_lane(horse: &Horse, track_length: u32, name_width: usize) -> String {
    let (done, todo, post) = glyphs();
    let covered = horse.position.min(track_length) as usize;
    let mut bar = String::with_capacity(track_length as usize + 2);
    bar.extend(std::iter::repeat_n(done, covered));
    bar.extend(std::iter::repeat_n(todo, track_length as usize - covered));
    bar.push(post);
    let mut line = format!(
        "{:<width$} {} {}/{}",
        horse.name,
        bar,
        horse.position,
        track_length,
        width = name_width
    );
    if let Some(rank) = horse.finish_rank {
        line.push_str(&format!("  {}", format_rank(rank)));
    }
    line
}

/// Names of the horses on the drawn cards, in draw order.
pub fn format_drawn(state: &RaceState) -> String {
    state
        .last_drawn
        .iter()
        .map(|&id| state.horse(id).map_or("?", |h| h.name.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The whole board: header, last cards, lanes and the commentary line.
pub fn format_race(state: &RaceState) -> String {
    let mut out = String::new();
    let header = if state.config.is_tournament() {
        format!(
            "Round {}/{}",
            state.current_round, state.config.total_rounds
        )
    } else {
        "Single race".to_string()
    };
    out.push_str(&format!(
        "{} | turn {} | deck {} left\n",
        header,
        state.current_turn,
        state.deck_remaining()
    ));
    if !state.last_drawn.is_empty() {
        out.push_str(&format!("Drawn: {}\n", format_drawn(state)));
    }
    let width = state
        .horses
        .iter()
        .map(|h| h.name.chars().count())
        .max()
        .unwrap_or(0);
    for horse in &state.horses {
        out.push_str(&format_lane(horse, state.config.track_length, width));
        out.push('\n');
    }
    out.push_str(&format!("> {}\n", state.commentary));
    match state.status {
        RaceStatus::Playing => {}
        RaceStatus::RoundFinished => out.push_str("Round finished.\n"),
        RaceStatus::TournamentFinished => out.push_str("Tournament finished.\n"),
    }
    out
}

/// Points table, highest first. Ties keep field order.
pub fn format_leaderboard(horses: &[Horse]) -> String {
    let width = horses
        .iter()
        .map(|h| h.name.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = String::from("Standings:\n");
    for (place, horse) in standings(horses).iter().enumerate() {
        out.push_str(&format!(
            "{:>2}. {:<width$} {:>3} pts\n",
            place + 1,
            horse.name,
            horse.tournament_points,
            width = width
        ));
    }
    out
}

/// Closing lines once a series is over: the points table and champion for a
/// tournament, the podium for a single race.
pub fn format_result(state: &RaceState) -> String {
    if state.config.is_tournament() {
        let mut out = format_leaderboard(&state.horses);
        if let Some(champion) = standings(&state.horses).first() {
            out.push_str(&format!(
                "Champion: {} with {} points\n",
                champion.name, champion.tournament_points
            ));
        }
        return out;
    }
    let mut out = String::from("Podium:\n");
    for (place, id) in state.finishers.iter().enumerate() {
        if let Some(horse) = state.horse(*id) {
            out.push_str(&format!("{:>4} {}\n", format_rank(place as u8 + 1), horse.name));
        }
    }
    out
}
