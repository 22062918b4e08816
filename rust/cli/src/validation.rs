//! Input parsing for the interactive `play` command.

/// A command typed at the race prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceCommand {
    /// Apply the pending draw
    Draw,
    /// Start the next tournament round
    Next,
    /// Drop the series and start again from round 1
    Reset,
    Standings,
    Help,
}

/// Outcome of parsing one line typed at the race prompt.
#[derive(Debug, PartialEq)]
pub enum ParseResult {
    Command(RaceCommand),
    /// User entered quit command (q or quit)
    Quit,
    /// Invalid input with error message
    Invalid(String),
}

pub const HELP_TEXT: &str = "Commands: [enter]/d/draw = draw cards, n/next = next round, \
r/reset = new series, s/standings = points table, h/help = this text, q/quit = leave";

/// Parse a line typed at the race prompt (case-insensitive).
///
/// An empty line draws, so holding enter runs the race.
///
/// ```rust
/// # use derby_cli::validation::{parse_race_command, ParseResult, RaceCommand};
/// assert_eq!(parse_race_command(""), ParseResult::Command(RaceCommand::Draw));
/// assert_eq!(parse_race_command("Next"), ParseResult::Command(RaceCommand::Next));
/// assert_eq!(parse_race_command("q"), ParseResult::Quit);
/// match parse_race_command("gallop") {
///     ParseResult::Invalid(msg) => assert!(msg.contains("Unrecognized")),
///     _ => panic!("Expected Invalid"),
/// }
/// ```
pub fn parse_race_command(input: &str) -> ParseResult {
    let input = input.trim().to_lowercase();
    match input.as_str() {
        "" | "d" | "draw" => ParseResult::Command(RaceCommand::Draw),
        "n" | "next" => ParseResult::Command(RaceCommand::Next),
        "r" | "reset" => ParseResult::Command(RaceCommand::Reset),
        "s" | "standings" => ParseResult::Command(RaceCommand::Standings),
        "h" | "help" | "?" => ParseResult::Command(RaceCommand::Help),
        "q" | "quit" => ParseResult::Quit,
        other => ParseResult::Invalid(format!("Unrecognized command: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_map_to_the_same_command() {
        for (a, b) in [("d", "draw"), ("n", "next"), ("r", "reset"), ("s", "standings")] {
            assert_eq!(parse_race_command(a), parse_race_command(b));
        }
        assert_eq!(
            parse_race_command("?"),
            ParseResult::Command(RaceCommand::Help)
        );
    }

    #[test]
    fn input_is_trimmed_and_case_folded() {
        assert_eq!(
            parse_race_command("  DRAW  "),
            ParseResult::Command(RaceCommand::Draw)
        );
        assert_eq!(parse_race_command("QUIT"), ParseResult::Quit);
    }

    #[test]
    fn unknown_words_are_invalid() {
        assert!(matches!(parse_race_command("draw 2"), ParseResult::Invalid(_)));
        assert!(matches!(parse_race_command("bet"), ParseResult::Invalid(_)));
    }
}
