//! Command-line surface of the `derby` binary.

use clap::{Args, Parser, Subcommand, ValueEnum};
use derby_engine::config::RaceMode;

#[derive(Parser, Debug)]
#[command(name = "derby", version, about = "Card Derby: a card-driven horse race")]
pub struct DerbyCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a series interactively, one draw per command
    Play {
        #[command(flatten)]
        race: RaceArgs,
    },
    /// Run a whole series at once and print the result
    Sim {
        #[command(flatten)]
        race: RaceArgs,
        /// Print only the final result
        #[arg(long)]
        quiet: bool,
    },
    /// Watch a series draw itself on the auto-draw timer
    Auto {
        #[command(flatten)]
        race: RaceArgs,
        /// Seconds between draws (0.5 to 5, in half-second steps)
        #[arg(long)]
        interval: Option<f64>,
        /// Commentary provider: none, canned or command:<program>
        #[arg(long)]
        provider: Option<String>,
        /// Print events as JSON lines instead of the race view
        #[arg(long)]
        json: bool,
    },
    /// Show the resolved configuration and where each value came from
    Cfg,
}

/// Race settings that can be given on the command line. Anything left out
/// falls back to the environment, the config file, then the defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct RaceArgs {
    /// Seed for a reproducible series
    #[arg(long)]
    pub seed: Option<u64>,
    /// Horses in the field (2 to 10)
    #[arg(long)]
    pub horses: Option<usize>,
    /// Track length (5 to 30)
    #[arg(long)]
    pub track: Option<u32>,
    /// Cards per horse (track to 2 x track)
    #[arg(long)]
    pub cards: Option<u32>,
    /// Cards drawn per turn (1 to 5)
    #[arg(long)]
    pub draw: Option<usize>,
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
    /// Rounds in a tournament (1 to 10)
    #[arg(long)]
    pub rounds: Option<u32>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Single,
    Tournament,
}

impl From<ModeArg> for RaceMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Single => RaceMode::Single,
            ModeArg::Tournament => RaceMode::Tournament,
        }
    }
}
