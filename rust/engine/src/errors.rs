use thiserror::Error;

/// Why a transition was refused. The state it was called on is left untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("No race series has been started")]
    NoRaceInProgress,
    #[error("Round {round} is not being played")]
    RoundNotInProgress { round: u32 },
    #[error("No draw is prepared for turn {turn}")]
    NoPendingTurn { turn: u32 },
    #[error("Round {round} has not finished yet")]
    RoundNotFinished { round: u32 },
    #[error("Next round is only available in tournament mode")]
    NotTournament,
    #[error("All {total_rounds} rounds have been run")]
    SeriesComplete { total_rounds: u32 },
}
