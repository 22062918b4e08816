//! # derby-commentary: Outside Commentary for Card Derby
//!
//! The race engine always has a local line ready. This crate is the seam for
//! asking something outside the engine for a better one: a text generator, a
//! script, or nothing at all. A provider answers with one line or fails, and a
//! failure simply means the local line stays on screen.
//!
//! ## Core Components
//!
//! - [`CommentaryProvider`] - Async trait every provider implements
//! - [`CommentaryRequest`] - What a provider is told about the race
//! - [`prompt`] - Turns a request into a single announcer prompt
//! - [`create_provider`] - Factory keyed by a provider spec string
//!
//! ## Quick Start
//!
//! ```rust
//! use derby_commentary::{create_provider, CommentaryRequest};
//! use derby_engine::config::RaceConfig;
//! use derby_engine::series::Series;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mut series = Series::new(Some(42));
//! let state = series.start_series(RaceConfig::default()).clone();
//!
//! let provider = create_provider("canned").expect("known provider");
//! let request = CommentaryRequest::from_state(&state);
//! let line = provider.comment(&request).await.expect("canned always answers");
//! assert!(!line.is_empty());
//! # });
//! ```
//!
//! ## Provider Specs
//!
//! - `"none"` - Declines every request
//! - `"canned"` - Random crowd reaction from a fixed pool
//! - `"command:<program> [args..]"` - Pipes the prompt to a program's stdin
//!   and uses the first non-empty line it prints

use std::time::Duration;

use derby_engine::horse::HorseId;
use derby_engine::race::{RaceState, TurnStamp};

pub mod canned;
pub mod command;
pub mod errors;
pub mod prompt;
pub mod silent;

pub use errors::CommentaryError;
pub use prompt::build_prompt;

/// Everything a provider is told about the turn it is commenting on.
///
/// Names are resolved up front so providers never need the engine types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentaryRequest {
    /// Turn the request was made for; results for any other turn are stale
    pub stamp: TurnStamp,
    /// `(name, position)` for every horse, in field order
    pub positions: Vec<(String, u32)>,
    /// Names of the horses whose cards were just drawn
    pub drawn: Vec<String>,
    /// Names of the finishers, in crossing order
    pub finishers: Vec<String>,
    /// Furthest horse, earlier horse on ties
    pub leader: Option<String>,
}

impl CommentaryRequest {
    /// Describes the most recent draw of `state`.
    pub fn from_state(state: &RaceState) -> Self {
        let name_of = |id: &HorseId| state.horse(*id).map(|h| h.name.clone());
        Self {
            stamp: state.stamp(),
            positions: state
                .horses
                .iter()
                .map(|h| (h.name.clone(), h.position))
                .collect(),
            drawn: state.last_drawn.iter().filter_map(name_of).collect(),
            finishers: state.finishers.iter().filter_map(name_of).collect(),
            leader: state.leader().map(|h| h.name.clone()),
        }
    }
}

/// Source of outside commentary lines.
///
/// Implementations must be cheap to share: the live session holds one behind
/// an `Arc` and may have a request in flight while the race moves on.
///
/// # Example Implementation
///
/// ```rust
/// use derby_commentary::{CommentaryError, CommentaryProvider, CommentaryRequest};
///
/// struct Echo;
///
/// #[async_trait::async_trait]
/// impl CommentaryProvider for Echo {
///     async fn comment(&self, request: &CommentaryRequest) -> Result<String, CommentaryError> {
///         request.leader.clone().ok_or(CommentaryError::EmptyResponse)
///     }
///
///     fn name(&self) -> &str {
///         "echo"
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait CommentaryProvider: Send + Sync {
    /// Produces one line for `request`, or an error meaning "keep the local line".
    async fn comment(&self, request: &CommentaryRequest) -> Result<String, CommentaryError>;

    /// Short identifier used in logs.
    fn name(&self) -> &str;
}

/// Creates a provider from its spec string (see the crate docs for the forms).
///
/// ```rust
/// use derby_commentary::create_provider;
///
/// assert_eq!(create_provider("none").unwrap().name(), "none");
/// assert!(create_provider("oracle").is_err());
/// ```
///
/// # Errors
///
/// [`CommentaryError::UnknownProvider`] for an unrecognized spec or a
/// `command:` spec without a program.
pub fn create_provider(spec: &str) -> Result<Box<dyn CommentaryProvider>, CommentaryError> {
    let spec = spec.trim();
    match spec {
        "" | "none" => Ok(Box::new(silent::SilentProvider)),
        "canned" => Ok(Box::new(canned::CannedProvider::new())),
        _ => match spec.strip_prefix("command:") {
            Some(cmdline) => command::CommandProvider::from_cmdline(cmdline)
                .map(|p| Box::new(p) as Box<dyn CommentaryProvider>)
                .ok_or_else(|| CommentaryError::UnknownProvider(spec.to_string())),
            None => Err(CommentaryError::UnknownProvider(spec.to_string())),
        },
    }
}

/// Asks `provider` for a line, giving up after `limit`.
///
/// # Errors
///
/// Whatever the provider returns, or [`CommentaryError::Timeout`] when it
/// takes longer than `limit`. The provider's future is dropped on timeout.
pub async fn request_commentary(
    provider: &dyn CommentaryProvider,
    request: &CommentaryRequest,
    limit: Duration,
) -> Result<String, CommentaryError> {
    tracing::debug!(
        provider = provider.name(),
        round = request.stamp.round,
        turn = request.stamp.turn,
        "requesting commentary"
    );
    match tokio::time::timeout(limit, provider.comment(request)).await {
        Ok(result) => result,
        Err(_) => Err(CommentaryError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use derby_engine::config::{RaceConfig, RaceMode};
    use derby_engine::series::Series;

    #[test]
    fn request_names_the_drawn_horses() {
        let mut series = Series::new(Some(3));
        series.start_series(RaceConfig {
            horse_count: 3,
            track_length: 5,
            cards_per_horse: 5,
            draw_count: 2,
            mode: RaceMode::Single,
            total_rounds: 1,
        });
        let state = series.draw().expect("draw").clone();
        let request = CommentaryRequest::from_state(&state);

        assert_eq!(request.stamp, state.stamp());
        assert_eq!(request.positions.len(), 3);
        assert_eq!(request.drawn.len(), 2);
        for (id, name) in state.last_drawn.iter().zip(&request.drawn) {
            assert_eq!(&state.horses[*id].name, name);
        }
        assert!(request.finishers.is_empty());
        assert_eq!(request.leader, state.leader().map(|h| h.name.clone()));
    }

    #[test]
    fn factory_knows_the_builtin_specs() {
        assert_eq!(create_provider("").unwrap().name(), "none");
        assert_eq!(create_provider("canned").unwrap().name(), "canned");
        assert_eq!(create_provider("command:cat").unwrap().name(), "command");
        assert!(matches!(
            create_provider("command:   "),
            Err(CommentaryError::UnknownProvider(_))
        ));
        assert!(matches!(
            create_provider("gemini"),
            Err(CommentaryError::UnknownProvider(s)) if s == "gemini"
        ));
    }
}
