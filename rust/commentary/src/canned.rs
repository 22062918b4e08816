//! Crowd reactions picked at random, for running without any outside service.

use rand::seq::IndexedRandom;

use crate::{CommentaryError, CommentaryProvider, CommentaryRequest};

pub const CROWD_LINES: [&str; 3] = [
    "Cheers roll down from the grandstand!",
    "The race is reaching fever pitch!",
    "The tension at the track is electric!",
];

#[derive(Debug, Clone, Default)]
pub struct CannedProvider {
    lines: Vec<String>,
}

impl CannedProvider {
    pub fn new() -> Self {
        Self::with_lines(CROWD_LINES)
    }

    /// Uses `lines` instead of the built-in crowd reactions.
    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait::async_trait]
impl CommentaryProvider for CannedProvider {
    async fn comment(&self, _: &CommentaryRequest) -> Result<String, CommentaryError> {
        let mut rng = rand::rng();
        self.lines
            .choose(&mut rng)
            .cloned()
            .ok_or(CommentaryError::EmptyResponse)
    }

    fn name(&self) -> &str {
        "canned"
    }
}
