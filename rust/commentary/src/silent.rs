use crate::{CommentaryError, CommentaryProvider, CommentaryRequest};

/// Provider that never answers; the local line is always kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProvider;

#[async_trait::async_trait]
impl CommentaryProvider for SilentProvider {
    async fn comment(&self, _: &CommentaryRequest) -> Result<String, CommentaryError> {
        Err(CommentaryError::Disabled)
    }

    fn name(&self) -> &str {
        "none"
    }
}
