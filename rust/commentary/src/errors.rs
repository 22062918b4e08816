use std::time::Duration;

use thiserror::Error;

/// Why a provider produced no line. Callers treat every variant the same way:
/// the local line stays.
#[derive(Debug, Error)]
pub enum CommentaryError {
    #[error("Commentary provider is disabled")]
    Disabled,
    #[error("Commentary provider did not answer within {0:?}")]
    Timeout(Duration),
    #[error("Commentary provider I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Commentary provider exited unsuccessfully ({0})")]
    Failed(String),
    #[error("Commentary provider returned no text")]
    EmptyResponse,
    #[error("Unknown commentary provider: {0}")]
    UnknownProvider(String),
}
