//! Errors surfaced by a poll cycle.

use thiserror::Error;

/// Everything that can go wrong while fetching from the monitoring API.
///
/// The poller treats all variants the same way; the distinction exists for logs.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("malformed JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("backend reported failure")]
    Rejected,

    #[error("invalid endpoint: {0}")]
    Url(#[from] url::ParseError),

    /// The caller gave up on the request; not counted as a failure.
    #[error("request aborted")]
    Aborted,
}

impl FetchError {
    pub fn is_abort(&self) -> bool {
        matches!(self, FetchError::Aborted)
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
