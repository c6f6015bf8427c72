use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong inside a poll cycle, plus the one fatal
/// startup condition.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("homework API request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("homework API returned unexpected status {0}")]
    UnexpectedStatus(StatusCode),

    #[error("homework API returned a body that is not JSON: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("malformed homework API response: {0}")]
    MalformedResponse(&'static str),

    #[error("homework API response contains no homework data")]
    NoHomeworkData,

    #[error("work has not been taken for review yet")]
    IncompleteRecord,

    #[error("unknown homework status: {0}")]
    UnknownStatus(String),

    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),
}

impl RelayError {
    /// Only missing credentials stop the relay; everything else is reported
    /// and retried on the next cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RelayError::MissingCredentials(_))
    }
}
