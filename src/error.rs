// Errors raised while talking to an upstream backend. Aggregators never return these to
// their callers; they are turned into a fallback result with the message attached.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Connection failure, TLS failure or timeout.
    #[error("upstream unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned HTTP {0}")]
    Status(StatusCode),

    /// HTTP succeeded but the payload reports an internal failure.
    #[error("upstream reported failure: {0}")]
    Rejected(String),

    #[error("upstream payload could not be decoded: {0}")]
    Decode(String),
}

impl UpstreamError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, UpstreamError::Transport(e) if e.is_timeout())
    }
}

pub type UpstreamResult<T> = Result<T, UpstreamError>;
