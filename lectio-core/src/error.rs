//! Error types of the client, the sources and the chapter view.

use lectio_config::BaseUrlError;
use lectio_model::{ModelError, SessionId};
use thiserror::Error;

/// Failures talking to the course API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport failure, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer.
    #[error("request to {path} failed with status {status}: {body}")]
    Status {
        /// Request path.
        path: String,
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The body does not match the expected document.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL is unusable.
    #[error("invalid API base URL '{value}': {source}")]
    InvalidBaseUrl {
        /// Value as configured.
        value: String,
        /// Normalization failure.
        #[source]
        source: BaseUrlError,
    },
}

impl ApiError {
    /// The server answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

/// Result of a course API call.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Transient failures while querying a playback source.
///
/// None of these are fatal: the sampling tick that hit them is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// No player handle attached yet.
    #[error("player is not ready")]
    NotReady,

    /// The player call failed.
    #[error("player API unavailable: {0}")]
    Unavailable(String),

    /// The session ended and the player was destroyed.
    #[error("source has been released")]
    Released,
}

/// Errors surfaced to the chapter view.
#[derive(Error, Debug)]
pub enum GateError {
    /// The chapter has not been watched.
    #[error("watch the video before moving on")]
    Locked,

    /// Progress recording needs a signed-in learner.
    #[error("sign in to record progress")]
    NotSignedIn,

    /// The session task has stopped.
    #[error("session {0} is no longer active")]
    SessionClosed(SessionId),

    /// No chapter has been started.
    #[error("no active chapter session")]
    NoSession,

    /// The comment is blank after trimming.
    #[error("comment is empty")]
    EmptyComment,

    /// Course API failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Invalid model value.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result of a chapter view operation.
pub type Result<T> = std::result::Result<T, GateError>;
