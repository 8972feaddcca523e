//! Client error types and call outcomes.

use thiserror::Error;

/// What a failed call did to the remote store.
///
/// A successful call is [`Outcome::Applied`]. Errors are either
/// [`Outcome::NotApplied`] (the remote state is unchanged, so the caller may
/// compensate or retry freely) or [`Outcome::Unknown`] (the request may have
/// been applied and only the response was lost).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    NotApplied,
    Unknown,
}

/// Metadata service call errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A record for this id already exists.
    #[error("Metadata for resource ID {0} already exists.")]
    Conflict(i64),

    /// The service refused the request (4xx other than 409).
    #[error("song service rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// No connection could be established; nothing was sent.
    #[error("song service unreachable: {0}")]
    Unreachable(String),

    #[error("song service request timed out: {0}")]
    Timeout(String),

    /// The connection failed after the request may have been sent.
    #[error("song service transport error: {0}")]
    Transport(String),

    #[error("song service error ({status}): {body}")]
    Server { status: u16, body: String },

    #[error("malformed song service response: {0}")]
    MalformedResponse(String),

    /// The in-process store failed.
    #[error("metadata store error: {0}")]
    Store(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub fn outcome(&self) -> Outcome {
        match self {
            ClientError::Conflict(_)
            | ClientError::Rejected { .. }
            | ClientError::Unreachable(_)
            | ClientError::Config(_) => Outcome::NotApplied,
            ClientError::Timeout(_)
            | ClientError::Transport(_)
            | ClientError::Server { .. }
            | ClientError::MalformedResponse(_)
            | ClientError::Store(_) => Outcome::Unknown,
        }
    }

    /// Whether repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Unreachable(_)
                | ClientError::Timeout(_)
                | ClientError::Transport(_)
                | ClientError::Server { .. }
        )
    }
}

/// Result type for metadata service calls.
pub type ClientResult<T> = std::result::Result<T, ClientError>;
