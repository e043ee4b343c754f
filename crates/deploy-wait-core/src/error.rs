//! Error taxonomy for deployment resolution.

use thiserror::Error;

/// Errors deriving a commit from the triggering event.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("Unhandled event: {0}")]
    UnsupportedEvent(String),

    #[error("{event} event payload has no {field}")]
    MissingCommitSha { event: String, field: &'static str },

    #[error("invalid event payload: {0}")]
    InvalidPayload(String),
}

/// Faults reported by a deployment directory. Never retried by the resolver.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("deployment directory request failed: {0}")]
    Transport(String),

    #[error("deployment directory returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("could not decode deployment directory response: {0}")]
    Decode(String),
}

/// Result type for directory operations.
pub type DirectoryResult<T> = std::result::Result<T, DirectoryError>;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("repository must be in owner/name form, got {0:?}")]
pub struct RepositoryParseError(pub String);

/// Errors that end a wait before any outcome is reached.
#[derive(Debug, Error)]
pub enum WaitError {
    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Result type for a full wait.
pub type Result<T> = std::result::Result<T, WaitError>;
