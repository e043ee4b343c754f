//! Error types for the GitHub client

use thiserror::Error;

/// Errors building a [`crate::GithubClient`].
#[derive(Error, Debug)]
pub enum GithubError {
    /// Token cannot be sent as an HTTP header
    #[error("GitHub token contains characters not allowed in a header")]
    InvalidToken,

    /// Token is empty
    #[error("GitHub token is empty")]
    MissingToken,

    /// HTTP client construction failed
    #[error("HTTP client error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for GithubError {
    fn from(err: reqwest::Error) -> Self {
        GithubError::Http(err.to_string())
    }
}
