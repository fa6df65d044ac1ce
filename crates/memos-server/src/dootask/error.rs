//! DooTask sign-in errors.

use thiserror::Error;

use crate::repository::RepositoryError;

/// Errors from exchanging a DooTask token for a local user.
#[derive(Debug, Error)]
pub enum DooTaskError {
    /// The token was blank.
    #[error("empty dootask token")]
    EmptyToken,

    /// The HTTP request failed or timed out.
    #[error("failed to request dootask api: {message}")]
    Request { message: String },

    /// The response body was not the expected JSON.
    #[error("failed to parse dootask response: {message}")]
    Decode { message: String },

    /// DooTask answered with a non-success `ret` code.
    #[error("{message}")]
    Api { ret: i64, message: String },

    /// The token does not belong to a signed-in DooTask user.
    #[error("dootask user is not logged in")]
    NotLoggedIn,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<reqwest::Error> for DooTaskError {
    fn from(err: reqwest::Error) -> Self {
        DooTaskError::Request {
            message: err.to_string(),
        }
    }
}

/// Result type for DooTask sign-in.
pub type DooTaskResult<T> = Result<T, DooTaskError>;
