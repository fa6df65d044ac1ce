//! Repository error types.

use thiserror::Error;

/// User repository errors.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No user with this id.
    #[error("user not found: {id}")]
    UserNotFound { id: i32 },

    /// A user with this username already exists.
    #[error("username already taken: {username}")]
    DuplicateUsername { username: String },

    /// The password could not be hashed.
    #[error("failed to generate password hash: {message}")]
    PasswordHash { message: String },

    /// Backend failure.
    #[error("user repository error: {message}")]
    Backend { message: String },
}

impl From<bcrypt::BcryptError> for RepositoryError {
    fn from(err: bcrypt::BcryptError) -> Self {
        RepositoryError::PasswordHash {
            message: err.to_string(),
        }
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
