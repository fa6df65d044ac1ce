//! Error types for remote services and the user store.

use thiserror::Error;

/// Failure reported by a remote service.
///
/// Cloneable so one failure can be handed to every caller joined to a
/// deduplicated request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// No active session, or the credentials were rejected.
    #[error("unauthenticated: {message}")]
    Unauthenticated { message: String },

    /// The requested resource does not exist.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The caller may not access the resource.
    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    /// The request was malformed.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The service (or the host bridge) is not reachable.
    #[error("service unavailable: {message}")]
    Unavailable { message: String },

    /// Any other server-side failure.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ServiceError {
    /// Returns true if the failure means "there is no signed-in user".
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ServiceError::Unauthenticated { .. })
    }
}

/// Result type for remote service calls.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by the user store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Listing users failed.
    #[error("failed to fetch users: {0}")]
    FetchUsersFailed(#[source] ServiceError),

    /// Listing or reading user stats failed.
    #[error("failed to fetch user stats: {0}")]
    FetchUserStatsFailed(#[source] ServiceError),

    /// The operation needs a signed-in user.
    #[error("no current user")]
    NoCurrentUser,

    /// Any other service failure, passed through as-is.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl StoreError {
    /// Stable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::FetchUsersFailed(_) => "FETCH_USERS_FAILED",
            StoreError::FetchUserStatsFailed(_) => "FETCH_USER_STATS_FAILED",
            StoreError::NoCurrentUser => "NO_CURRENT_USER",
            StoreError::Service(_) => "SERVICE_ERROR",
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
