//! User repository abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use memos_domain::model::Role;

use super::error::RepositoryResult;

/// A persisted user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub email: String,
    pub nickname: String,
    pub avatar_url: String,
    /// bcrypt hash of the user's password.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredUser {
    /// Checks `password` against the stored hash. A malformed hash never
    /// matches.
    pub fn verify_password(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password_hash).unwrap_or(false)
    }
}

/// A user to create.
///
/// `password` is plaintext; implementations store only its bcrypt hash
/// in [`StoredUser::password_hash`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub role: Role,
    pub email: String,
    pub nickname: String,
    pub avatar_url: String,
    pub password: String,
}

/// A partial update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub id: i32,
    pub role: Option<Role>,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
}

impl UserUpdate {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.role.is_none()
            && self.email.is_none()
            && self.nickname.is_none()
            && self.avatar_url.is_none()
    }
}

/// Storage for local users.
///
/// Implementations must be thread-safe.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Looks up a user by username.
    async fn get_user_by_username(&self, username: &str) -> RepositoryResult<Option<StoredUser>>;

    /// The instance owner, if one exists.
    async fn find_host(&self) -> RepositoryResult<Option<StoredUser>>;

    /// Creates a user. Fails if the username is taken.
    async fn create_user(&self, user: NewUser) -> RepositoryResult<StoredUser>;

    /// Applies a partial update and returns the updated user.
    async fn update_user(&self, update: UserUpdate) -> RepositoryResult<StoredUser>;
}
