//! In-memory user repository for testing and demo instances.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use memos_domain::model::Role;
use tracing::instrument;

use super::error::{RepositoryError, RepositoryResult};
use super::traits::{NewUser, StoredUser, UserRepository, UserUpdate};

/// In-memory implementation of [`UserRepository`].
///
/// Users are keyed by username, so the duplicate check and insert in
/// `create_user` happen under one shard lock. Passwords are stored as
/// bcrypt hashes.
#[derive(Debug)]
pub struct MemoryUserRepository {
    users: DashMap<String, StoredUser>,
    next_id: AtomicI32,
    hash_cost: u32,
}

impl Default for MemoryUserRepository {
    fn default() -> Self {
        Self::with_hash_cost(bcrypt::DEFAULT_COST)
    }
}

impl MemoryUserRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty repository hashing passwords with the given bcrypt
    /// cost (4 to 31).
    pub fn with_hash_cost(hash_cost: u32) -> Self {
        Self {
            users: DashMap::new(),
            next_id: AtomicI32::new(1),
            hash_cost,
        }
    }

    /// Creates an empty repository wrapped in Arc.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn get_user_by_username(&self, username: &str) -> RepositoryResult<Option<StoredUser>> {
        Ok(self.users.get(username).map(|user| user.clone()))
    }

    async fn find_host(&self) -> RepositoryResult<Option<StoredUser>> {
        Ok(self
            .users
            .iter()
            .find(|user| user.role == Role::Host)
            .map(|user| user.clone()))
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn create_user(&self, user: NewUser) -> RepositoryResult<StoredUser> {
        // Hash outside the shard lock
        let password_hash = bcrypt::hash(&user.password, self.hash_cost)?;

        match self.users.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(RepositoryError::DuplicateUsername {
                username: user.username,
            }),
            Entry::Vacant(entry) => {
                let now = Utc::now();
                let stored = StoredUser {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed),
                    username: user.username,
                    role: user.role,
                    email: user.email,
                    nickname: user.nickname,
                    avatar_url: user.avatar_url,
                    password_hash,
                    created_at: now,
                    updated_at: now,
                };
                entry.insert(stored.clone());
                Ok(stored)
            }
        }
    }

    #[instrument(skip(self, update), fields(id = update.id))]
    async fn update_user(&self, update: UserUpdate) -> RepositoryResult<StoredUser> {
        let mut user = self
            .users
            .iter_mut()
            .find(|user| user.id == update.id)
            .ok_or(RepositoryError::UserNotFound { id: update.id })?;

        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(nickname) = update.nickname {
            user.nickname = nickname;
        }
        if let Some(avatar_url) = update.avatar_url {
            user.avatar_url = avatar_url;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}
