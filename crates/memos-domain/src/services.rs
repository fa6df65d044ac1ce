//! Remote service traits used by the user store.
//!
//! Each trait stands in for one generated RPC client. Implementations must
//! be thread-safe (Send + Sync) because store operations run on Tokio tasks.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ServiceResult;
use crate::model::{
    Credentials, FieldMask, Shortcut, User, UserNotification, UserSetting, UserStats,
};

/// Session operations.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Returns the signed-in user.
    ///
    /// Implementations may report "no session" either as `Ok(None)` or as
    /// an `Unauthenticated` error; callers treat both the same.
    async fn get_current_session(&self) -> ServiceResult<Option<User>>;

    /// Signs in with the given credentials.
    async fn create_session(&self, credentials: Credentials) -> ServiceResult<User>;
}

/// User, setting, notification and stats operations.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Gets a user by resource name. Accepts `users/{id}` and
    /// `users/{username}`.
    async fn get_user(&self, name: &str) -> ServiceResult<User>;

    async fn list_users(&self) -> ServiceResult<Vec<User>>;

    async fn update_user(&self, user: User, update_mask: FieldMask) -> ServiceResult<User>;

    async fn delete_user(&self, name: &str) -> ServiceResult<()>;

    async fn get_user_setting(&self, name: &str) -> ServiceResult<UserSetting>;

    async fn update_user_setting(
        &self,
        setting: UserSetting,
        update_mask: FieldMask,
    ) -> ServiceResult<UserSetting>;

    /// Lists every setting of the user `parent`.
    async fn list_user_settings(&self, parent: &str) -> ServiceResult<Vec<UserSetting>>;

    async fn list_user_notifications(&self, parent: &str) -> ServiceResult<Vec<UserNotification>>;

    async fn update_user_notification(
        &self,
        notification: UserNotification,
        update_mask: FieldMask,
    ) -> ServiceResult<UserNotification>;

    async fn delete_user_notification(&self, name: &str) -> ServiceResult<()>;

    /// Lists stats of all users visible to the caller.
    async fn list_all_user_stats(&self) -> ServiceResult<Vec<UserStats>>;

    /// Gets stats of one user, by user resource name.
    async fn get_user_stats(&self, name: &str) -> ServiceResult<UserStats>;
}

/// Shortcut operations.
#[async_trait]
pub trait ShortcutService: Send + Sync {
    async fn list_shortcuts(&self, parent: &str) -> ServiceResult<Vec<Shortcut>>;
}

/// Instance profile operations.
#[async_trait]
pub trait InstanceService: Send + Sync {
    /// Whether the locally known instance profile has an owner.
    fn has_owner(&self) -> bool;

    /// Re-reads the instance profile from the server.
    async fn refresh_profile(&self) -> ServiceResult<()>;
}

/// Bridge to the DooTask host when running as an embedded micro-app.
///
/// Outside DooTask, [`app_ready`](Self::app_ready) fails.
#[async_trait]
pub trait MicroAppHost: Send + Sync {
    /// Waits for the host to be ready.
    async fn app_ready(&self) -> ServiceResult<()>;

    async fn is_micro_app(&self) -> ServiceResult<bool>;

    /// DooTask user id, 0 when nobody is signed in.
    async fn user_id(&self) -> ServiceResult<u64>;

    async fn user_token(&self) -> ServiceResult<String>;
}

/// Host bridge for a standalone deployment: never embedded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMicroAppHost;

#[async_trait]
impl MicroAppHost for NoMicroAppHost {
    async fn app_ready(&self) -> ServiceResult<()> {
        Err(crate::error::ServiceError::Unavailable {
            message: "not running inside DooTask".to_string(),
        })
    }

    async fn is_micro_app(&self) -> ServiceResult<bool> {
        Ok(false)
    }

    async fn user_id(&self) -> ServiceResult<u64> {
        Ok(0)
    }

    async fn user_token(&self) -> ServiceResult<String> {
        Ok(String::new())
    }
}

/// Handles to every remote service the store talks to.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserService>,
    pub shortcuts: Arc<dyn ShortcutService>,
    pub instance: Arc<dyn InstanceService>,
}
