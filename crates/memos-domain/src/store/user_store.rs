//! User store operations.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::dedup::{RequestDeduplicator, RequestKey};
use crate::error::{StoreError, StoreResult};
use crate::model::{
    build_user_setting_name, FieldMask, GeneralSetting, User, UserNotification, UserSetting,
    UserSettingKey, UserSettingValue, UserStats,
};
use crate::services::Services;

use super::state::{next_state_id, UserState};

/// Client-side user store.
///
/// Cheap to clone; clones share state, services and in-flight requests.
/// Bulk reads (`fetch_users`, `fetch_user_stats`) are deduplicated: while
/// one is pending, identical calls join it instead of issuing another
/// request.
#[derive(Clone)]
pub struct UserStore {
    inner: Arc<Inner>,
}

struct Inner {
    state: watch::Sender<UserState>,
    services: Services,
    users_flight: RequestDeduplicator<Vec<User>, StoreError>,
    stats_flight: RequestDeduplicator<(), StoreError>,
}

impl UserStore {
    /// Creates an empty store backed by the given services.
    pub fn new(services: Services) -> Self {
        let (state, _) = watch::channel(UserState {
            stats_state_id: next_state_id(),
            ..Default::default()
        });
        Self {
            inner: Arc::new(Inner {
                state,
                services,
                users_flight: RequestDeduplicator::new(),
                stats_flight: RequestDeduplicator::new(),
            }),
        }
    }

    /// The remote services this store talks to.
    pub fn services(&self) -> &Services {
        &self.inner.services
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> UserState {
        self.inner.state.borrow().clone()
    }

    /// Reads the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&UserState) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    /// Subscribes to state changes. The receiver sees every mutation made
    /// after this call.
    pub fn subscribe(&self) -> watch::Receiver<UserState> {
        self.inner.state.subscribe()
    }

    /// Resource name of the signed-in user.
    pub fn current_user(&self) -> Option<String> {
        self.read(|state| state.current_user.clone())
    }

    fn update(&self, f: impl FnOnce(&mut UserState)) {
        self.inner.state.send_modify(f);
    }

    fn require_current_user(&self) -> StoreResult<String> {
        self.current_user().ok_or(StoreError::NoCurrentUser)
    }

    // Session

    /// Makes `user` the signed-in user and resets the user map to it.
    pub fn set_current_user(&self, user: User) {
        self.update(|state| {
            state.current_user = Some(user.name.clone());
            state.users_by_name.clear();
            state.users_by_name.insert(user.name.clone(), user);
        });
    }

    /// Forgets the signed-in user, its general setting and all cached users.
    pub fn clear_session(&self) {
        self.update(|state| {
            state.current_user = None;
            state.general_setting = None;
            state.users_by_name.clear();
        });
    }

    // Users

    /// Cached user by resource name.
    pub fn get_user_by_name(&self, name: &str) -> Option<User> {
        self.read(|state| state.users_by_name.get(name).cloned())
    }

    /// Returns the cached user, fetching and caching it if needed.
    pub async fn get_or_fetch_user_by_name(&self, name: &str) -> StoreResult<User> {
        if let Some(user) = self.get_user_by_name(name) {
            return Ok(user);
        }

        let user = self.inner.services.users.get_user(name).await?;
        self.update(|state| {
            state.users_by_name.insert(name.to_string(), user.clone());
        });
        Ok(user)
    }

    /// Returns the cached user with this username, fetching
    /// `users/{username}` if none is cached.
    pub async fn get_or_fetch_user_by_username(&self, username: &str) -> StoreResult<User> {
        let cached = self.read(|state| {
            state
                .users_by_name
                .values()
                .find(|user| user.username == username)
                .cloned()
        });
        if let Some(user) = cached {
            return Ok(user);
        }

        let user = self
            .inner
            .services
            .users
            .get_user(&format!("users/{}", username))
            .await?;
        self.update(|state| {
            state.users_by_name.insert(user.name.clone(), user.clone());
        });
        Ok(user)
    }

    /// Lists all users and merges them into the user map.
    ///
    /// Concurrent calls share one request. Failures are reported as
    /// [`StoreError::FetchUsersFailed`].
    pub async fn fetch_users(&self) -> StoreResult<Vec<User>> {
        let key = RequestKey::new("fetchUsers");
        let store = self.clone();
        self.inner
            .users_flight
            .execute(key, move || async move {
                let users = store
                    .inner
                    .services
                    .users
                    .list_users()
                    .await
                    .map_err(StoreError::FetchUsersFailed)?;
                store.update(|state| {
                    for user in &users {
                        state.users_by_name.insert(user.name.clone(), user.clone());
                    }
                });
                debug!(count = users.len(), "fetched users");
                Ok(users)
            })
            .await
    }

    pub async fn update_user(&self, user: User, update_mask: FieldMask) -> StoreResult<User> {
        let updated = self
            .inner
            .services
            .users
            .update_user(user, update_mask)
            .await?;
        self.update(|state| {
            state
                .users_by_name
                .insert(updated.name.clone(), updated.clone());
        });
        Ok(updated)
    }

    pub async fn delete_user(&self, name: &str) -> StoreResult<()> {
        self.inner.services.users.delete_user(name).await?;
        self.update(|state| {
            state.users_by_name.remove(name);
        });
        Ok(())
    }

    // Settings

    /// Replaces the general setting locally without persisting it.
    pub fn set_general_setting(&self, setting: Option<GeneralSetting>) {
        self.update(|state| state.general_setting = setting);
    }

    /// Persists the fields of `setting` named by `update_mask` and stores
    /// the server's copy.
    pub async fn update_user_general_setting(
        &self,
        setting: GeneralSetting,
        update_mask: FieldMask,
    ) -> StoreResult<Option<GeneralSetting>> {
        let current_user = self.require_current_user()?;
        let setting = UserSetting {
            name: build_user_setting_name(&current_user, UserSettingKey::General),
            value: UserSettingValue::General(setting),
        };

        let updated = self
            .inner
            .services
            .users
            .update_user_setting(setting, update_mask)
            .await?;
        let general = updated.general().cloned();
        self.set_general_setting(general.clone());
        Ok(general)
    }

    /// Reads the general setting from the server and stores it.
    pub async fn get_user_general_setting(&self) -> StoreResult<Option<GeneralSetting>> {
        let current_user = self.require_current_user()?;
        let name = build_user_setting_name(&current_user, UserSettingKey::General);

        let setting = self.inner.services.users.get_user_setting(&name).await?;
        let general = setting.general().cloned();
        self.set_general_setting(general.clone());
        Ok(general)
    }

    /// Loads every setting and the shortcuts of the signed-in user.
    ///
    /// Does nothing when nobody is signed in. Setting kinds missing from
    /// the response are cleared.
    pub async fn fetch_user_settings(&self) -> StoreResult<()> {
        let Some(current_user) = self.current_user() else {
            return Ok(());
        };

        let services = &self.inner.services;
        let (settings, shortcuts) = futures::try_join!(
            services.users.list_user_settings(&current_user),
            services.shortcuts.list_shortcuts(&current_user),
        )?;

        let find = |key: UserSettingKey| settings.iter().find(|s| s.key() == key);
        let general = find(UserSettingKey::General).and_then(|s| s.general().cloned());
        let sessions = find(UserSettingKey::Sessions).and_then(|s| s.sessions().cloned());
        let access_tokens =
            find(UserSettingKey::AccessTokens).and_then(|s| s.access_tokens().cloned());
        let webhooks = find(UserSettingKey::Webhooks).and_then(|s| s.webhooks().cloned());

        self.update(|state| {
            state.general_setting = general;
            state.sessions_setting = sessions;
            state.access_tokens_setting = access_tokens;
            state.webhooks_setting = webhooks;
            state.shortcuts = shortcuts;
        });
        Ok(())
    }

    // Notifications

    pub async fn fetch_notifications(&self) -> StoreResult<()> {
        let current_user = self.require_current_user()?;
        let notifications = self
            .inner
            .services
            .users
            .list_user_notifications(&current_user)
            .await?;
        self.update(|state| state.notifications = notifications);
        Ok(())
    }

    pub async fn update_notification(
        &self,
        notification: UserNotification,
        update_mask: FieldMask,
    ) -> StoreResult<UserNotification> {
        let updated = self
            .inner
            .services
            .users
            .update_user_notification(notification, update_mask)
            .await?;
        self.update(|state| {
            for existing in state
                .notifications
                .iter_mut()
                .filter(|n| n.name == updated.name)
            {
                *existing = updated.clone();
            }
        });
        Ok(updated)
    }

    pub async fn delete_notification(&self, name: &str) -> StoreResult<()> {
        self.inner
            .services
            .users
            .delete_user_notification(name)
            .await?;
        self.update(|state| state.notifications.retain(|n| n.name != name));
        Ok(())
    }

    // Stats

    /// Fetches stats of one user (by user resource name), or of every user
    /// when `user` is `None` or empty, and merges them by stats name.
    ///
    /// Concurrent calls for the same `user` share one request. Failures are
    /// reported as [`StoreError::FetchUserStatsFailed`].
    pub async fn fetch_user_stats(&self, user: Option<&str>) -> StoreResult<()> {
        let user = user.filter(|user| !user.is_empty());
        let key = RequestKey::new("fetchUserStats").param("user", user);
        let user = user.map(str::to_string);
        let store = self.clone();
        self.inner
            .stats_flight
            .execute(key, move || async move {
                let users = &store.inner.services.users;
                let fetched: Vec<UserStats> = match user {
                    None => users.list_all_user_stats().await,
                    Some(user) => users.get_user_stats(&user).await.map(|stats| vec![stats]),
                }
                .map_err(StoreError::FetchUserStatsFailed)?;

                store.update(|state| {
                    for stats in fetched {
                        state.stats_by_name.insert(stats.name.clone(), stats);
                    }
                    state.stats_state_id = next_state_id();
                });
                Ok(())
            })
            .await
    }

    /// Sets the stats state id, generating a fresh one if `id` is `None`.
    pub fn set_stats_state_id(&self, id: Option<u64>) {
        let id = id.unwrap_or_else(next_state_id);
        self.update(|state| state.stats_state_id = id);
    }
}
