//! Client-side models for users, settings, shortcuts, notifications and
//! stats.
//!
//! These mirror the resources exposed by the remote services. Field sets are
//! limited to what the store reads or writes.

mod setting;

pub use setting::{
    build_user_setting_name, AccessToken, AccessTokensSetting, GeneralSetting, SessionInfo,
    SessionsSetting, UserSetting, UserSettingKey, UserSettingValue, Webhook, WebhooksSetting,
};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Role of a user within the instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// The instance owner. There is at most one.
    Host,
    Admin,
    #[default]
    User,
}

/// A user resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Resource name, e.g. `users/1`.
    pub name: String,
    pub username: String,
    pub role: Role,
    pub email: String,
    pub nickname: String,
    pub avatar_url: String,
    pub description: String,
}

/// Paths of the fields an update touches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMask {
    pub paths: Vec<String>,
}

impl FieldMask {
    /// Creates a mask from field paths.
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

/// A saved memo filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    /// Resource name, e.g. `users/1/shortcuts/work`.
    pub name: String,
    pub title: String,
    pub filter: String,
}

/// Read state of a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationStatus {
    #[default]
    Unread,
    Archived,
}

/// A notification addressed to a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserNotification {
    /// Resource name, e.g. `users/1/notifications/3`.
    pub name: String,
    /// Resource name of the user who triggered it.
    pub sender: String,
    pub status: NotificationStatus,
}

/// Aggregated memo statistics of one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    /// Resource name, e.g. `users/1/stats`.
    pub name: String,
    pub tag_count: HashMap<String, i32>,
    pub total_memo_count: i32,
}

/// Credentials accepted when creating a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Credentials {
    Password { username: String, password: String },
    /// A user token issued by the DooTask host.
    DooTask { token: String },
}
