//! User setting resources.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a user setting. Each user has at most one setting per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserSettingKey {
    General,
    Sessions,
    AccessTokens,
    Webhooks,
}

impl UserSettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserSettingKey::General => "GENERAL",
            UserSettingKey::Sessions => "SESSIONS",
            UserSettingKey::AccessTokens => "ACCESS_TOKENS",
            UserSettingKey::Webhooks => "WEBHOOKS",
        }
    }
}

impl fmt::Display for UserSettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the resource name of a user setting, e.g. `users/1/settings/GENERAL`.
pub fn build_user_setting_name(user: &str, key: UserSettingKey) -> String {
    format!("{}/settings/{}", user, key)
}

/// Appearance and default-visibility preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralSetting {
    pub locale: String,
    pub memo_visibility: String,
    pub theme: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub last_accessed_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionsSetting {
    pub sessions: Vec<SessionInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokensSetting {
    pub access_tokens: Vec<AccessToken>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webhook {
    pub id: String,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhooksSetting {
    pub webhooks: Vec<Webhook>,
}

/// Value of a user setting, one variant per [`UserSettingKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserSettingValue {
    General(GeneralSetting),
    Sessions(SessionsSetting),
    AccessTokens(AccessTokensSetting),
    Webhooks(WebhooksSetting),
}

/// A user setting resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSetting {
    /// Resource name, e.g. `users/1/settings/GENERAL`.
    pub name: String,
    pub value: UserSettingValue,
}

impl UserSetting {
    /// The kind of this setting.
    pub fn key(&self) -> UserSettingKey {
        match self.value {
            UserSettingValue::General(_) => UserSettingKey::General,
            UserSettingValue::Sessions(_) => UserSettingKey::Sessions,
            UserSettingValue::AccessTokens(_) => UserSettingKey::AccessTokens,
            UserSettingValue::Webhooks(_) => UserSettingKey::Webhooks,
        }
    }

    pub fn general(&self) -> Option<&GeneralSetting> {
        match &self.value {
            UserSettingValue::General(setting) => Some(setting),
            _ => None,
        }
    }

    pub fn sessions(&self) -> Option<&SessionsSetting> {
        match &self.value {
            UserSettingValue::Sessions(setting) => Some(setting),
            _ => None,
        }
    }

    pub fn access_tokens(&self) -> Option<&AccessTokensSetting> {
        match &self.value {
            UserSettingValue::AccessTokens(setting) => Some(setting),
            _ => None,
        }
    }

    pub fn webhooks(&self) -> Option<&WebhooksSetting> {
        match &self.value {
            UserSettingValue::Webhooks(setting) => Some(setting),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_name_uses_key_suffix() {
        assert_eq!(
            build_user_setting_name("users/1", UserSettingKey::General),
            "users/1/settings/GENERAL"
        );
        assert_eq!(
            build_user_setting_name("users/1", UserSettingKey::AccessTokens),
            "users/1/settings/ACCESS_TOKENS"
        );
    }

    #[test]
    fn test_accessors_match_value_kind() {
        let setting = UserSetting {
            name: "users/1/settings/WEBHOOKS".to_string(),
            value: UserSettingValue::Webhooks(WebhooksSetting::default()),
        };

        assert_eq!(setting.key(), UserSettingKey::Webhooks);
        assert!(setting.webhooks().is_some());
        assert!(setting.general().is_none());
        assert!(setting.sessions().is_none());
        assert!(setting.access_tokens().is_none());
    }
}
