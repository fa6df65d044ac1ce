//! DooTask host passthrough: user token lookup and theme/locale mapping.
//!
//! When memos runs as a DooTask micro-app, the host passes its theme and
//! language in the URL query (`?theme=dark&lang=zh-CHT`) and can hand out a
//! user token that the server exchanges for a memos session.

use url::form_urlencoded;

use crate::services::MicroAppHost;

/// Theme and locale requested by the host, already mapped to memos values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostPreferences {
    pub theme: Option<String>,
    pub locale: Option<String>,
}

impl HostPreferences {
    pub fn is_empty(&self) -> bool {
        self.theme.is_none() && self.locale.is_none()
    }
}

/// Returns the DooTask user token, or `None` when not running inside
/// DooTask, when nobody is signed in there, or when the host fails.
pub async fn user_token(host: &dyn MicroAppHost) -> Option<String> {
    host.app_ready().await.ok()?;
    if !host.is_micro_app().await.ok()? {
        return None;
    }

    let user_id = host.user_id().await.unwrap_or(0);
    if user_id == 0 {
        return None;
    }

    let token = host.user_token().await.unwrap_or_default();
    let trimmed = token.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Maps the host `theme` parameter: `dark` → `default-dark`,
/// `light` → `default`. Other values are ignored.
pub fn map_theme_param(theme: &str) -> Option<&'static str> {
    match theme.trim().to_lowercase().as_str() {
        "dark" => Some("default-dark"),
        "light" => Some("default"),
        _ => None,
    }
}

/// Maps the host `lang` parameter to a memos locale. DooTask sends one of
/// `zh zh-CHT en ko ja de fr id ru`; anything unknown falls back to `en`.
pub fn map_lang_param(lang: &str) -> &'static str {
    let normalized = lang.trim().replace('-', "").to_lowercase();
    match normalized.as_str() {
        "zh" => "zh-Hans",
        "zhcht" => "zh-Hant",
        "en" => "en",
        "ko" => "ko",
        "ja" => "ja",
        "de" => "de",
        "fr" => "fr",
        "id" => "id",
        "ru" => "ru",
        _ => "en",
    }
}

/// Reads `theme` and `lang` from a URL query string (with or without the
/// leading `?`). Only the first occurrence of each parameter counts, and
/// empty values are treated as absent.
pub fn parse_theme_and_lang(search: &str) -> HostPreferences {
    let query = search.strip_prefix('?').unwrap_or(search);

    let mut theme_param = None;
    let mut lang_param = None;
    for (name, value) in form_urlencoded::parse(query.as_bytes()) {
        match name.as_ref() {
            "theme" if theme_param.is_none() => theme_param = Some(value.into_owned()),
            "lang" if lang_param.is_none() => lang_param = Some(value.into_owned()),
            _ => {}
        }
    }

    HostPreferences {
        theme: theme_param
            .filter(|value| !value.is_empty())
            .and_then(|value| map_theme_param(&value))
            .map(str::to_string),
        locale: lang_param
            .filter(|value| !value.is_empty())
            .map(|value| map_lang_param(&value).to_string()),
    }
}
