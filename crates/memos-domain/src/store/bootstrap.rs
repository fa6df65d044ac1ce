//! Startup sequence that signs the user in and loads their state.
//!
//! Every step after the session lookup is best-effort: a failure is logged
//! and the sequence moves on.

use tracing::{error, info, warn};

use crate::error::{ServiceResult, StoreResult};
use crate::model::{Credentials, FieldMask, GeneralSetting, User};
use crate::services::{AuthService, MicroAppHost};
use crate::web::dootask::{self, HostPreferences};

use super::user_store::UserStore;

/// Environment the app was loaded in.
#[derive(Clone, Copy)]
pub struct BootstrapContext<'a> {
    /// Bridge to the DooTask host, if embedded.
    pub host: &'a dyn MicroAppHost,
    /// Query string of the page URL, e.g. `?theme=dark&lang=en`.
    pub search: &'a str,
}

/// Where the startup sequence ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// A user is signed in; carries their resource name.
    SignedIn(String),
    /// Nobody is signed in; the store was cleared.
    SignedOut,
    /// The session could not be read; the store was left untouched.
    Aborted,
}

/// Initializes the user store:
///
/// 1. Read the current session (falling back to a DooTask token exchange)
/// 2. Set the current user (later steps depend on it)
/// 3. Fetch the user's settings and shortcuts
/// 4. Apply and persist the host-provided theme and locale
/// 5. Fetch user stats
pub async fn initialize_user_store(
    store: &UserStore,
    context: BootstrapContext<'_>,
) -> BootstrapOutcome {
    let auth = store.services().auth.clone();

    let mut current_user = match current_session(auth.as_ref()).await {
        Ok(user) => user,
        Err(err) => {
            error!(error = %err, "failed to get current session");
            return BootstrapOutcome::Aborted;
        }
    };

    if current_user.is_none() {
        if let Some(token) = dootask::user_token(context.host).await {
            if let Err(err) = auth.create_session(Credentials::DooTask { token }).await {
                warn!(error = %err, "failed to create session with DooTask token");
            }

            current_user = match current_session(auth.as_ref()).await {
                Ok(user) => user,
                Err(err) => {
                    error!(error = %err, "failed to get current session after DooTask sign-in");
                    return BootstrapOutcome::Aborted;
                }
            };

            // First provisioned user becomes the owner; refresh the profile
            // so the app does not redirect to sign-up.
            let instance = &store.services().instance;
            if current_user.is_some() && !instance.has_owner() {
                if let Err(err) = instance.refresh_profile().await {
                    warn!(error = %err, "failed to refresh instance profile after DooTask sign-in");
                }
            }
        }
    }

    let Some(user) = current_user else {
        store.clear_session();
        return BootstrapOutcome::SignedOut;
    };

    let name = user.name.clone();
    store.set_current_user(user);
    info!(user = %name, "signed in");

    if let Err(err) = store.fetch_user_settings().await {
        error!(error = %err, "failed to fetch user settings");
    }

    let preferences = dootask::parse_theme_and_lang(context.search);
    if let Err(err) = apply_host_preferences(store, &preferences).await {
        warn!(error = %err, "failed to persist DooTask theme/locale to user setting");
    }

    if let Err(err) = store.fetch_user_stats(None).await {
        error!(error = %err, "failed to fetch user stats");
    }

    BootstrapOutcome::SignedIn(name)
}

/// Current session user; `Unauthenticated` means nobody is signed in.
async fn current_session(auth: &dyn AuthService) -> ServiceResult<Option<User>> {
    match auth.get_current_session().await {
        Err(err) if err.is_unauthenticated() => Ok(None),
        other => other,
    }
}

/// Merges host preferences into the general setting, then persists each
/// value that differs from the stored one so a later settings load does not
/// revert it.
async fn apply_host_preferences(
    store: &UserStore,
    preferences: &HostPreferences,
) -> StoreResult<()> {
    if preferences.is_empty() {
        return Ok(());
    }

    let stored = store.read(|state| state.general_setting.clone());
    let current_theme = stored.as_ref().map(|s| s.theme.clone());
    let current_locale = stored.as_ref().map(|s| s.locale.clone());

    let base = stored.unwrap_or_default();
    store.set_general_setting(Some(GeneralSetting {
        locale: preferences.locale.clone().unwrap_or(base.locale),
        memo_visibility: base.memo_visibility,
        theme: preferences.theme.clone().unwrap_or(base.theme),
    }));

    if let Some(theme) = &preferences.theme {
        if current_theme.as_ref() != Some(theme) {
            let patch = GeneralSetting {
                theme: theme.clone(),
                ..Default::default()
            };
            store
                .update_user_general_setting(patch, FieldMask::new(["theme"]))
                .await?;
        }
    }
    if let Some(locale) = &preferences.locale {
        if current_locale.as_ref() != Some(locale) {
            let patch = GeneralSetting {
                locale: locale.clone(),
                ..Default::default()
            };
            store
                .update_user_general_setting(patch, FieldMask::new(["locale"]))
                .await?;
        }
    }
    Ok(())
}
