//! DooTask token sign-in.

use std::sync::Arc;

use memos_domain::model::Role;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{info, instrument};

use crate::repository::{NewUser, StoredUser, UserRepository, UserUpdate};

use super::avatar::normalize_avatar_url;
use super::client::{DooTaskUserInfo, UserInfoSource};
use super::error::{DooTaskError, DooTaskResult};

const PASSWORD_LEN: usize = 20;

/// Local username of a DooTask user.
pub fn build_username(user_id: i64) -> String {
    format!("dt_{}", user_id)
}

/// Signs DooTask users in, provisioning or syncing the local user.
#[derive(Clone)]
pub struct DooTaskAuthenticator {
    source: Arc<dyn UserInfoSource>,
    users: Arc<dyn UserRepository>,
}

impl DooTaskAuthenticator {
    pub fn new(source: Arc<dyn UserInfoSource>, users: Arc<dyn UserRepository>) -> Self {
        Self { source, users }
    }

    /// Exchanges a DooTask token for the matching local user.
    ///
    /// Unknown users are created as `dt_{id}` with a random password.
    /// Known users get their role, email, nickname and avatar synced. A
    /// blank email or avatar never overwrites the local one, a blank
    /// nickname syncs to the username, and the host is never demoted.
    #[instrument(skip(self, token))]
    pub async fn authenticate(&self, token: &str) -> DooTaskResult<StoredUser> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DooTaskError::EmptyToken);
        }

        let info = self.source.fetch_user_info(token).await?;
        let username = build_username(info.user_id);
        let role = self.resolve_role(&info).await?;

        let email = info.email.trim().to_string();
        let nickname = match info.nickname.trim() {
            "" => username.clone(),
            nickname => nickname.to_string(),
        };
        let avatar_url = normalize_avatar_url(&info.user_img);

        let Some(user) = self.users.get_user_by_username(&username).await? else {
            let created = self
                .users
                .create_user(NewUser {
                    username,
                    role,
                    email,
                    nickname,
                    avatar_url,
                    password: generate_password(),
                })
                .await?;
            info!(username = %created.username, role = ?created.role, "provisioned DooTask user");
            return Ok(created);
        };

        let mut update = UserUpdate::new(user.id);
        if user.role != Role::Host && user.role != role {
            update.role = Some(role);
        }
        if !email.is_empty() && email != user.email {
            update.email = Some(email);
        }
        if nickname != user.nickname {
            update.nickname = Some(nickname);
        }
        if !avatar_url.is_empty() && avatar_url != user.avatar_url {
            update.avatar_url = Some(avatar_url);
        }

        if update.is_empty() {
            return Ok(user);
        }
        let updated = self.users.update_user(update).await?;
        info!(username = %updated.username, "synced DooTask user");
        Ok(updated)
    }

    /// Non-admins are users. The first admin becomes the host; later ones
    /// are admins.
    async fn resolve_role(&self, info: &DooTaskUserInfo) -> DooTaskResult<Role> {
        if !info.is_admin() {
            return Ok(Role::User);
        }
        match self.users.find_host().await? {
            None => Ok(Role::Host),
            Some(_) => Ok(Role::Admin),
        }
    }
}

fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PASSWORD_LEN)
        .map(char::from)
        .collect()
}
