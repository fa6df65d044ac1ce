//! HTTP client for the DooTask user info endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::DooTaskSettings;

use super::error::{DooTaskError, DooTaskResult};

/// DooTask server used when none is configured.
pub const DEFAULT_SERVER_URL: &str = "http://nginx";

/// User agent sent with every request.
pub const USER_AGENT: &str = "memos-dootask-plugin";

const USER_INFO_PATH: &str = "/api/users/info";

/// A DooTask user as reported by `/api/users/info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DooTaskUserInfo {
    #[serde(rename = "userid", default)]
    pub user_id: i64,
    #[serde(default)]
    pub identity: Vec<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(rename = "userimg", default)]
    pub user_img: String,
}

impl DooTaskUserInfo {
    pub fn is_admin(&self) -> bool {
        self.identity.iter().any(|identity| identity == "admin")
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    ret: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Source of DooTask user info for a token.
#[async_trait]
pub trait UserInfoSource: Send + Sync + 'static {
    async fn fetch_user_info(&self, token: &str) -> DooTaskResult<DooTaskUserInfo>;
}

/// Talks to a DooTask server over HTTP.
#[derive(Debug, Clone)]
pub struct DooTaskClient {
    http: reqwest::Client,
    user_info_url: String,
}

impl DooTaskClient {
    pub fn new(settings: &DooTaskSettings) -> DooTaskResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            user_info_url: format!("{}{}", settings.normalized_server_url(), USER_INFO_PATH),
        })
    }

    pub fn user_info_url(&self) -> &str {
        &self.user_info_url
    }
}

#[async_trait]
impl UserInfoSource for DooTaskClient {
    #[instrument(skip(self, token), fields(url = %self.user_info_url))]
    async fn fetch_user_info(&self, token: &str) -> DooTaskResult<DooTaskUserInfo> {
        let body = self
            .http
            .get(&self.user_info_url)
            .header("Token", token)
            .send()
            .await?
            .bytes()
            .await?;
        let info = parse_user_info_response(&body)?;
        debug!(user_id = info.user_id, "fetched DooTask user info");
        Ok(info)
    }
}

/// Decodes a `{ret, msg, data}` envelope carrying a user.
///
/// `ret != 1` fails with `msg`, or `dootask api error: {ret}` when `msg` is
/// empty. A user id of zero or less means nobody is signed in.
pub fn parse_user_info_response(body: &[u8]) -> DooTaskResult<DooTaskUserInfo> {
    let envelope: Envelope = serde_json::from_slice(body).map_err(|err| DooTaskError::Decode {
        message: err.to_string(),
    })?;

    if envelope.ret != 1 {
        let message = if envelope.msg.is_empty() {
            format!("dootask api error: {}", envelope.ret)
        } else {
            envelope.msg
        };
        return Err(DooTaskError::Api {
            ret: envelope.ret,
            message,
        });
    }

    let info: DooTaskUserInfo =
        serde_json::from_value(envelope.data).map_err(|err| DooTaskError::Decode {
            message: format!("user info: {err}"),
        })?;
    if info.user_id <= 0 {
        return Err(DooTaskError::NotLoggedIn);
    }
    Ok(info)
}

/// Trims whitespace and trailing slashes; blank means [`DEFAULT_SERVER_URL`].
pub fn normalize_server_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_SERVER_URL.to_string();
    }
    trimmed.trim_end_matches('/').to_string()
}
