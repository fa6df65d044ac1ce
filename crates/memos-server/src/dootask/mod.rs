//! DooTask sign-in: exchanges a DooTask user token for a local user.
//!
//! ```text
//! token ──► DooTaskClient ──GET {server}/api/users/info──► DooTask
//!               │
//!               ▼ DooTaskUserInfo
//!        DooTaskAuthenticator ──► UserRepository (create or update dt_{id})
//! ```

mod auth;
mod avatar;
mod client;
mod error;

pub use auth::{build_username, DooTaskAuthenticator};
pub use avatar::normalize_avatar_url;
pub use client::{
    normalize_server_url, parse_user_info_response, DooTaskClient, DooTaskUserInfo,
    UserInfoSource, DEFAULT_SERVER_URL, USER_AGENT,
};
pub use error::{DooTaskError, DooTaskResult};
