//! Helpers for the browser environment: base path math and DooTask host
//! passthrough.

pub mod base_path;
pub mod dootask;

pub use base_path::BasePath;
pub use dootask::{map_lang_param, map_theme_param, parse_theme_and_lang, user_token, HostPreferences};
