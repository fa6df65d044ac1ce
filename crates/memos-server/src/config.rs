//! Configuration management for the memos server.
//!
//! This module provides configuration loading with multiple sources:
//! 1. Default values (hardcoded)
//! 2. Configuration file (YAML)
//! 3. Environment variables (override)
//!
//! # Configuration Hierarchy
//!
//! Environment variables take precedence over config file values,
//! which take precedence over defaults. `DOOTASK_SERVER` is also honored
//! for the DooTask server URL and wins over everything else, so existing
//! plugin deployments keep working.
//!
//! # Example
//!
//! ```ignore
//! use memos_server::config::ServerConfig;
//!
//! // Load from file with env overrides
//! let config = ServerConfig::load("config.yaml")?;
//!
//! // Or load from environment only
//! let config = ServerConfig::from_env()?;
//! ```

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::dootask::{normalize_server_url, DEFAULT_SERVER_URL};

/// Legacy environment variable holding the DooTask server URL.
pub const DOOTASK_SERVER_ENV: &str = "DOOTASK_SERVER";

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    /// Instance profile: mode, bind address, data directory, database
    #[serde(default)]
    pub profile: ProfileSettings,

    /// DooTask plugin settings
    #[serde(default)]
    pub dootask: DooTaskSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Raw instance profile settings.
///
/// These are resolved into a [`Profile`](crate::profile::Profile) at
/// startup, which normalizes the mode and base path and checks the data
/// directory.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProfileSettings {
    /// "prod", "dev" or "demo". Anything else runs as "demo".
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Address to bind to. Empty binds all interfaces.
    #[serde(default)]
    pub addr: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Unix socket path. Overrides `addr` and `port` when set.
    #[serde(default)]
    pub unix_sock: String,

    /// Data directory. Relative paths are resolved against the directory
    /// of the executable.
    #[serde(default)]
    pub data: String,

    /// Database connection string. Defaults to a file in the data
    /// directory for sqlite.
    #[serde(default)]
    pub dsn: String,

    /// Database driver: "sqlite", "mysql" or "postgres"
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Public URL of the instance
    #[serde(default)]
    pub instance_url: String,

    /// URL path prefix for HTTP and SPA routes, e.g. "/memos"
    #[serde(default)]
    pub base_path: String,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            addr: String::new(),
            port: default_port(),
            unix_sock: String::new(),
            data: String::new(),
            dsn: String::new(),
            driver: default_driver(),
            instance_url: String::new(),
            base_path: String::new(),
        }
    }
}

fn default_mode() -> String {
    "demo".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_driver() -> String {
    "sqlite".to_string()
}

/// DooTask plugin settings.
///
/// These settings can be overridden via environment variables with the
/// `MEMOS_` prefix and `__` as the nested key separator:
///
/// - `MEMOS_DOOTASK__SERVER_URL=http://dootask.local` - DooTask API server
/// - `MEMOS_DOOTASK__REQUEST_TIMEOUT_SECS=5` - User info request timeout
///
/// # Example YAML Configuration
///
/// ```yaml
/// dootask:
///   server_url: http://nginx
///   request_timeout_secs: 10
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DooTaskSettings {
    /// Base URL of the DooTask server.
    ///
    /// Default: `http://nginx` (the DooTask compose service name)
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Timeout for user info requests, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for DooTaskSettings {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl DooTaskSettings {
    /// Server URL with surrounding whitespace and trailing slashes removed.
    pub fn normalized_server_url(&self) -> String {
        normalize_server_url(&self.server_url)
    }
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_request_timeout() -> u64 {
    10
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON format (true for production, false for development)
    #[serde(default)]
    pub json: bool,

    /// Log span enter/exit events
    #[serde(default)]
    pub spans: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            spans: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },

    #[error("unable to access data folder {path}: {source}")]
    DataDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ServerConfig {
    /// Load configuration from a YAML file with environment variable overrides.
    ///
    /// Environment variables are prefixed with `MEMOS_` and use `__` as separator.
    /// For example:
    /// - `MEMOS_PROFILE__PORT=5230` overrides `profile.port`
    /// - `MEMOS_DOOTASK__SERVER_URL=...` overrides `dootask.server_url`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        Self::build(Some(path))
    }

    /// Load configuration from environment variables only.
    ///
    /// Uses default values and allows overrides via MEMOS_ prefixed env vars.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::build(None)
    }

    fn build(file: Option<&Path>) -> Result<Self, ConfigLoadError> {
        let mut builder = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&ServerConfig::default())?);

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Yaml));
        }

        let legacy_server = std::env::var(DOOTASK_SERVER_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty());

        let config = builder
            // Use __ as separator for nested keys: MEMOS_PROFILE__PORT -> profile.port
            .add_source(
                Environment::with_prefix("MEMOS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("dootask.server_url", legacy_server)?
            .build()?;

        let server_config: ServerConfig = config.try_deserialize()?;
        server_config.validate()?;

        Ok(server_config)
    }

    /// Validate the configuration.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        // A port is only needed when not listening on a unix socket
        if self.profile.port == 0 && self.profile.unix_sock.trim().is_empty() {
            return Err(ConfigLoadError::Invalid {
                message: "profile.port must be greater than 0".to_string(),
            });
        }

        let valid_drivers = ["sqlite", "mysql", "postgres"];
        if !valid_drivers.contains(&self.profile.driver.as_str()) {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "profile.driver must be one of: {:?}, got: {}",
                    valid_drivers, self.profile.driver
                ),
            });
        }

        // Only sqlite can derive a DSN from the data directory
        if self.profile.driver != "sqlite" && self.profile.dsn.trim().is_empty() {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "profile.dsn is required when driver is '{}'",
                    self.profile.driver
                ),
            });
        }

        let server_url = self.dootask.normalized_server_url();
        if let Err(err) = url::Url::parse(&server_url) {
            return Err(ConfigLoadError::Invalid {
                message: format!("dootask.server_url is not a valid URL ({server_url}): {err}"),
            });
        }

        if self.dootask.request_timeout_secs == 0 {
            return Err(ConfigLoadError::Invalid {
                message: "dootask.request_timeout_secs must be greater than 0".to_string(),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "logging.level must be one of: {:?}, got: {}",
                    valid_levels, self.logging.level
                ),
            });
        }

        Ok(())
    }
}
