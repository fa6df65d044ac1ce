//! Structured logging configuration.
//!
//! This module provides functions for configuring structured logging
//! using `tracing-subscriber`.
//!
//! # Log Format
//!
//! When JSON formatting is enabled, log entries are output as JSON objects:
//!
//! ```json
//! {"timestamp":"2024-01-15T10:30:00.000Z","level":"INFO","target":"memos_server::dootask::auth","fields":{"message":"provisioned DooTask user","username":"dt_42"}}
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use memos_server::observability::logging::{init_logging, LoggingConfig};
//!
//! let config = ServerConfig::from_env()?;
//! init_logging(LoggingConfig::from_settings(&config.logging));
//! ```

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::config::LoggingSettings;

/// Configuration for structured logging.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Whether to use JSON format (true) or text format (false)
    pub json_format: bool,
    /// The default log level if RUST_LOG is not set
    pub default_level: Level,
    /// Whether to include span events (enter/exit)
    pub include_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json_format: false,
            default_level: Level::INFO,
            include_spans: false,
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration for JSON output.
    pub fn json() -> Self {
        Self {
            json_format: true,
            ..Default::default()
        }
    }

    /// Create a new logging configuration for text output (development).
    pub fn text() -> Self {
        Self {
            json_format: false,
            ..Default::default()
        }
    }

    /// Builds the configuration from loaded settings. An unknown level
    /// falls back to INFO.
    pub fn from_settings(settings: &LoggingSettings) -> Self {
        let config = if settings.json {
            Self::json()
        } else {
            Self::text()
        };
        let config = config.with_level(Level::from_str(&settings.level).unwrap_or(Level::INFO));
        if settings.spans {
            config.with_spans()
        } else {
            config
        }
    }

    /// Set the default log level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    /// Include span events in the output.
    pub fn with_spans(mut self) -> Self {
        self.include_spans = true;
        self
    }
}

/// Initialize the logging subsystem with the given configuration.
///
/// This should be called once at application startup. If called multiple times,
/// subsequent calls will have no effect (the subscriber is global).
pub fn init_logging(config: LoggingConfig) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_level.to_string()));

    let span_events = if config.include_spans {
        FmtSpan::ENTER | FmtSpan::EXIT
    } else {
        FmtSpan::NONE
    };

    if config.json_format {
        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .json()
                .with_span_events(span_events)
                .with_current_span(true)
                .with_target(true)
                .with_file(false)
                .with_line_number(false),
        );

        let _ = tracing::subscriber::set_global_default(subscriber);
    } else {
        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .pretty()
                .with_span_events(span_events)
                .with_target(true),
        );

        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

/// Creates a JSON subscriber writing to `writer`, for capturing log output
/// in tests.
pub fn create_json_layer<W>(writer: W) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(EnvFilter::new("trace"))
        .with(
            fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(true)
                .with_current_span(true),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dootask::{DooTaskAuthenticator, DooTaskResult, DooTaskUserInfo, UserInfoSource};
    use crate::repository::MemoryUserRepository;
    use std::sync::{Arc, Mutex};

    /// A writer that captures output to a shared buffer.
    #[derive(Clone)]
    struct CaptureWriter {
        buffer: Arc<Mutex<Vec<u8>>>,
    }

    impl CaptureWriter {
        fn new() -> Self {
            Self {
                buffer: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn get_output(&self) -> String {
            let buffer = self.buffer.lock().unwrap();
            String::from_utf8_lossy(&buffer).to_string()
        }
    }

    impl std::io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.buffer.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CaptureWriter {
        type Writer = CaptureWriter;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(!config.json_format);
        assert_eq!(config.default_level, Level::INFO);
        assert!(!config.include_spans);
    }

    #[test]
    fn test_logging_config_from_settings() {
        let settings = LoggingSettings {
            level: "debug".to_string(),
            json: true,
            spans: true,
        };

        let config = LoggingConfig::from_settings(&settings);

        assert!(config.json_format);
        assert_eq!(config.default_level, Level::DEBUG);
        assert!(config.include_spans);
    }

    #[test]
    fn test_logging_config_from_settings_defaults() {
        let config = LoggingConfig::from_settings(&LoggingSettings::default());

        assert!(!config.json_format);
        assert_eq!(config.default_level, Level::INFO);
        assert!(!config.include_spans);
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let settings = LoggingSettings {
            level: "chatty".to_string(),
            ..Default::default()
        };

        assert_eq!(
            LoggingConfig::from_settings(&settings).default_level,
            Level::INFO
        );
    }

    struct FixedSource;

    #[async_trait::async_trait]
    impl UserInfoSource for FixedSource {
        async fn fetch_user_info(&self, _token: &str) -> DooTaskResult<DooTaskUserInfo> {
            Ok(DooTaskUserInfo {
                user_id: 42,
                identity: vec!["admin".to_string()],
                email: String::new(),
                nickname: "Alice".to_string(),
                user_img: String::new(),
            })
        }
    }

    /// Test: sign-in events are captured as JSON with their fields
    #[tokio::test]
    async fn test_provisioning_event_is_json_formatted() {
        // Arrange
        let writer = CaptureWriter::new();
        let _guard = tracing::subscriber::set_default(create_json_layer(writer.clone()));
        let auth = DooTaskAuthenticator::new(
            Arc::new(FixedSource),
            Arc::new(MemoryUserRepository::with_hash_cost(4)),
        );

        // Act
        auth.authenticate("token").await.unwrap();

        // Assert
        let output = writer.get_output();
        let events: Vec<serde_json::Value> = output
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .unwrap_or_else(|err| panic!("Log line should be valid JSON: {line} ({err})"))
            })
            .collect();
        let provisioned = events
            .iter()
            .find(|event| event["fields"]["message"] == "provisioned DooTask user")
            .unwrap_or_else(|| panic!("No provisioning event in: {output}"));

        assert_eq!(provisioned["level"], "INFO");
        assert_eq!(provisioned["target"], "memos_server::dootask::auth");
        assert_eq!(provisioned["fields"]["username"], "dt_42");
        assert_eq!(provisioned["fields"]["role"], "Host");
    }
}
