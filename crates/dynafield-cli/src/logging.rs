//! Logging utilities for the Dynafield CLI
//!
//! This module provides:
//! - Request ID generation and tracking
//! - Redaction of sensitive record values
//! - Performance timing spans
//! - Structured logging setup on stderr, with an optional JSON log file

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{field, Span};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};
use uuid::Uuid;

/// Global request ID for the current session
static REQUEST_ID: OnceLock<String> = OnceLock::new();

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: String,
    /// Console output format
    pub format: LogFormat,
    /// Enable console output
    pub console: bool,
    /// Optional JSON log file
    pub file: Option<PathBuf>,
    /// Include thread IDs
    pub thread_ids: bool,
    /// Include file and line numbers
    pub source_location: bool,
    /// Problems found while resolving the settings, logged once the
    /// subscriber is installed
    #[serde(skip)]
    pub warnings: Vec<String>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "pretty" | "full" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            console: true,
            file: None,
            thread_ids: false,
            source_location: false,
            warnings: Vec::new(),
        }
    }
}

impl LoggingConfig {
    /// Create logging config from verbosity level
    pub fn from_verbosity(verbosity: u8) -> Self {
        let mut config = Self::default();

        match verbosity {
            0 => {}
            1 => config.level = "info".to_string(),
            2 => {
                config.level = "debug".to_string();
                config.source_location = true;
            }
            _ => {
                config.level = "trace".to_string();
                config.format = LogFormat::Pretty;
                config.source_location = true;
                config.thread_ids = true;
            }
        }

        config
    }

    /// Settings from the config file, with `-v` flags raising the level
    pub fn resolve(verbosity: u8, file: &crate::config::LoggingConfig) -> Self {
        let mut config = Self::from_verbosity(verbosity);
        if verbosity == 0 {
            config.level = file.level.clone();
        }
        match LogFormat::parse(&file.format) {
            Some(format) if verbosity < 3 => config.format = format,
            Some(_) => {}
            None => config
                .warnings
                .push(format!("Invalid log format: {}, using default", file.format)),
        }
        config.file = file.file.clone();
        config.merge_with_env();
        config
    }

    /// Apply environment overrides
    pub fn merge_with_env(&mut self) {
        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            self.level = rust_log;
        }

        if let Ok(format) = std::env::var("DYNAFIELD_LOG_FORMAT") {
            match LogFormat::parse(&format) {
                Some(format) => self.format = format,
                None => self.warnings.push(format!("Invalid log format: {}, using default", format)),
            }
        }

        if let Ok(file) = std::env::var("DYNAFIELD_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }

        if let Ok(console) = std::env::var("DYNAFIELD_LOG_CONSOLE") {
            self.console = console.to_lowercase() == "true" || console == "1";
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize the global logging system
///
/// The returned guard flushes the log file when dropped, so keep it alive
/// until the process exits.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = create_env_filter(config)?;
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.console {
        let console = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(config.thread_ids)
            .with_file(config.source_location)
            .with_line_number(config.source_location);
        let ansi = std::io::stderr().is_terminal();
        layers.push(match config.format {
            LogFormat::Compact => console.with_ansi(ansi).compact().boxed(),
            LogFormat::Pretty => console.with_ansi(ansi).pretty().boxed(),
            LogFormat::Json => console.with_ansi(false).json().boxed(),
        });
    }

    let guard = match &config.file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            layers.push(fmt::layer().json().with_ansi(false).with_writer(writer).boxed());
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))?;

    let request_id = generate_request_id();
    if REQUEST_ID.set(request_id.clone()).is_err() {
        tracing::warn!("request ID already set, keeping the first one");
    }
    for warning in &config.warnings {
        tracing::warn!("{warning}");
    }

    tracing::info!(
        request_id = %request_id,
        config = ?config,
        "Logging system initialized"
    );

    Ok(guard)
}

fn file_writer(path: &std::path::Path) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::config(format!("log file '{}' has no file name", path.display())))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

/// Create environment filter based on configuration
fn create_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    EnvFilter::try_new(&config.level).map_err(|e| Error::config(format!("Invalid log level '{}': {}", config.level, e)))
}

/// Generate a unique request ID for this session
pub fn generate_request_id() -> String {
    format!("req_{}", Uuid::new_v4().simple())
}

/// Get the current request ID
pub fn current_request_id() -> Option<&'static str> {
    REQUEST_ID.get().map(|s| s.as_str())
}

/// Create a span with request ID and timing
pub fn create_operation_span(operation: &str, details: Option<&str>) -> Span {
    tracing::info_span!(
        "operation",
        operation = operation,
        request_id = current_request_id().unwrap_or("unknown"),
        details = details.unwrap_or(""),
        duration_ms = field::Empty,
    )
}

/// Redaction of record values before they reach the logs
pub mod redaction {
    use serde_json::Value;

    const REDACTED: &str = "***";

    /// Replace the values of sensitive-looking keys, recursively
    pub fn redact_json_value(value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    if is_sensitive_key(key) {
                        *val = Value::String(REDACTED.to_string());
                    } else {
                        redact_json_value(val);
                    }
                }
            }
            Value::Array(items) => items.iter_mut().for_each(redact_json_value),
            _ => {}
        }
    }

    /// Redacted copy, for `tracing` fields
    pub fn redacted(value: &Value) -> Value {
        let mut copy = value.clone();
        redact_json_value(&mut copy);
        copy
    }

    fn is_sensitive_key(key: &str) -> bool {
        let key_lower = key.to_lowercase();
        ["password", "passwd", "secret", "token", "credential", "api_key", "apikey", "ssn"]
            .iter()
            .any(|needle| key_lower.contains(needle))
    }
}

/// Performance timing utilities
pub mod timing {
    use std::time::Instant;
    use tracing::Span;

    /// A timer that logs its duration when finished or dropped
    pub struct Timer {
        start: Instant,
        span: Span,
        operation: String,
        finished: bool,
    }

    impl Timer {
        pub fn new(operation: &str) -> Self {
            Self {
                start: Instant::now(),
                span: super::create_operation_span(operation, None),
                operation: operation.to_string(),
                finished: false,
            }
        }

        pub fn with_details(operation: &str, details: &str) -> Self {
            Self {
                start: Instant::now(),
                span: super::create_operation_span(operation, Some(details)),
                operation: operation.to_string(),
                finished: false,
            }
        }

        pub fn span(&self) -> &Span {
            &self.span
        }

        /// Get elapsed time without finishing the timer
        pub fn elapsed(&self) -> std::time::Duration {
            self.start.elapsed()
        }

        /// Finish the timer and log the duration
        pub fn finish(mut self) {
            self.record("Operation completed");
            self.finished = true;
        }

        fn record(&self, message: &'static str) {
            let duration = self.start.elapsed();
            self.span.record("duration_ms", duration.as_millis() as u64);
            tracing::info!(
                operation = %self.operation,
                duration_ms = duration.as_millis() as u64,
                "{}",
                message
            );
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            if !self.finished {
                self.record("Operation ended early");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_redaction() {
        let mut value = json!({
            "name": "Ada",
            "password": "hunter2",
            "profile": {"api_key": "abc", "city": "London"},
            "logins": [{"token": "t1"}]
        });

        redaction::redact_json_value(&mut value);

        assert_eq!(value["name"], "Ada");
        assert_eq!(value["password"], "***");
        assert_eq!(value["profile"]["api_key"], "***");
        assert_eq!(value["profile"]["city"], "London");
        assert_eq!(value["logins"][0]["token"], "***");
    }

    #[test]
    fn test_logging_config_from_verbosity() {
        let config = LoggingConfig::from_verbosity(0);
        assert_eq!(config.level, "warn");
        assert!(!config.source_location);

        let config = LoggingConfig::from_verbosity(2);
        assert_eq!(config.level, "debug");
        assert!(config.source_location);

        let config = LoggingConfig::from_verbosity(3);
        assert_eq!(config.level, "trace");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.thread_ids);
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse("full"), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::parse("compact"), Some(LogFormat::Compact));
        assert_eq!(LogFormat::parse("xml"), None);
    }

    #[test]
    fn test_invalid_file_format_is_kept_for_later() {
        let file = crate::config::LoggingConfig {
            format: "xml".to_string(),
            ..Default::default()
        };
        let config = LoggingConfig::resolve(0, &file);
        assert!(config
            .warnings
            .iter()
            .any(|w| w == "Invalid log format: xml, using default"));
        assert!(LoggingConfig::from_verbosity(0).warnings.is_empty());
    }

    #[test]
    fn test_request_id_shape() {
        let id = generate_request_id();
        assert!(id.starts_with("req_"));
        assert_eq!(id.len(), 4 + 32);
    }
}
