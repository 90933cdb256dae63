//! Configuration management for the CLI
//!
//! Configuration is layered, later layers winning key by key:
//! - Default values
//! - User config (`<config dir>/dynafield/config.yaml`, `~/.dynafield.yaml`)
//! - Project config (`.dynafield.yaml`, `.dynafield.json`, `dynafield.yaml`)
//! - An explicit `--config` file, which replaces the discovered files
//! - Command-line arguments, applied by the handlers

use crate::cli::{OutputFormat, StrictMode};
use crate::error::{Error, Result};
use dynafield_core::expressions::PlaceholderStyle;
use dynafield_core::utils::merge_json;
use dynafield_schemas::{Format, SchemaParser};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Schema validation defaults
    pub validation: ValidationConfig,

    /// SQL compilation defaults
    pub sql: SqlConfig,

    /// Path settings
    pub paths: PathConfig,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: OutputFormat,

    /// Use colored output when stdout is a terminal
    pub color: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (compact, pretty, json)
    pub format: String,

    /// Log file path
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Lint strictness used by `check` when `--strict` is absent
    pub mode: StrictMode,

    /// Reject unknown record keys in `validate`
    pub strict_keys: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placeholders {
    /// `%s`
    #[default]
    Format,
    /// `$1`, `$2`, ...
    Numbered,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlConfig {
    pub placeholders: Placeholders,
}

/// Path configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Directory `sdl` falls back to when given a bare schema name
    pub schemas_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
            file: None,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            mode: StrictMode::Strict,
            strict_keys: false,
        }
    }
}

impl From<Placeholders> for PlaceholderStyle {
    fn from(placeholders: Placeholders) -> Self {
        match placeholders {
            Placeholders::Format => PlaceholderStyle::Format,
            Placeholders::Numbered => PlaceholderStyle::Numbered,
        }
    }
}

impl Config {
    /// Load one configuration file on top of the defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Self::from_layers(&[path.to_path_buf()])
    }

    /// Load from an explicit file, or from every default location that exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let found: Vec<_> = Self::default_config_paths()
                    .into_iter()
                    .filter(|path| path.is_file())
                    .collect();
                Self::from_layers(&found)
            }
        }
    }

    fn from_layers(paths: &[PathBuf]) -> Result<Self> {
        let parser = SchemaParser::new();
        let mut merged = serde_json::to_value(Self::default())?;
        for path in paths {
            let (layer, _) = parser.parse_file(path)?;
            if !(layer.is_object() || layer.is_null()) {
                return Err(Error::InvalidFormat {
                    path: path.clone(),
                    expected: "a mapping of configuration sections".to_string(),
                });
            }
            debug!(path = %path.display(), "applying config layer");
            merged = merge_json(&merged, &layer);
        }
        Self::from_value(merged)
    }

    fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::config(e.to_string()))
    }

    /// Candidate files in load order, lowest precedence first
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(config_dir) = dirs::config_dir() {
            let dir = config_dir.join("dynafield");
            paths.push(dir.join("config.yaml"));
            paths.push(dir.join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".dynafield.yaml"));
        }

        paths.push(PathBuf::from("dynafield.yaml"));
        paths.push(PathBuf::from(".dynafield.json"));
        paths.push(Self::project_config_path());

        paths
    }

    pub fn user_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("dynafield").join("config.yaml"))
            .ok_or_else(|| Error::config("no user configuration directory on this platform"))
    }

    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".dynafield.yaml")
    }

    /// Serialize in the given format
    pub fn render(&self, format: Format) -> Result<String> {
        let value = serde_json::to_value(self)?;
        Ok(SchemaParser::new().serialize(&value, format)?)
    }

    /// Save configuration to a file, YAML unless the extension says JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let format = Format::from_path(path).unwrap_or(Format::Yaml);
        let content = self.render(format)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}
