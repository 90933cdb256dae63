//! Error types for schema loading operations
//!
//! Copyright (c) 2025 Dynafield Team
//! Licensed under the Apache-2.0 license

use std::path::PathBuf;
use thiserror::Error;

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read '{path}': {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse YAML file '{path}': {source}")]
    YamlParseError {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Failed to parse JSON file '{path}': {source}")]
    JsonParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Unsupported file format for '{path}'. Expected .yaml, .yml, or .json")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to expand environment variable '{var_name}' in '{path}': {reason}")]
    EnvironmentError {
        var_name: String,
        path: PathBuf,
        reason: String,
    },

    #[error("Cache operation failed: {reason}")]
    CacheError { reason: String },

    /// The document parsed but is not a valid schema document
    #[error("Validation failed for '{path}': {reason}")]
    ValidationError { path: PathBuf, reason: String },

    /// The document deserialized but its descriptors do not compile
    #[error("Invalid schema in '{path}': {source}")]
    SchemaError {
        path: PathBuf,
        source: dynafield_core::Error,
    },
}

impl From<std::io::Error> for LoaderError {
    fn from(error: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::from("<unknown>"),
            source: error,
        }
    }
}

impl LoaderError {
    pub fn io_error(path: PathBuf, error: std::io::Error) -> Self {
        Self::IoError { path, source: error }
    }

    pub fn yaml_parse_error(path: PathBuf, error: serde_yaml::Error) -> Self {
        Self::YamlParseError { path, source: error }
    }

    pub fn json_parse_error(path: PathBuf, error: serde_json::Error) -> Self {
        Self::JsonParseError { path, source: error }
    }

    pub fn unsupported_format(path: PathBuf) -> Self {
        Self::UnsupportedFormat { path }
    }

    pub fn environment_error(var_name: String, path: PathBuf, reason: String) -> Self {
        Self::EnvironmentError {
            var_name,
            path,
            reason,
        }
    }

    pub fn cache_error(reason: String) -> Self {
        Self::CacheError { reason }
    }

    pub fn validation_error(path: PathBuf, reason: String) -> Self {
        Self::ValidationError { path, reason }
    }

    pub fn schema_error(path: PathBuf, source: dynafield_core::Error) -> Self {
        Self::SchemaError { path, source }
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::IoError { path, .. }
            | Self::YamlParseError { path, .. }
            | Self::JsonParseError { path, .. }
            | Self::UnsupportedFormat { path }
            | Self::EnvironmentError { path, .. }
            | Self::ValidationError { path, .. }
            | Self::SchemaError { path, .. } => Some(path),
            Self::CacheError { .. } => None,
        }
    }

    /// Errors a directory scan may skip over instead of aborting
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::EnvironmentError { .. } | Self::CacheError { .. } | Self::UnsupportedFormat { .. }
        )
    }
}
