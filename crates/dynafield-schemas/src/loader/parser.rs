//! Parsing of YAML and JSON schema documents
//!
//! Copyright (c) 2025 Dynafield Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use serde_json::Value;
use std::path::Path;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> LoaderResult<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(LoaderError::unsupported_format(path.to_path_buf())),
        }
    }

    pub fn primary_extension(&self) -> &'static str {
        match self {
            Format::Yaml => "yaml",
            Format::Json => "json",
        }
    }
}

/// Stateless parser for schema documents
#[derive(Debug, Default)]
pub struct SchemaParser;

impl SchemaParser {
    pub fn new() -> Self {
        Self
    }

    /// Read and parse a file, by extension first and by content otherwise
    pub fn parse_file(&self, path: &Path) -> LoaderResult<(Value, Format)> {
        let content = std::fs::read_to_string(path).map_err(|e| LoaderError::io_error(path.to_path_buf(), e))?;
        self.parse_with_fallback(&content, path)
    }

    pub fn parse_content(&self, content: &str, format: Format, path: &Path) -> LoaderResult<Value> {
        match format {
            Format::Yaml => self.parse_yaml(content, path),
            Format::Json => self.parse_json(content, path),
        }
    }

    pub fn parse_yaml(&self, content: &str, path: &Path) -> LoaderResult<Value> {
        // Parse as YAML first so YAML-specific errors surface with their positions
        let yaml_value: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| LoaderError::yaml_parse_error(path.to_path_buf(), e))?;

        serde_json::to_value(yaml_value).map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e))
    }

    pub fn parse_json(&self, content: &str, path: &Path) -> LoaderResult<Value> {
        serde_json::from_str(content).map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e))
    }

    /// Parse by extension; unknown extensions try JSON then YAML
    ///
    /// A known extension whose parse fails reports that parse error rather
    /// than guessing another format.
    pub fn parse_with_fallback(&self, content: &str, path: &Path) -> LoaderResult<(Value, Format)> {
        if let Ok(format) = Format::from_path(path) {
            return self.parse_content(content, format, path).map(|value| (value, format));
        }

        if let Ok(value) = self.parse_json(content, path) {
            return Ok((value, Format::Json));
        }

        match self.parse_yaml(content, path) {
            // a bare scalar parses as YAML too, which is never a schema document
            Ok(value) if value.is_object() || value.is_array() => Ok((value, Format::Yaml)),
            _ => Err(LoaderError::unsupported_format(path.to_path_buf())),
        }
    }

    /// Serialize a value back to text
    pub fn serialize(&self, value: &Value, format: Format) -> LoaderResult<String> {
        match format {
            Format::Json => serde_json::to_string_pretty(value).map_err(|e| LoaderError::CacheError {
                reason: format!("Failed to serialize JSON: {}", e),
            }),
            Format::Yaml => serde_yaml::to_string(value).map_err(|e| LoaderError::CacheError {
                reason: format!("Failed to serialize YAML: {}", e),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path(Path::new("people.yaml")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("people.YML")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("people.json")).unwrap(), Format::Json);

        assert!(Format::from_path(Path::new("people.txt")).is_err());
        assert!(Format::from_path(Path::new("people")).is_err());
    }

    #[test]
    fn test_yaml_file() -> LoaderResult<()> {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("people.yaml");
        fs::write(
            &file_path,
            r#"
name: People
fieldDefinitions:
  - __typename: StrField
    label: name
    required: true
"#,
        )?;

        let (value, format) = SchemaParser::new().parse_file(&file_path)?;
        assert_eq!(format, Format::Yaml);
        assert_eq!(value["name"], "People");
        assert_eq!(value["fieldDefinitions"][0]["__typename"], "StrField");
        Ok(())
    }

    #[test]
    fn test_fallback_parsing() -> LoaderResult<()> {
        let parser = SchemaParser::new();

        let (value, format) = parser.parse_with_fallback(r#"{"name": "People"}"#, Path::new("schema.txt"))?;
        assert_eq!(format, Format::Json);
        assert_eq!(value["name"], "People");

        let (value, format) = parser.parse_with_fallback("name: People\n", Path::new("schema.txt"))?;
        assert_eq!(format, Format::Yaml);
        assert_eq!(value["name"], "People");

        assert!(parser.parse_with_fallback("just words", Path::new("schema.txt")).is_err());
        assert!(parser.parse_with_fallback("{", Path::new("schema.json")).is_err());
        Ok(())
    }

    #[test]
    fn test_serialization() -> LoaderResult<()> {
        let parser = SchemaParser::new();
        let value = json!({"name": "People", "numbers": [1, 2, 3]});

        assert!(parser.serialize(&value, Format::Json)?.contains("\"name\": \"People\""));
        assert!(parser.serialize(&value, Format::Yaml)?.contains("name: People"));
        Ok(())
    }
}
