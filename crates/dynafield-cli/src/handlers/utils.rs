//! Shared utilities for command handlers

use crate::config::Config;
use crate::error::{Error, Result};
use dynafield_core::{DynamicModelDocument, FieldDefinition, FieldOverride, RecordSchemaDefinition};
use dynafield_schemas::{SchemaLoader, SchemaParser};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Keys that mark a tenant model document rather than a record schema
const DOCUMENT_KEYS: [&str; 2] = ["fieldSchema", "field_schema"];

/// Resolve a schema argument, falling back to the configured schemas directory
pub fn resolve_schema_path(path: &Path, config: &Config) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    if path.is_relative() {
        if let Some(candidate) = config.paths.schemas_dir.as_ref().map(|dir| dir.join(path)) {
            if candidate.exists() {
                debug!(path = %candidate.display(), "resolved schema in schemas_dir");
                return Ok(candidate);
            }
        }
    }
    Err(Error::FileNotFound {
        path: path.to_path_buf(),
    })
}

pub fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Load either document shape as a record schema definition
///
/// Tenant documents keep their id and description; their tenant and user
/// ids have no counterpart and are dropped.
pub fn load_schema_definition(loader: &mut SchemaLoader, path: &Path) -> Result<RecordSchemaDefinition> {
    let value = loader.load_value(path)?;
    let is_document = value
        .as_object()
        .is_some_and(|map| DOCUMENT_KEYS.iter().any(|key| map.contains_key(*key)));

    if is_document {
        let DynamicModelDocument {
            id,
            name,
            description,
            field_schema,
            ..
        } = loader.load_document(path)?;
        Ok(RecordSchemaDefinition::new(name, field_schema)
            .with_id(id)
            .with_description(description))
    } else {
        Ok(loader.load_record_schema(path)?)
    }
}

/// Records read from a file holding one object or a list of them
#[derive(Debug, Clone, PartialEq)]
pub enum Records {
    One(Value),
    Many(Vec<Value>),
}

impl Records {
    pub fn len(&self) -> usize {
        match self {
            Records::One(_) => 1,
            Records::Many(items) => items.len(),
        }
    }

    pub fn into_vec(self) -> Vec<Value> {
        match self {
            Records::One(item) => vec![item],
            Records::Many(items) => items,
        }
    }
}

pub fn load_records(path: &Path) -> Result<Records> {
    ensure_exists(path)?;
    let (value, _) = SchemaParser::new().parse_file(path)?;
    match value {
        Value::Array(items) => Ok(Records::Many(items)),
        value @ Value::Object(_) => Ok(Records::One(value)),
        _ => Err(Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "a record object or a list of records".to_string(),
        }),
    }
}

/// Parse a `PARAM=JSON` override argument
pub fn parse_override(raw: &str) -> Result<(String, FieldOverride)> {
    let (param, json) = raw
        .split_once('=')
        .ok_or_else(|| Error::invalid_args(format!("override '{raw}' is not PARAM=JSON")))?;
    let param = param.trim();
    if param.is_empty() {
        return Err(Error::invalid_args(format!("override '{raw}' names no parameter")));
    }
    let value: Value = serde_json::from_str(json)
        .map_err(|e| Error::invalid_args(format!("override for '{param}' is not valid JSON: {e}")))?;
    Ok((param.to_string(), FieldOverride::from_json(&value)?))
}

/// One table row per descriptor: label, key, kind, required
pub fn field_rows(fields: &[FieldDefinition]) -> Vec<Vec<String>> {
    fields
        .iter()
        .map(|field| {
            vec![
                field.label().to_string(),
                field.key(),
                field.kind().typename().to_string(),
                if field.common().required { "yes" } else { "" }.to_string(),
            ]
        })
        .collect()
}

pub const FIELD_HEADERS: [&str; 4] = ["Label", "Key", "Kind", "Required"];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_override() {
        let (param, value) = parse_override("age={\"required\": true}").unwrap();
        assert_eq!(param, "age");
        assert!(matches!(value, FieldOverride::Patch(_)));

        assert!(matches!(parse_override("age"), Err(Error::InvalidArgs(_))));
        assert!(matches!(parse_override("=1"), Err(Error::InvalidArgs(_))));
        assert!(matches!(parse_override("age={"), Err(Error::InvalidArgs(_))));
        assert!(matches!(parse_override("age=[1]"), Err(Error::Core(_))));
    }

    #[test]
    fn test_load_records_shapes() {
        let dir = tempdir().unwrap();
        let one = dir.path().join("one.json");
        let many = dir.path().join("many.yaml");
        let scalar = dir.path().join("scalar.json");
        fs::write(&one, r#"{"name": "Ada"}"#).unwrap();
        fs::write(&many, "- name: Ada\n- name: Grace\n").unwrap();
        fs::write(&scalar, "42").unwrap();

        assert_eq!(load_records(&one).unwrap(), Records::One(json!({"name": "Ada"})));
        assert_eq!(load_records(&many).unwrap().len(), 2);
        assert!(load_records(&scalar).is_err());
        assert!(matches!(
            load_records(&dir.path().join("missing.json")),
            Err(Error::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_load_schema_definition_accepts_documents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("contact.json");
        fs::write(
            &path,
            json!({
                "tenantId": "t-1",
                "userId": "u-1",
                "name": "Contact",
                "description": "CRM contact",
                "fieldSchema": [{"__typename": "EmailField", "label": "Email", "required": true}]
            })
            .to_string(),
        )
        .unwrap();

        let schema = load_schema_definition(&mut SchemaLoader::new(), &path).unwrap();
        assert_eq!(schema.name, "Contact");
        assert_eq!(schema.description.as_deref(), Some("CRM contact"));
        assert_eq!(field_rows(schema.fields()), vec![vec![
            "Email".to_string(),
            "email".to_string(),
            "EmailField".to_string(),
            "yes".to_string()
        ]]);
    }

    #[test]
    fn test_resolve_schema_path_uses_schemas_dir() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("people.yaml"), "name: People\n").unwrap();

        let mut config = Config::default();
        assert!(resolve_schema_path(Path::new("people.yaml"), &config).is_err());

        config.paths.schemas_dir = Some(dir.path().to_path_buf());
        let resolved = resolve_schema_path(Path::new("people.yaml"), &config).unwrap();
        assert_eq!(resolved, dir.path().join("people.yaml"));
    }
}
