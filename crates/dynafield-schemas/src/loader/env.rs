//! `${ENV:VAR}` expansion inside loaded documents
//!
//! `${ENV:NAME}` is replaced by the variable's value, `${ENV:NAME:fallback}`
//! falls back to the literal after the second colon, and `\${` escapes a
//! literal `${`.

use crate::loader::error::{LoaderError, LoaderResult};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Expands environment references, with optional overrides taking precedence
#[derive(Debug, Clone, Default)]
pub struct EnvExpander {
    overrides: HashMap<String, String>,
}

impl EnvExpander {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(name.into(), value.into());
        self
    }

    fn lookup(&self, name: &str) -> Option<String> {
        self.overrides
            .get(name)
            .cloned()
            .or_else(|| std::env::var(name).ok())
    }

    /// Expand every string, object key included
    pub fn expand(&self, value: Value, path: &Path) -> LoaderResult<Value> {
        match value {
            Value::String(s) => Ok(Value::String(self.expand_str(&s, path)?)),
            Value::Object(obj) => {
                let mut expanded = Map::with_capacity(obj.len());
                for (key, val) in obj {
                    expanded.insert(self.expand_str(&key, path)?, self.expand(val, path)?);
                }
                Ok(Value::Object(expanded))
            }
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.expand(item, path))
                .collect::<LoaderResult<Vec<_>>>()
                .map(Value::Array),
            other => Ok(other),
        }
    }

    pub fn expand_str(&self, s: &str, path: &Path) -> LoaderResult<String> {
        let mut result = String::with_capacity(s.len());
        let mut chars = s.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch == '\\' && chars.peek() == Some(&'$') {
                chars.next();
                if chars.peek() == Some(&'{') {
                    chars.next();
                    result.push_str("${");
                } else {
                    result.push_str("\\$");
                }
            } else if ch == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut spec = String::new();
                let mut depth = 1;
                for ch in chars.by_ref() {
                    match ch {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    spec.push(ch);
                }

                if depth != 0 {
                    return Err(env_error(spec, path, "Unclosed environment variable reference"));
                }
                result.push_str(&self.resolve(&spec, path)?);
            } else {
                result.push(ch);
            }
        }

        Ok(result)
    }

    fn resolve(&self, spec: &str, path: &Path) -> LoaderResult<String> {
        let Some(reference) = spec.strip_prefix("ENV:") else {
            return Err(env_error(spec.to_string(), path, "Environment variable must use ENV: prefix"));
        };
        let (name, fallback) = match reference.split_once(':') {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (reference, None),
        };

        match (self.lookup(name), fallback) {
            (Some(value), _) => Ok(value),
            (None, Some(fallback)) => Ok(fallback.to_string()),
            (None, None) => Err(env_error(
                name.to_string(),
                path,
                "Environment variable not found and no default provided",
            )),
        }
    }
}

fn env_error(var_name: String, path: &Path, reason: &str) -> LoaderError {
    LoaderError::environment_error(var_name, PathBuf::from(path), reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expansion_with_overrides_and_defaults() {
        let expander = EnvExpander::new().with_var("DYNAFIELD_TEST_LABEL", "Customer");
        let value = json!({
            "label": "${ENV:DYNAFIELD_TEST_LABEL}",
            "description": "${ENV:DYNAFIELD_TEST_MISSING:fallback text}",
            "nested": ["id of ${ENV:DYNAFIELD_TEST_LABEL}"]
        });

        let expanded = expander.expand(value, Path::new("schema.yaml")).unwrap();
        assert_eq!(
            expanded,
            json!({
                "label": "Customer",
                "description": "fallback text",
                "nested": ["id of Customer"]
            })
        );
    }

    #[test]
    fn test_escapes_and_errors() {
        let expander = EnvExpander::new();
        let path = Path::new("schema.yaml");

        assert_eq!(expander.expand_str("\\${ENV:KEEP}", path).unwrap(), "${ENV:KEEP}");
        assert_eq!(expander.expand_str("cost: $5", path).unwrap(), "cost: $5");

        assert!(matches!(
            expander.expand_str("${ENV:DYNAFIELD_TEST_SURELY_UNSET}", path),
            Err(LoaderError::EnvironmentError { .. })
        ));
        assert!(expander.expand_str("${ENV:UNCLOSED", path).is_err());
        assert!(expander.expand_str("${HOME}", path).is_err());
    }
}
