//! Record schema document validation
//!
//! Documents are checked on their raw JSON form in one of three modes:
//!
//! - **Basic**: document structure and descriptor tags
//! - **Partial**: plus default, constraint and enum consistency (development mode)
//! - **Strict**: plus duplicate keys, unknown attributes and a full compile
//!
//! Errors reuse the record validation types from `dynafield-core`, so every
//! problem carries a JSON path such as `$.fieldDefinitions[2].defaultInt`.
//!
//! Copyright (c) 2025 Dynafield Team
//! Licensed under the Apache-2.0 license

pub mod base;
pub mod record_schema;

pub use base::{SchemaValidator, ValidationContext, ValidationMode};
pub use dynafield_core::{ValidationError, ValidationErrors};
pub use record_schema::RecordSchemaValidator;

/// Convenience function to create a record schema validator
///
/// # Examples
///
/// ```rust
/// use dynafield_schemas::validation::{create_record_schema_validator, SchemaValidator};
/// use serde_json::json;
///
/// let validator = create_record_schema_validator();
/// let schema = json!({
///     "name": "People",
///     "fieldDefinitions": [
///         {"__typename": "StrField", "label": "name", "required": true}
///     ]
/// });
///
/// assert!(validator.validate(&schema).is_ok());
/// ```
pub fn create_record_schema_validator() -> RecordSchemaValidator {
    RecordSchemaValidator::new()
}

/// Validation configuration for batch operations
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    pub mode: ValidationMode,
    /// Stop at the first invalid document
    pub fail_fast: bool,
    /// Maximum number of errors to collect (0 = unlimited)
    pub max_errors: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self::strict()
    }
}

impl ValidationConfig {
    pub fn strict() -> Self {
        Self::with_mode(ValidationMode::Strict)
    }

    pub fn partial() -> Self {
        Self::with_mode(ValidationMode::Partial)
    }

    pub fn basic() -> Self {
        Self::with_mode(ValidationMode::Basic)
    }

    fn with_mode(mode: ValidationMode) -> Self {
        Self {
            mode,
            fail_fast: false,
            max_errors: 0,
        }
    }

    pub fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }
}

/// Validate many documents, prefixing each error path with the document index
/// (`$[3].fieldDefinitions[0].label`)
pub fn validate_record_schemas_batch(
    schemas: &[serde_json::Value],
    config: &ValidationConfig,
) -> Result<(), ValidationErrors> {
    let validator = create_record_schema_validator();
    let mut errors = ValidationErrors::new();

    for (i, schema) in schemas.iter().enumerate() {
        let context = ValidationContext::new(config.mode).child_index(i);
        let Err(found) = validator.validate_with_context(schema, &context) else {
            continue;
        };

        for error in found {
            if config.max_errors > 0 && errors.len() >= config.max_errors {
                return errors.into_result();
            }
            errors.add(error);
        }
        if config.fail_fast {
            break;
        }
    }

    errors.into_result()
}
