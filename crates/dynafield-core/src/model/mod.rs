//! Dynamic model builder
//!
//! A [`DynamicModel`] is the compiled form of a descriptor list: an ordered
//! set of [`CompiledField`]s under a model name. It validates JSON objects
//! into [`Record`]s and describes itself as JSON Schema.
//!
//! Copyright (c) 2025 Dynafield Team
//! Licensed under the Apache-2.0 license

mod coerce;
mod json_schema;
mod record;

pub use record::{DumpOptions, FieldValue, MergeOptions, Record};

use crate::error::{Error, Result};
use crate::fields::{CompiledField, FieldDefinition};
use crate::validation::{ValidationContext, ValidationError, ValidationErrors, ValidationMode};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug)]
struct ModelInner {
    name: String,
    fields: Vec<CompiledField>,
}

/// A record shape assembled at runtime; cheap to clone
#[derive(Clone)]
pub struct DynamicModel {
    inner: Arc<ModelInner>,
}

impl fmt::Debug for DynamicModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicModel")
            .field("name", &self.inner.name)
            .field("fields", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Compile every descriptor into a model named `name`
///
/// When two descriptors share a key the later one wins but keeps the
/// position of the first.
pub fn build_dynamic_model(name: impl Into<String>, definitions: &[FieldDefinition]) -> Result<DynamicModel> {
    let name = name.into();
    let mut fields: Vec<CompiledField> = Vec::with_capacity(definitions.len());

    for definition in definitions {
        let compiled = definition.compile()?;
        match fields.iter_mut().find(|f| f.key == compiled.key) {
            Some(existing) => {
                debug!(model = %name, key = %compiled.key, "duplicate field key, later descriptor replaces earlier one");
                *existing = compiled;
            }
            None => fields.push(compiled),
        }
    }

    if name.trim().is_empty() {
        return Err(Error::model_build(name, "model name cannot be empty"));
    }

    debug!(model = %name, fields = fields.len(), "built dynamic model");
    Ok(DynamicModel {
        inner: Arc::new(ModelInner { name, fields }),
    })
}

impl DynamicModel {
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn fields(&self) -> &[CompiledField] {
        &self.inner.fields
    }

    pub fn field(&self, key: &str) -> Option<&CompiledField> {
        self.inner.fields.iter().find(|f| f.key == key)
    }

    pub(crate) fn position(&self, key: &str) -> Option<usize> {
        self.inner.fields.iter().position(|f| f.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.fields.iter().map(|f| f.key.as_str())
    }

    /// Records of the two models can be merged into each other: the same
    /// compiled model, or one with the same name and key layout
    pub fn is_same_model(&self, other: &DynamicModel) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.inner.name == other.inner.name && self.keys().eq(other.keys()))
    }

    /// Validate one object, dropping unknown keys
    pub fn validate(&self, input: &Value) -> std::result::Result<Record, ValidationErrors> {
        self.validate_with_context(input, &ValidationContext::default())
    }

    /// Validate one object, rejecting unknown keys
    pub fn validate_strict(&self, input: &Value) -> std::result::Result<Record, ValidationErrors> {
        self.validate_with_context(input, &ValidationContext::new(ValidationMode::Strict))
    }

    pub fn validate_with_context(
        &self,
        input: &Value,
        context: &ValidationContext,
    ) -> std::result::Result<Record, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match coerce::validate_object(self, input, context, false, &mut errors) {
            Some(record) if errors.is_empty() => Ok(record),
            _ => Err(errors),
        }
    }

    /// Validate a batch; error paths are prefixed with the item index
    pub fn validate_many(&self, inputs: &[Value]) -> std::result::Result<Vec<Record>, ValidationErrors> {
        self.validate_many_with_mode(inputs, ValidationMode::default())
    }

    pub fn validate_many_with_mode(
        &self,
        inputs: &[Value],
        mode: ValidationMode,
    ) -> std::result::Result<Vec<Record>, ValidationErrors> {
        let root = ValidationContext::new(mode);
        let mut errors = ValidationErrors::new();
        let mut records = Vec::with_capacity(inputs.len());

        for (index, input) in inputs.iter().enumerate() {
            if let Some(record) = coerce::validate_object(self, input, &root.child_index(index), false, &mut errors) {
                records.push(record);
            }
        }

        errors.into_result().map(|_| records)
    }

    /// Validate, replacing every invalid field with null instead of failing
    ///
    /// Only a non-object input is still an error.
    pub fn safe_validate(&self, input: &Value) -> std::result::Result<Record, ValidationErrors> {
        let context = ValidationContext::default();
        let mut errors = ValidationErrors::new();
        let record = coerce::validate_object(self, input, &context, true, &mut errors);
        match record {
            Some(record) => {
                for error in errors.iter() {
                    warn!(model = %self.name(), path = %error.path, message = %error.message, "field reset to null");
                }
                Ok(record)
            }
            None => Err(errors),
        }
    }

    /// A record where every field holds its default (or null)
    pub fn empty_record(&self) -> Record {
        let values = self.fields().iter().map(coerce::default_value).collect();
        Record::from_parts(self.clone(), values, Default::default())
    }

    /// JSON Schema describing records of this model
    pub fn json_schema(&self) -> Value {
        json_schema::model_schema(self)
    }

    pub(crate) fn unknown_key_error(path: &str) -> ValidationError {
        ValidationError::rule(path, "Extra inputs are not permitted", "additional_properties", "a known field", "unknown key")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldCommon, IntField, StrField};
    use serde_json::json;

    fn people_model() -> DynamicModel {
        let definitions: Vec<FieldDefinition> = serde_json::from_value(json!([
            {"__typename": "StrField", "label": "name", "required": true},
            {"__typename": "IntField", "label": "age", "constraintsInt": {"geInt": 0}},
        ]))
        .unwrap();
        build_dynamic_model("Person", &definitions).unwrap()
    }

    #[test]
    fn test_duplicate_keys_keep_first_position() {
        let definitions: Vec<FieldDefinition> = vec![
            StrField {
                common: FieldCommon::new("a"),
                ..Default::default()
            }
            .into(),
            StrField {
                common: FieldCommon::new("b"),
                ..Default::default()
            }
            .into(),
            IntField {
                common: FieldCommon::new("a"),
                ..Default::default()
            }
            .into(),
        ];
        let model = build_dynamic_model("Dup", &definitions).unwrap();
        assert_eq!(model.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(model.fields()[0].kind.type_name(), "integer");
    }

    #[test]
    fn test_validate_many_prefixes_index() {
        let model = people_model();
        let err = model
            .validate_many(&[json!({"name": "a"}), json!({"age": -1})])
            .unwrap_err();
        assert!(err.at("$[1].name").is_some());
        assert!(err.at("$[1].age").is_some());
        assert_eq!(err.len(), 2);
    }

    #[test]
    fn test_strict_mode_rejects_unknown_keys() {
        let model = people_model();
        assert!(model.validate(&json!({"name": "a", "extra": 1})).is_ok());
        let err = model.validate_strict(&json!({"name": "a", "extra": 1})).unwrap_err();
        assert_eq!(err.at("$.extra").unwrap().message, "Extra inputs are not permitted");
    }

    #[test]
    fn test_safe_validate_nulls_invalid_fields() {
        let model = people_model();
        let record = model.safe_validate(&json!({"name": "a", "age": "old"})).unwrap();
        assert!(record.get("age").unwrap().is_null());
        assert!(record.is_set("age"));
        assert!(model.safe_validate(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_empty_model_name_rejected() {
        assert!(build_dynamic_model(" ", &[]).is_err());
    }
}
