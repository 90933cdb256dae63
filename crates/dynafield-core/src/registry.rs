//! Record schema definitions and an in-process registry of them
//!
//! Copyright (c) 2025 Dynafield Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::fields::FieldDefinition;
use crate::model::{build_dynamic_model, DynamicModel, Record};
use crate::utils::uuid_7;
use crate::validation::{ValidationContext, ValidationErrors};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

fn default_record_name() -> String {
    "record name".to_string()
}

/// A named, identified list of field descriptors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSchemaDefinition {
    #[serde(default = "uuid_7")]
    pub id: Uuid,
    #[serde(default = "default_record_name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        rename = "fieldDefinitions",
        alias = "field_definitions",
        skip_serializing_if = "Option::is_none"
    )]
    pub field_definitions: Option<Vec<FieldDefinition>>,
}

impl RecordSchemaDefinition {
    pub fn new(name: impl Into<String>, field_definitions: Vec<FieldDefinition>) -> Self {
        Self {
            id: uuid_7(),
            name: name.into(),
            description: None,
            field_definitions: Some(field_definitions),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        self.field_definitions.as_deref().unwrap_or_default()
    }

    /// Compile the descriptors into a model named after the schema
    pub fn build_record_model(&self) -> Result<DynamicModel> {
        match self.field_definitions.as_deref() {
            Some(definitions) if !definitions.is_empty() => build_dynamic_model(&self.name, definitions),
            _ => Err(Error::model_build(&self.name, "No field definitions defined")),
        }
    }
}

impl Default for RecordSchemaDefinition {
    fn default() -> Self {
        Self {
            id: uuid_7(),
            name: default_record_name(),
            description: None,
            field_definitions: None,
        }
    }
}

/// Thread-safe registry of schema definitions keyed by id
///
/// Compiled models are cached per id and dropped when the id is
/// re-registered.
#[derive(Debug, Default)]
pub struct RecordSchemaRegistry {
    schemas: RwLock<HashMap<Uuid, Arc<RecordSchemaDefinition>>>,
    models: RwLock<HashMap<Uuid, Arc<DynamicModel>>>,
}

impl RecordSchemaRegistry {
    pub fn new<I>(schemas: I) -> Self
    where
        I: IntoIterator<Item = RecordSchemaDefinition>,
    {
        let registry = Self::default();
        for schema in schemas {
            registry.register(schema);
        }
        registry
    }

    /// Add or replace a schema, returning the shared handle
    pub fn register(&self, schema: RecordSchemaDefinition) -> Arc<RecordSchemaDefinition> {
        let id = schema.id;
        let schema = Arc::new(schema);
        let replaced = self
            .schemas
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::clone(&schema))
            .is_some();
        self.models.write().unwrap_or_else(PoisonError::into_inner).remove(&id);
        info!(schema_id = %id, name = %schema.name, replaced, "registered record schema");
        schema
    }

    pub fn get(&self, id: Uuid) -> Result<Arc<RecordSchemaDefinition>> {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(Error::SchemaNotFound { id })
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.schemas.read().unwrap_or_else(PoisonError::into_inner).contains_key(&id)
    }

    /// All registered schemas, ordered by id
    pub fn list(&self) -> Vec<Arc<RecordSchemaDefinition>> {
        let mut schemas: Vec<_> = self
            .schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        schemas.sort_by_key(|schema| schema.id);
        schemas
    }

    pub fn len(&self) -> usize {
        self.schemas.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compiled model for a schema, built once and cached
    pub fn build_model(&self, id: Uuid) -> Result<Arc<DynamicModel>> {
        if let Some(model) = self.models.read().unwrap_or_else(PoisonError::into_inner).get(&id) {
            return Ok(Arc::clone(model));
        }

        let schema = self.get(id)?;
        let model = Arc::new(schema.build_record_model()?);

        // `register` swaps the schema before dropping the cached model, so a
        // schema still current under the models lock cannot be stale
        let mut models = self.models.write().unwrap_or_else(PoisonError::into_inner);
        match self.get(id) {
            Ok(current) if Arc::ptr_eq(&current, &schema) => {
                debug!(schema_id = %id, model = %model.name(), "caching compiled model");
                models.insert(id, Arc::clone(&model));
            }
            _ => debug!(schema_id = %id, "schema replaced while compiling, not caching"),
        }
        Ok(model)
    }

    /// Validate stored records against a schema
    pub fn build_records(&self, id: Uuid, stored: &[Value]) -> Result<Vec<Record>> {
        let model = self.build_model(id)?;
        Ok(model.validate_many(stored)?)
    }

    /// Apply positional patches to stored records
    ///
    /// `updates[i]` is shallow-merged over `stored[i]`; updates beyond the
    /// stored records become new records of their own.
    pub fn mutate_records(&self, id: Uuid, stored: &[Value], updates: &[Value]) -> Result<Vec<Record>> {
        let model = self.build_model(id)?;
        let root = ValidationContext::default();
        let mut errors = ValidationErrors::new();
        let mut records = Vec::with_capacity(stored.len().max(updates.len()));

        for index in 0..stored.len().max(updates.len()) {
            let merged = match (stored.get(index), updates.get(index)) {
                (Some(Value::Object(current)), Some(Value::Object(patch))) => {
                    let mut merged = current.clone();
                    merged.extend(patch.iter().map(|(k, v)| (k.clone(), v.clone())));
                    Value::Object(merged)
                }
                (Some(current), Some(Value::Object(patch))) if current.is_null() => Value::Object(patch.clone()),
                (_, Some(patch)) if !patch.is_object() => patch.clone(),
                (Some(current), _) => current.clone(),
                (None, Some(patch)) => patch.clone(),
                (None, None) => continue,
            };
            match model.validate_with_context(&merged, &root.child_index(index)) {
                Ok(record) => records.push(record),
                Err(record_errors) => errors.extend(record_errors),
            }
        }

        errors.into_result()?;
        debug!(schema_id = %id, records = records.len(), "mutated records");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldCommon, IntField, StrField};
    use serde_json::json;

    fn sample_schema() -> RecordSchemaDefinition {
        RecordSchemaDefinition::new(
            "BookingRecord",
            vec![
                StrField {
                    common: FieldCommon::new("customer_name"),
                    ..Default::default()
                }
                .into(),
                IntField {
                    common: FieldCommon::new("party_size"),
                    ..Default::default()
                }
                .into(),
            ],
        )
        .with_description("Schema for booking records")
    }

    #[test]
    fn test_definition_serde_defaults() {
        let schema: RecordSchemaDefinition = serde_json::from_value(json!({
            "field_definitions": [{"__typename": "StrField", "label": "a"}]
        }))
        .unwrap();
        assert_eq!(schema.name, "record name");
        assert_eq!(schema.id.get_version_num(), 7);
        assert_eq!(schema.fields().len(), 1);

        let value = serde_json::to_value(&schema).unwrap();
        assert!(value.get("fieldDefinitions").is_some());
    }

    #[test]
    fn test_build_record_model_requires_fields() {
        let err = RecordSchemaDefinition::default().build_record_model().unwrap_err();
        assert!(err.to_string().contains("No field definitions defined"));
    }

    #[test]
    fn test_model_cache_is_invalidated_on_register() {
        let schema = sample_schema();
        let id = schema.id;
        let registry = RecordSchemaRegistry::new([schema.clone()]);

        let first = registry.build_model(id).unwrap();
        let second = registry.build_model(id).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        registry.register(schema);
        let third = registry.build_model(id).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn test_unknown_schema() {
        let registry = RecordSchemaRegistry::default();
        let id = uuid_7();
        assert!(matches!(registry.get(id), Err(Error::SchemaNotFound { id: missing }) if missing == id));
        assert!(registry.build_records(id, &[]).is_err());
    }
}
