//! Linting of record schema documents before they are compiled
//!
//! Works on the raw JSON form so that every problem in a document is
//! reported with its path, instead of stopping at the first serde error.
//!
//! Copyright (c) 2025 Dynafield Team
//! Licensed under the Apache-2.0 license

use crate::validation::base::{SchemaValidator, ValidationContext, ValidationMode};
use dynafield_core::fields::{is_valid_email, parse_date, parse_datetime, FieldDefinition, FieldKind};
use dynafield_core::utils::{is_string_empty, is_valid_uuid};
use dynafield_core::{build_dynamic_model, ValidationError, ValidationErrors};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Keys that may hold the descriptor list, record schemas first
const DEFINITION_KEYS: [&str; 4] = ["fieldDefinitions", "field_definitions", "fieldSchema", "field_schema"];

/// Other top-level keys of record schemas and tenant model documents
const DOCUMENT_KEYS: [&str; 7] = ["id", "name", "description", "tenantId", "tenant_id", "userId", "user_id"];

const COMMON_ATTRIBUTES: [&str; 5] = ["__typename", "id", "label", "description", "required"];

fn json_type(value: Option<&Value>) -> &'static str {
    match value {
        None => "nothing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Non-null attribute under its camelCase name or snake_case alias
fn attribute<'a>(object: &'a Map<String, Value>, name: &str) -> Option<(String, &'a Value)> {
    [name.to_string(), snake_case(name)]
        .into_iter()
        .find_map(|key| match object.get(&key) {
            None | Some(Value::Null) => None,
            Some(value) => Some((key, value)),
        })
}

fn out_of_bounds(value: f64, (lower, upper): (Option<f64>, Option<f64>)) -> Option<String> {
    match (lower, upper) {
        (Some(lower), _) if value < lower => Some(format!("{value} is below the minimum {lower}")),
        (_, Some(upper)) if value > upper => Some(format!("{value} is above the maximum {upper}")),
        _ => None,
    }
}

fn expected(what: &str, value: &Value) -> String {
    format!("default must be {what}, found {}", json_type(Some(value)))
}

/// Validator for record schema and tenant model documents
///
/// - **Basic**: the descriptor list exists and every descriptor has a known
///   `__typename`, a label, and nested fields for object descriptors
/// - **Partial**: defaults, constraints and enum values are consistent
/// - **Strict**: no duplicate record keys, no unknown attributes, and the
///   descriptors compile into a model
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordSchemaValidator;

impl RecordSchemaValidator {
    pub fn new() -> Self {
        Self
    }

    fn validate_fields(&self, items: &[Value], ctx: &ValidationContext, errors: &mut Vec<ValidationError>) {
        let mut keys: HashMap<String, usize> = HashMap::new();

        for (index, item) in items.iter().enumerate() {
            let item_ctx = ctx.child_index(index);
            let Some(descriptor) = item.as_object() else {
                errors.push(item_ctx.violation(
                    "field descriptor must be an object",
                    "descriptor_type",
                    "object",
                    json_type(Some(item)),
                ));
                continue;
            };
            let Some(kind) = self.validate_descriptor(descriptor, &item_ctx, errors) else {
                continue;
            };

            if !ctx.mode.includes(ValidationMode::Strict) {
                continue;
            }
            if let Some(label) = descriptor.get("label").and_then(Value::as_str) {
                let key = if kind.lowercases_key() {
                    label.to_lowercase()
                } else {
                    label.to_string()
                };
                if let Some(first) = keys.insert(key.clone(), index) {
                    errors.push(item_ctx.child("label").violation(
                        format!("record key '{key}' is already used by the descriptor at index {first}"),
                        "unique_keys",
                        "unique record key",
                        key,
                    ));
                }
            }
        }
    }

    /// Checks one descriptor, returning its kind when the tag is known
    fn validate_descriptor(
        &self,
        descriptor: &Map<String, Value>,
        ctx: &ValidationContext,
        errors: &mut Vec<ValidationError>,
    ) -> Option<FieldKind> {
        let tag_ctx = ctx.child("__typename");
        let kind = match descriptor.get("__typename") {
            Some(Value::String(tag)) => match FieldKind::from_typename(tag) {
                Some(kind) => kind,
                None => {
                    errors.push(tag_ctx.violation(
                        format!("unknown field type '{tag}'"),
                        "known_typename",
                        "a field descriptor type such as StrField",
                        tag.clone(),
                    ));
                    return None;
                }
            },
            other => {
                errors.push(tag_ctx.violation(
                    "field descriptor is missing its __typename",
                    "known_typename",
                    "string",
                    json_type(other),
                ));
                return None;
            }
        };

        match descriptor.get("label") {
            Some(Value::String(label)) if !is_string_empty(Some(label)) => {}
            None | Some(Value::String(_)) => errors.push(ctx.child("label").error("label cannot be empty")),
            other => errors.push(ctx.child("label").violation(
                "label must be a string",
                "label_type",
                "string",
                json_type(other),
            )),
        }

        if kind == FieldKind::Object {
            let fields_ctx = ctx.child("fields");
            match descriptor.get("fields") {
                Some(Value::Array(children)) => {
                    if children.is_empty() && ctx.mode.includes(ValidationMode::Partial) {
                        errors.push(fields_ctx.error("object field needs at least one nested field"));
                    }
                    self.validate_fields(children, &fields_ctx, errors);
                }
                other => errors.push(fields_ctx.violation(
                    "object field needs a list of nested fields",
                    "fields_type",
                    "array",
                    json_type(other),
                )),
            }
        }

        if ctx.mode.includes(ValidationMode::Partial) {
            self.validate_rules(kind, descriptor, ctx, errors);
        }
        if ctx.mode.includes(ValidationMode::Strict) {
            self.validate_attributes(kind, descriptor, ctx, errors);
        }
        Some(kind)
    }

    fn validate_rules(
        &self,
        kind: FieldKind,
        descriptor: &Map<String, Value>,
        ctx: &ValidationContext,
        errors: &mut Vec<ValidationError>,
    ) {
        let required = match descriptor.get("required") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(required)) => *required,
            other => {
                errors.push(ctx.child("required").violation(
                    "required must be a boolean",
                    "required_type",
                    "boolean",
                    json_type(other),
                ));
                false
            }
        };

        let default = kind
            .attributes()
            .iter()
            .find(|name| name.starts_with("default"))
            .and_then(|name| attribute(descriptor, name));
        if let (true, Some((key, _))) = (required, &default) {
            let label = descriptor.get("label").and_then(Value::as_str).unwrap_or_default();
            errors.push(ctx.child(key).violation(
                format!("Required field '{label}' cannot specify a default value."),
                "required_without_default",
                "no default on a required field",
                "a default value",
            ));
        }

        let bounds = self.validate_bounds(kind, descriptor, ctx, errors);
        if kind == FieldKind::Enum {
            self.validate_enum(descriptor, ctx, errors);
        } else if let Some((key, value)) = default {
            if let Some(message) = self.default_problem(kind, value, bounds) {
                errors.push(ctx.child(&key).error(message));
            }
        }
    }

    /// Reads the kind's constraint pair, reporting malformed or inverted bounds
    fn validate_bounds(
        &self,
        kind: FieldKind,
        descriptor: &Map<String, Value>,
        ctx: &ValidationContext,
        errors: &mut Vec<ValidationError>,
    ) -> (Option<f64>, Option<f64>) {
        let (container, low, high) = match kind {
            FieldKind::Str => ("constraintsStr", "minLength", "maxLength"),
            FieldKind::Int => ("constraintsInt", "geInt", "leInt"),
            FieldKind::Float => ("constraintsFloat", "geFloat", "leFloat"),
            _ => return (None, None),
        };
        let Some((container_key, constraints)) = attribute(descriptor, container) else {
            return (None, None);
        };
        let constraints_ctx = ctx.child(&container_key);
        let Some(constraints) = constraints.as_object() else {
            errors.push(constraints_ctx.violation(
                format!("{container} must be an object"),
                "constraints_type",
                "object",
                json_type(Some(constraints)),
            ));
            return (None, None);
        };

        let integral = kind != FieldKind::Float;
        let mut read = |name: &str| -> Option<f64> {
            let (key, value) = attribute(constraints, name)?;
            let bound_ctx = constraints_ctx.child(&key);
            match value {
                Value::Number(n) if !integral || n.is_i64() || n.is_u64() => {
                    let bound = n.as_f64()?;
                    if kind == FieldKind::Str && bound < 0.0 {
                        errors.push(bound_ctx.violation(
                            format!("{name} cannot be negative"),
                            "non_negative_length",
                            ">= 0",
                            n.to_string(),
                        ));
                        return None;
                    }
                    Some(bound)
                }
                other => {
                    let what = if integral { "integer" } else { "number" };
                    errors.push(bound_ctx.violation(
                        format!("{name} must be a {what}"),
                        "bound_type",
                        what,
                        json_type(Some(other)),
                    ));
                    None
                }
            }
        };
        let lower = read(low);
        let upper = read(high);

        if let (Some(l), Some(u)) = (lower, upper) {
            if l > u {
                errors.push(constraints_ctx.violation(
                    format!("{low} ({l}) is greater than {high} ({u})"),
                    "ordered_bounds",
                    &format!("{low} <= {high}"),
                    format!("{l} > {u}"),
                ));
            }
        }
        (lower, upper)
    }

    fn default_problem(&self, kind: FieldKind, value: &Value, bounds: (Option<f64>, Option<f64>)) -> Option<String> {
        match kind {
            FieldKind::Str => match value.as_str() {
                Some(s) => out_of_bounds(s.chars().count() as f64, bounds).map(|r| format!("default length {r}")),
                None => Some(expected("a string", value)),
            },
            FieldKind::Int => match value.as_i64() {
                Some(n) => out_of_bounds(n as f64, bounds).map(|r| format!("default {r}")),
                None => Some(expected("an integer", value)),
            },
            FieldKind::Float => match value.as_f64() {
                Some(n) => out_of_bounds(n, bounds).map(|r| format!("default {r}")),
                None => Some(expected("a number", value)),
            },
            FieldKind::Bool => (!value.is_boolean()).then(|| expected("a boolean", value)),
            FieldKind::Date => match value.as_str() {
                Some(s) if parse_date(s).is_some() => None,
                _ => Some(format!("default {value} is not a YYYY-MM-DD date")),
            },
            FieldKind::DateTime => match value.as_str() {
                Some(s) if parse_datetime(s).is_some() => None,
                _ => Some(format!("default {value} is not an ISO 8601 datetime")),
            },
            FieldKind::Email => match value.as_str() {
                Some(s) if is_valid_email(s) => None,
                _ => Some(format!("default {value} is not a valid email address")),
            },
            FieldKind::Uuid => match value.as_str() {
                Some(s) if is_valid_uuid(s) => None,
                _ => Some(format!("default {value} is not a valid UUID")),
            },
            FieldKind::Json => (!value.is_object()).then(|| expected("an object", value)),
            FieldKind::List => (!value.is_array()).then(|| expected("a list", value)),
            FieldKind::Enum | FieldKind::Object => None,
        }
    }

    fn validate_enum(&self, descriptor: &Map<String, Value>, ctx: &ValidationContext, errors: &mut Vec<ValidationError>) {
        let values: Vec<&str> = match attribute(descriptor, "allowedValues") {
            Some((key, Value::Array(items))) => {
                let values_ctx = ctx.child(&key);
                if items.is_empty() {
                    errors.push(values_ctx.error("allowedValues must list at least one value"));
                }
                let mut seen = HashSet::new();
                let mut values = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    match item.as_str() {
                        Some(s) if !is_string_empty(Some(s)) => {
                            if !seen.insert(s) {
                                errors.push(values_ctx.child_index(index).error(format!("'{s}' is listed more than once")));
                            }
                            values.push(s);
                        }
                        _ => errors.push(values_ctx.child_index(index).error("enum values must be non-empty strings")),
                    }
                }
                values
            }
            Some((key, other)) => {
                errors.push(ctx.child(&key).violation(
                    "allowedValues must be a list",
                    "allowed_values_type",
                    "array",
                    json_type(Some(other)),
                ));
                return;
            }
            None => {
                errors.push(ctx.child("allowedValues").error("enum field needs allowedValues"));
                return;
            }
        };

        if let Some((key, default)) = attribute(descriptor, "defaultStr") {
            let allowed = default.as_str().is_some_and(|s| values.contains(&s));
            if !allowed {
                errors.push(ctx.child(&key).violation(
                    format!("default {default} is not one of the allowed values"),
                    "enum_default",
                    "one of allowedValues",
                    default.to_string(),
                ));
            }
        }
    }

    fn validate_attributes(
        &self,
        kind: FieldKind,
        descriptor: &Map<String, Value>,
        ctx: &ValidationContext,
        errors: &mut Vec<ValidationError>,
    ) {
        let known: HashSet<String> = COMMON_ATTRIBUTES
            .iter()
            .chain(kind.attributes())
            .flat_map(|name| [name.to_string(), snake_case(name)])
            .collect();
        for key in descriptor.keys().filter(|key| !known.contains(key.as_str())) {
            errors.push(ctx.child(key).violation(
                format!("unknown attribute '{key}' for {kind}"),
                "known_attribute",
                &kind.attributes().join(", "),
                key.clone(),
            ));
        }
    }

    fn validate_document(&self, document: &Map<String, Value>, ctx: &ValidationContext, errors: &mut Vec<ValidationError>) {
        if let Some(id) = document.get("id") {
            if !id.as_str().is_some_and(is_valid_uuid) {
                errors.push(ctx.child("id").violation(
                    format!("id {id} is not a valid UUID"),
                    "uuid_format",
                    "UUID string",
                    id.to_string(),
                ));
            }
        }
        if let Some(name) = document.get("name") {
            if !name.as_str().is_some_and(|s| !is_string_empty(Some(s))) {
                errors.push(ctx.child("name").error("name must be a non-empty string"));
            }
        }
    }

    /// Runs the real compile so anything the lint rules miss is still caught
    fn compile(&self, document: &Map<String, Value>, items: &[Value], ctx: &ValidationContext) -> Option<ValidationError> {
        let definitions: Vec<FieldDefinition> = match serde_json::from_value(Value::Array(items.to_vec())) {
            Ok(definitions) => definitions,
            Err(e) => return Some(ctx.error(format!("field descriptors do not deserialize: {e}"))),
        };
        let name = document.get("name").and_then(Value::as_str).unwrap_or("record name");
        build_dynamic_model(name, &definitions)
            .err()
            .map(|e| ctx.violation(e.to_string(), "compiles", "descriptors that build a model", name))
    }
}

impl SchemaValidator for RecordSchemaValidator {
    type Input = Value;

    fn validate_with_context(&self, input: &Value, ctx: &ValidationContext) -> Result<(), ValidationErrors> {
        let Some(document) = input.as_object() else {
            return Err(ctx
                .violation(
                    "schema document must be an object",
                    "document_type",
                    "object",
                    json_type(Some(input)),
                )
                .into());
        };

        let mut errors = Vec::new();
        let present: Vec<&str> = DEFINITION_KEYS
            .into_iter()
            .filter(|key| document.contains_key(*key))
            .collect();
        let key = match present.as_slice() {
            [] => return Err(ctx.error("document has no fieldDefinitions list").into()),
            [key] => *key,
            [key, ..] => {
                errors.push(ctx.error(format!("descriptors given under several keys: {}", present.join(", "))));
                *key
            }
        };

        let list_ctx = ctx.child(key);
        let items = match &document[key] {
            Value::Array(items) => {
                if items.is_empty() && ctx.mode.includes(ValidationMode::Partial) {
                    errors.push(list_ctx.error("at least one field definition is required"));
                }
                self.validate_fields(items, &list_ctx, &mut errors);
                Some(items)
            }
            other => {
                errors.push(list_ctx.violation(
                    "field definitions must be a list",
                    "definitions_type",
                    "array",
                    json_type(Some(other)),
                ));
                None
            }
        };

        if ctx.mode.includes(ValidationMode::Partial) {
            self.validate_document(document, ctx, &mut errors);
        }

        if ctx.mode.includes(ValidationMode::Strict) {
            for unknown in document
                .keys()
                .filter(|k| !DEFINITION_KEYS.contains(&k.as_str()) && !DOCUMENT_KEYS.contains(&k.as_str()))
            {
                errors.push(ctx.child(unknown).error(format!("unknown top-level key '{unknown}'")));
            }
            if let (true, Some(items)) = (errors.is_empty(), items) {
                errors.extend(self.compile(document, items, &list_ctx));
            }
        }

        debug!(mode = ?ctx.mode, errors = errors.len(), "validated record schema document");
        ValidationErrors::from(errors).into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn messages(result: Result<(), ValidationErrors>) -> Vec<String> {
        result.unwrap_err().iter().map(|e| format!("{} {}", e.path, e.message)).collect()
    }

    #[test]
    fn test_valid_document_passes_every_mode() {
        let document = json!({
            "name": "People",
            "fieldDefinitions": [
                {"__typename": "StrField", "label": "name", "required": true, "constraintsStr": {"minLength": 1}},
                {"__typename": "EnumField", "label": "Status", "allowedValues": ["new", "active"], "defaultStr": "new"},
                {"__typename": "ObjectField", "label": "address", "fields": [
                    {"__typename": "StrField", "label": "city"}
                ]}
            ]
        });
        let validator = RecordSchemaValidator::new();
        assert!(validator.validate_basic(&document).is_ok());
        assert!(validator.validate_partial(&document).is_ok());
        assert!(validator.validate(&document).is_ok());
    }

    #[test]
    fn test_basic_reports_structure() {
        let document = json!({"fieldDefinitions": [
            {"__typename": "TextField", "label": "a"},
            {"__typename": "IntField", "label": "  "},
            {"__typename": "ObjectField", "label": "nested"},
            "loose"
        ]});
        let errors = messages(RecordSchemaValidator::new().validate_basic(&document));
        assert_eq!(errors.len(), 4, "{errors:?}");
        assert!(errors[0].starts_with("$.fieldDefinitions[0].__typename unknown field type 'TextField'"));
        assert!(errors[1].starts_with("$.fieldDefinitions[1].label"));
        assert!(errors[2].starts_with("$.fieldDefinitions[2].fields"));
        assert!(errors[3].starts_with("$.fieldDefinitions[3]"));
    }

    #[test]
    fn test_partial_rules() {
        let document = json!({"id": "not-a-uuid", "fieldDefinitions": [
            {"__typename": "IntField", "label": "age", "required": true, "defaultInt": 3},
            {"__typename": "IntField", "label": "n", "constraintsInt": {"geInt": 10, "leInt": 1}},
            {"__typename": "StrField", "label": "s", "constraintsStr": {"min_length": -1}},
            {"__typename": "EmailField", "label": "mail", "defaultEmail": "nope"},
            {"__typename": "EnumField", "label": "e", "allowedValues": ["a", "a"], "defaultStr": "b"},
            {"__typename": "FloatField", "label": "f", "defaultFloat": 5.5, "constraintsFloat": {"leFloat": 1.0}}
        ]});
        let validator = RecordSchemaValidator::new();
        assert!(validator.validate_basic(&document).is_ok());

        let errors = validator.validate_partial(&document).unwrap_err();
        assert!(errors.at("$.fieldDefinitions[0].defaultInt").is_some());
        assert!(errors.at("$.fieldDefinitions[1].constraintsInt").is_some());
        assert!(errors.at("$.fieldDefinitions[2].constraintsStr.min_length").is_some());
        assert!(errors.at("$.fieldDefinitions[3].defaultEmail").is_some());
        assert!(errors.at("$.fieldDefinitions[4].allowedValues[1]").is_some());
        assert!(errors.at("$.fieldDefinitions[4].defaultStr").is_some());
        assert!(errors.at("$.fieldDefinitions[5].defaultFloat").is_some());
        assert!(errors.at("$.id").is_some());
    }

    #[test]
    fn test_strict_rules() {
        let document = json!({"extra": 1, "fieldDefinitions": [
            {"__typename": "BoolField", "label": "Active"},
            {"__typename": "BoolField", "label": "active", "colour": "red"}
        ]});
        let validator = RecordSchemaValidator::new();
        assert!(validator.validate_partial(&document).is_ok());

        let errors = validator.validate(&document).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.at("$.fieldDefinitions[1].label").is_some());
        assert!(errors.at("$.fieldDefinitions[1].colour").is_some());
        assert!(errors.at("$.extra").is_some());
    }

    #[test]
    fn test_snake_case_attributes_are_known() {
        let document = json!({"field_schema": [
            {"__typename": "StrField", "label": "title", "default_str": "x", "constraints_str": {"max_length": 5}}
        ], "tenant_id": "t", "user_id": "u"});
        assert!(RecordSchemaValidator::new().validate(&document).is_ok());
    }

    #[test]
    fn test_missing_definitions() {
        let errors = RecordSchemaValidator::new().validate_basic(&json!({"name": "x"})).unwrap_err();
        assert_eq!(errors.iter().next().unwrap().path, "$");
        assert!(RecordSchemaValidator::new().validate_basic(&json!([1])).is_err());
    }
}
