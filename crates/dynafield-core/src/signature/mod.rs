//! Field descriptors inferred from a function signature
//!
//! A signature is plain data: a function name plus typed, optionally
//! defaulted parameters. It can be built directly or parsed from Rust-style
//! text, where string-literal unions (`"a" | "b"`) stand for enums and
//! `= <json>` supplies a default:
//!
//! ```rust
//! use dynafield_core::signature::FunctionSignature;
//!
//! let signature = FunctionSignature::parse(
//!     r#"fn create_user(name: String, contact_email: String, status: "new" | "active" = "new")"#,
//! ).unwrap();
//! let model = signature.build_model(None, &Default::default()).unwrap();
//! assert_eq!(model.name(), "Create_userModel");
//! ```
//!
//! Copyright (c) 2025 Dynafield Team
//! Licensed under the Apache-2.0 license

mod parser;

use crate::error::{Error, Result};
use crate::fields::{FieldDefinition, FieldKind};
use crate::model::{build_dynamic_model, DynamicModel};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// The declared type of a parameter
#[derive(Debug, Clone, PartialEq)]
pub enum TypeAnnotation {
    /// `std::collections::HashMap<String, i64>`
    Path {
        segments: Vec<String>,
        args: Vec<TypeAnnotation>,
    },
    /// `"a" | "b"`
    Literal(Vec<String>),
    /// `[T]` or `[T; N]`
    Slice(Box<TypeAnnotation>),
    Tuple(Vec<TypeAnnotation>),
    /// Inline `{ name: T, .. }`
    Struct(Vec<(String, TypeAnnotation)>),
}

impl TypeAnnotation {
    pub fn named(name: &str) -> Self {
        Self::generic(name, Vec::new())
    }

    pub fn generic(name: &str, args: Vec<TypeAnnotation>) -> Self {
        TypeAnnotation::Path {
            segments: name.split("::").map(String::from).collect(),
            args,
        }
    }

    pub fn optional(inner: TypeAnnotation) -> Self {
        Self::generic("Option", vec![inner])
    }

    pub fn literal<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeAnnotation::Literal(values.into_iter().map(Into::into).collect())
    }

    pub fn object<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, TypeAnnotation)>,
        S: Into<String>,
    {
        TypeAnnotation::Struct(fields.into_iter().map(|(n, t)| (n.into(), t)).collect())
    }

    fn last_segment(&self) -> Option<(&str, &[TypeAnnotation])> {
        match self {
            TypeAnnotation::Path { segments, args } => segments.last().map(|s| (s.as_str(), args.as_slice())),
            _ => None,
        }
    }

    /// Strip `Option`, `Box`, `Arc` and `Rc` wrappers
    fn unwrap_transparent(&self) -> &TypeAnnotation {
        match self.last_segment() {
            Some(("Option" | "Box" | "Arc" | "Rc", [inner])) => inner.unwrap_transparent(),
            _ => self,
        }
    }
}

impl fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeAnnotation::Path { segments, args } => {
                write!(f, "{}", segments.join("::"))?;
                if !args.is_empty() {
                    let args: Vec<String> = args.iter().map(ToString::to_string).collect();
                    write!(f, "<{}>", args.join(", "))?;
                }
                Ok(())
            }
            TypeAnnotation::Literal(values) => {
                let quoted: Vec<String> = values.iter().map(|v| format!("{v:?}")).collect();
                write!(f, "{}", quoted.join(" | "))
            }
            TypeAnnotation::Slice(inner) => write!(f, "[{inner}]"),
            TypeAnnotation::Tuple(items) => {
                let items: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "({})", items.join(", "))
            }
            TypeAnnotation::Struct(fields) => {
                let fields: Vec<String> = fields.iter().map(|(n, t)| format!("{n}: {t}")).collect();
                write!(f, "{{ {} }}", fields.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub annotation: TypeAnnotation,
    pub default: Option<Value>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, annotation: TypeAnnotation) -> Self {
        Self {
            name: name.into(),
            annotation,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<Parameter>,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    /// Parse `fn name(param: Type = default, ..)`; a `self` receiver is skipped
    pub fn parse(source: &str) -> Result<Self> {
        parser::parse_signature(source)
    }

    pub fn fields(&self, overrides: &HashMap<String, FieldOverride>) -> Result<Vec<FieldDefinition>> {
        fields_from_signature(self, overrides)
    }

    pub fn build_model(&self, name: Option<&str>, overrides: &HashMap<String, FieldOverride>) -> Result<DynamicModel> {
        build_model_from_signature(self, name, overrides)
    }
}

/// Per-parameter adjustment applied after inference
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOverride {
    /// Use this descriptor instead of the inferred one
    Replace(FieldDefinition),
    /// Attributes merged over the inferred descriptor, snake_case or camelCase
    Patch(Map<String, Value>),
}

impl FieldOverride {
    /// `{"field": <descriptor>}` replaces, any other object patches
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::field_definition("", "override must be a JSON object"));
        };
        match map.get("field") {
            Some(field) => serde_json::from_value(field.clone())
                .map(FieldOverride::Replace)
                .map_err(|e| Error::json("invalid replacement descriptor", e)),
            None => Ok(FieldOverride::Patch(map.clone())),
        }
    }
}

enum Inferred {
    Enum(Vec<String>),
    List,
    Mapping,
    Uuid,
    Date,
    DateTime,
    Bool,
    Int,
    Float,
    Object(Vec<(String, TypeAnnotation)>),
    Text,
    Fallback,
}

fn infer(annotation: &TypeAnnotation) -> Inferred {
    let annotation = annotation.unwrap_transparent();
    match annotation {
        TypeAnnotation::Literal(values) => return Inferred::Enum(values.clone()),
        TypeAnnotation::Slice(_) => return Inferred::List,
        TypeAnnotation::Struct(fields) => return Inferred::Object(fields.clone()),
        TypeAnnotation::Tuple(_) => return Inferred::Fallback,
        TypeAnnotation::Path { .. } => {}
    }

    let Some((name, args)) = annotation.last_segment() else {
        return Inferred::Fallback;
    };
    match name {
        "Vec" | "VecDeque" | "LinkedList" | "HashSet" | "BTreeSet" | "IndexSet" => Inferred::List,
        "HashMap" | "BTreeMap" | "IndexMap" | "Map" | "Value" | "JsonValue" => Inferred::Mapping,
        "Uuid" => Inferred::Uuid,
        "NaiveDate" | "Date" => Inferred::Date,
        "DateTime" | "NaiveDateTime" | "OffsetDateTime" => Inferred::DateTime,
        "bool" => Inferred::Bool,
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64" | "u128" | "usize" => {
            Inferred::Int
        }
        "f32" | "f64" => Inferred::Float,
        "String" | "str" | "char" => Inferred::Text,
        "Cow" if matches!(args.last().and_then(|arg| arg.last_segment()), Some(("str", _))) => Inferred::Text,
        _ => Inferred::Fallback,
    }
}

fn descriptor_json(name: &str, annotation: &TypeAnnotation, default: Option<&Value>) -> Value {
    let default = default.filter(|d| !d.is_null());
    let (kind, default_key) = match infer(annotation) {
        Inferred::Enum(values) => {
            let mut descriptor = base_descriptor(FieldKind::Enum, name);
            descriptor.insert("allowedValues".into(), json!(values));
            if let Some(default) = default {
                descriptor.insert("defaultStr".into(), default.clone());
            }
            return Value::Object(descriptor);
        }
        Inferred::Object(fields) => {
            let mut descriptor = base_descriptor(FieldKind::Object, name);
            let nested: Vec<Value> = fields.iter().map(|(n, t)| descriptor_json(n, t, None)).collect();
            descriptor.insert("fields".into(), Value::Array(nested));
            return Value::Object(descriptor);
        }
        Inferred::Fallback => {
            let mut descriptor = base_descriptor(FieldKind::Json, name);
            if let Some(default) = default {
                let wrapped = match default {
                    Value::Object(_) => default.clone(),
                    other => json!({"value": other}),
                };
                descriptor.insert("defaultDict".into(), wrapped);
            }
            return Value::Object(descriptor);
        }
        Inferred::List => (FieldKind::List, "defaultList"),
        Inferred::Mapping => (FieldKind::Json, "defaultDict"),
        Inferred::Uuid => (FieldKind::Uuid, "defaultUuid"),
        Inferred::Date => (FieldKind::Date, "defaultDate"),
        Inferred::DateTime => (FieldKind::DateTime, "defaultDatetime"),
        Inferred::Bool => (FieldKind::Bool, "defaultBool"),
        Inferred::Int => (FieldKind::Int, "defaultInt"),
        Inferred::Float => (FieldKind::Float, "defaultFloat"),
        Inferred::Text if name.to_lowercase().contains("email") => (FieldKind::Email, "defaultEmail"),
        Inferred::Text => (FieldKind::Str, "defaultStr"),
    };

    let mut descriptor = base_descriptor(kind, name);
    if let Some(default) = default {
        descriptor.insert(default_key.into(), default.clone());
    }
    Value::Object(descriptor)
}

fn base_descriptor(kind: FieldKind, label: &str) -> Map<String, Value> {
    let mut descriptor = Map::new();
    descriptor.insert("__typename".into(), Value::String(kind.typename().into()));
    descriptor.insert("label".into(), Value::String(label.into()));
    descriptor
}

/// `default_str` becomes `defaultStr`; `__typename` is left alone
fn to_camel_case(key: &str) -> String {
    if key.starts_with("__") {
        return key.to_string();
    }
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Infer one descriptor per parameter, then apply overrides
pub fn fields_from_signature(
    signature: &FunctionSignature,
    overrides: &HashMap<String, FieldOverride>,
) -> Result<Vec<FieldDefinition>> {
    let mut fields = Vec::with_capacity(signature.params.len());

    for param in &signature.params {
        let mut descriptor = match overrides.get(&param.name) {
            Some(FieldOverride::Replace(field)) => {
                fields.push(field.clone());
                continue;
            }
            _ => descriptor_json(&param.name, &param.annotation, param.default.as_ref()),
        };

        if let (Some(FieldOverride::Patch(patch)), Value::Object(map)) = (overrides.get(&param.name), &mut descriptor) {
            for (key, value) in patch {
                map.insert(to_camel_case(key), value.clone());
            }
        }

        let field: FieldDefinition = serde_json::from_value(descriptor).map_err(|e| {
            Error::field_definition(&param.name, format!("cannot infer field from '{}': {e}", param.annotation))
        })?;
        debug!(param = %param.name, kind = %field.kind(), "inferred field from signature");
        fields.push(field);
    }

    Ok(fields)
}

/// Build a model from a signature; the default name is `<Capitalized>Model`
pub fn build_model_from_signature(
    signature: &FunctionSignature,
    name: Option<&str>,
    overrides: &HashMap<String, FieldOverride>,
) -> Result<DynamicModel> {
    let model_name = match name {
        Some(name) => name.to_string(),
        None => format!("{}Model", crate::fields::capitalize(&signature.name)),
    };
    let fields = fields_from_signature(signature, overrides)?;
    build_dynamic_model(model_name, &fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("default_str"), "defaultStr");
        assert_eq!(to_camel_case("allowed_values"), "allowedValues");
        assert_eq!(to_camel_case("required"), "required");
        assert_eq!(to_camel_case("__typename"), "__typename");
    }

    #[test]
    fn test_infer_unwraps_wrappers() {
        let ty = TypeAnnotation::optional(TypeAnnotation::generic("Box", vec![TypeAnnotation::named("i32")]));
        assert!(matches!(infer(&ty), Inferred::Int));
        let cow = TypeAnnotation::generic("std::borrow::Cow", vec![TypeAnnotation::named("str")]);
        assert!(matches!(infer(&cow), Inferred::Text));
        assert!(matches!(infer(&TypeAnnotation::named("MyStruct")), Inferred::Fallback));
    }

    #[test]
    fn test_display_round_trips_shape() {
        let ty = TypeAnnotation::generic(
            "HashMap",
            vec![TypeAnnotation::named("String"), TypeAnnotation::literal(["a", "b"])],
        );
        assert_eq!(ty.to_string(), r#"HashMap<String, "a" | "b">"#);
    }

    #[test]
    fn test_override_from_json() {
        let patch = FieldOverride::from_json(&json!({"required": true})).unwrap();
        assert!(matches!(patch, FieldOverride::Patch(_)));
        let replace =
            FieldOverride::from_json(&json!({"field": {"__typename": "IntField", "label": "x"}})).unwrap();
        assert!(matches!(replace, FieldOverride::Replace(FieldDefinition::Int(_))));
        assert!(FieldOverride::from_json(&json!(3)).is_err());
    }
}
