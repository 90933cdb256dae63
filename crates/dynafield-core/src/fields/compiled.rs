//! Runtime field specs produced from descriptors

use crate::model::DynamicModel;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A member of an enum field: `name` is the upper-cased `value`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    pub value: String,
}

impl EnumValue {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            name: value.to_uppercase(),
            value,
        }
    }
}

/// Allowed members of an enum field
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSpec {
    /// Type name, `<Label>Enum`
    pub name: String,
    pub values: Vec<EnumValue>,
}

impl EnumSpec {
    pub fn lookup(&self, value: &str) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.value == value)
    }
}

/// Value type of a compiled field along with its constraints
#[derive(Debug, Clone)]
pub enum ValueKind {
    Str {
        min_length: Option<usize>,
        max_length: Option<usize>,
    },
    Int {
        ge: Option<i64>,
        le: Option<i64>,
    },
    Float {
        ge: Option<f64>,
        le: Option<f64>,
    },
    Bool,
    Date,
    DateTime,
    Email,
    Enum(EnumSpec),
    Uuid,
    Json,
    List,
    Object(DynamicModel),
}

impl ValueKind {
    /// Short type name used in error messages and violations
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueKind::Str { .. } => "string",
            ValueKind::Int { .. } => "integer",
            ValueKind::Float { .. } => "number",
            ValueKind::Bool => "boolean",
            ValueKind::Date => "date",
            ValueKind::DateTime => "datetime",
            ValueKind::Email => "email",
            ValueKind::Enum(_) => "enum",
            ValueKind::Uuid => "uuid",
            ValueKind::Json => "object",
            ValueKind::List => "array",
            ValueKind::Object(_) => "object",
        }
    }
}

/// Runtime spec of one record field
#[derive(Debug, Clone)]
pub struct CompiledField {
    /// Record key
    pub key: String,
    /// Label as written on the descriptor
    pub label: String,
    pub kind: ValueKind,
    pub required: bool,
    /// Fallback used when the key is absent; cloned per record
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl CompiledField {
    pub fn nested_model(&self) -> Option<&DynamicModel> {
        match &self.kind {
            ValueKind::Object(model) => Some(model),
            _ => None,
        }
    }

    pub fn enum_spec(&self) -> Option<&EnumSpec> {
        match &self.kind {
            ValueKind::Enum(spec) => Some(spec),
            _ => None,
        }
    }
}
