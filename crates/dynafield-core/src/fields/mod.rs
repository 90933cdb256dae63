//! Typed field descriptors
//!
//! A descriptor is plain data: a label, a required flag, an optional default
//! and kind-specific constraints, tagged in JSON by `__typename`. Calling
//! [`FieldDefinition::compile`] turns it into a [`CompiledField`], the runtime
//! spec the model builder consumes.
//!
//! Copyright (c) 2025 Dynafield Team
//! Licensed under the Apache-2.0 license

mod compiled;
mod numeric;
mod structured;
mod temporal;
mod text;

pub use compiled::{CompiledField, EnumSpec, EnumValue, ValueKind};
pub use numeric::{BoolField, FloatConstraints, FloatField, IntConstraints, IntField};
pub use structured::{JsonField, ListField, ObjectField};
pub use temporal::{parse_date, parse_datetime, DateField, DateTimeField};
pub(crate) use temporal::format_datetime;
pub(crate) use text::capitalize;
pub use text::{is_valid_email, EmailField, EnumField, StrConstraints, StrField, UuidField};

use crate::error::{Error, Result};
use crate::utils::uuid_7;
use serde::{Deserialize, Serialize};
use std::fmt;

fn new_field_id() -> String {
    uuid_7().to_string()
}

/// Attributes shared by every descriptor kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCommon {
    #[serde(default = "new_field_id")]
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl FieldCommon {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: new_field_id(),
            label: label.into(),
            description: None,
            required: false,
        }
    }

    pub fn required(label: impl Into<String>) -> Self {
        Self {
            required: true,
            ..Self::new(label)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// A required field can never fall back to a default
    pub(crate) fn check_default(&self, has_default: bool) -> Result<()> {
        if self.required && has_default {
            return Err(Error::field_definition(
                &self.label,
                format!("Required field '{}' cannot specify a default value.", self.label),
            ));
        }
        Ok(())
    }
}

impl Default for FieldCommon {
    fn default() -> Self {
        Self::new("")
    }
}

/// Discriminant of a descriptor, independent of its attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Str,
    Int,
    Float,
    Bool,
    Date,
    DateTime,
    Email,
    Enum,
    Uuid,
    Json,
    List,
    Object,
}

impl FieldKind {
    pub const ALL: [FieldKind; 12] = [
        FieldKind::Str,
        FieldKind::Int,
        FieldKind::Float,
        FieldKind::Bool,
        FieldKind::Date,
        FieldKind::DateTime,
        FieldKind::Email,
        FieldKind::Enum,
        FieldKind::Uuid,
        FieldKind::Json,
        FieldKind::List,
        FieldKind::Object,
    ];

    /// Canonical `__typename` tag
    pub fn typename(self) -> &'static str {
        match self {
            FieldKind::Str => "StrField",
            FieldKind::Int => "IntField",
            FieldKind::Float => "FloatField",
            FieldKind::Bool => "BoolField",
            FieldKind::Date => "DateField",
            FieldKind::DateTime => "DateTimeField",
            FieldKind::Email => "EmailField",
            FieldKind::Enum => "EnumField",
            FieldKind::Uuid => "UuidField",
            FieldKind::Json => "JsonField",
            FieldKind::List => "ListField",
            FieldKind::Object => "ObjectField",
        }
    }

    /// Resolve a tag, accepting the legacy enum-value spellings
    pub fn from_typename(tag: &str) -> Option<Self> {
        match tag {
            "StringField" => Some(FieldKind::Str),
            "BooleanField" => Some(FieldKind::Bool),
            other => Self::ALL.into_iter().find(|kind| kind.typename() == other),
        }
    }

    /// Kinds whose record key is the lower-cased label
    pub fn lowercases_key(self) -> bool {
        matches!(
            self,
            FieldKind::Bool
                | FieldKind::Date
                | FieldKind::DateTime
                | FieldKind::Email
                | FieldKind::Enum
                | FieldKind::Uuid
        )
    }

    /// Attribute names this kind accepts on top of the common ones (camelCase)
    pub fn attributes(self) -> &'static [&'static str] {
        match self {
            FieldKind::Str => &["defaultStr", "constraintsStr"],
            FieldKind::Int => &["defaultInt", "constraintsInt"],
            FieldKind::Float => &["defaultFloat", "constraintsFloat"],
            FieldKind::Bool => &["defaultBool"],
            FieldKind::Date => &["defaultDate"],
            FieldKind::DateTime => &["defaultDatetime"],
            FieldKind::Email => &["defaultEmail"],
            FieldKind::Enum => &["allowedValues", "defaultStr"],
            FieldKind::Uuid => &["defaultUuid"],
            FieldKind::Json => &["defaultDict"],
            FieldKind::List => &["defaultList"],
            FieldKind::Object => &["fields"],
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.typename())
    }
}

/// A field descriptor of any kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum FieldDefinition {
    #[serde(rename = "StrField", alias = "StringField")]
    Str(StrField),
    #[serde(rename = "IntField")]
    Int(IntField),
    #[serde(rename = "FloatField")]
    Float(FloatField),
    #[serde(rename = "BoolField", alias = "BooleanField")]
    Bool(BoolField),
    #[serde(rename = "DateField")]
    Date(DateField),
    #[serde(rename = "DateTimeField")]
    DateTime(DateTimeField),
    #[serde(rename = "EmailField")]
    Email(EmailField),
    #[serde(rename = "EnumField")]
    Enum(EnumField),
    #[serde(rename = "UuidField")]
    Uuid(UuidField),
    #[serde(rename = "JsonField")]
    Json(JsonField),
    #[serde(rename = "ListField")]
    List(ListField),
    #[serde(rename = "ObjectField")]
    Object(ObjectField),
}

impl FieldDefinition {
    pub fn common(&self) -> &FieldCommon {
        match self {
            FieldDefinition::Str(f) => &f.common,
            FieldDefinition::Int(f) => &f.common,
            FieldDefinition::Float(f) => &f.common,
            FieldDefinition::Bool(f) => &f.common,
            FieldDefinition::Date(f) => &f.common,
            FieldDefinition::DateTime(f) => &f.common,
            FieldDefinition::Email(f) => &f.common,
            FieldDefinition::Enum(f) => &f.common,
            FieldDefinition::Uuid(f) => &f.common,
            FieldDefinition::Json(f) => &f.common,
            FieldDefinition::List(f) => &f.common,
            FieldDefinition::Object(f) => &f.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut FieldCommon {
        match self {
            FieldDefinition::Str(f) => &mut f.common,
            FieldDefinition::Int(f) => &mut f.common,
            FieldDefinition::Float(f) => &mut f.common,
            FieldDefinition::Bool(f) => &mut f.common,
            FieldDefinition::Date(f) => &mut f.common,
            FieldDefinition::DateTime(f) => &mut f.common,
            FieldDefinition::Email(f) => &mut f.common,
            FieldDefinition::Enum(f) => &mut f.common,
            FieldDefinition::Uuid(f) => &mut f.common,
            FieldDefinition::Json(f) => &mut f.common,
            FieldDefinition::List(f) => &mut f.common,
            FieldDefinition::Object(f) => &mut f.common,
        }
    }

    pub fn label(&self) -> &str {
        &self.common().label
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldDefinition::Str(_) => FieldKind::Str,
            FieldDefinition::Int(_) => FieldKind::Int,
            FieldDefinition::Float(_) => FieldKind::Float,
            FieldDefinition::Bool(_) => FieldKind::Bool,
            FieldDefinition::Date(_) => FieldKind::Date,
            FieldDefinition::DateTime(_) => FieldKind::DateTime,
            FieldDefinition::Email(_) => FieldKind::Email,
            FieldDefinition::Enum(_) => FieldKind::Enum,
            FieldDefinition::Uuid(_) => FieldKind::Uuid,
            FieldDefinition::Json(_) => FieldKind::Json,
            FieldDefinition::List(_) => FieldKind::List,
            FieldDefinition::Object(_) => FieldKind::Object,
        }
    }

    /// Record key this descriptor validates
    pub fn key(&self) -> String {
        if self.kind().lowercases_key() {
            self.label().to_lowercase()
        } else {
            self.label().to_string()
        }
    }

    /// Build the runtime field spec
    pub fn compile(&self) -> Result<CompiledField> {
        let compiled = match self {
            FieldDefinition::Str(f) => f.compile(),
            FieldDefinition::Int(f) => f.compile(),
            FieldDefinition::Float(f) => f.compile(),
            FieldDefinition::Bool(f) => f.compile(),
            FieldDefinition::Date(f) => f.compile(),
            FieldDefinition::DateTime(f) => f.compile(),
            FieldDefinition::Email(f) => f.compile(),
            FieldDefinition::Enum(f) => f.compile(),
            FieldDefinition::Uuid(f) => f.compile(),
            FieldDefinition::Json(f) => f.compile(),
            FieldDefinition::List(f) => f.compile(),
            FieldDefinition::Object(f) => f.compile(),
        }?;
        tracing::trace!(key = %compiled.key, kind = %self.kind(), "compiled field descriptor");
        Ok(compiled)
    }
}

macro_rules! impl_from_field {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for FieldDefinition {
                fn from(field: $ty) -> Self {
                    FieldDefinition::$variant(field)
                }
            }
        )*
    };
}

impl_from_field!(
    Str(StrField),
    Int(IntField),
    Float(FloatField),
    Bool(BoolField),
    Date(DateField),
    DateTime(DateTimeField),
    Email(EmailField),
    Enum(EnumField),
    Uuid(UuidField),
    Json(JsonField),
    List(ListField),
    Object(ObjectField),
);
