//! String-valued descriptors: Str, Email, Enum and Uuid

use super::{CompiledField, EnumSpec, EnumValue, FieldCommon, ValueKind};
use crate::error::{Error, Result};
use crate::utils::get_valid_uuid;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Syntactic email check: one `@`, a non-empty local part and a dotted domain
pub fn is_valid_email(value: &str) -> bool {
    let pattern = EMAIL_PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
            .expect("email pattern is valid")
    });
    pattern.is_match(value)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrConstraints {
    #[serde(default, alias = "min_length", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, alias = "max_length", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default, alias = "default_str", skip_serializing_if = "Option::is_none")]
    pub default_str: Option<String>,
    #[serde(default, alias = "constraints_str", skip_serializing_if = "Option::is_none")]
    pub constraints_str: Option<StrConstraints>,
}

impl StrField {
    pub(crate) fn compile(&self) -> Result<CompiledField> {
        self.common.check_default(self.default_str.is_some())?;
        let constraints = self.constraints_str.clone().unwrap_or_default();
        if let (Some(min), Some(max)) = (constraints.min_length, constraints.max_length) {
            if min > max {
                return Err(Error::field_definition(
                    &self.common.label,
                    format!("minLength ({min}) is greater than maxLength ({max})"),
                ));
            }
        }
        Ok(CompiledField {
            key: self.common.label.clone(),
            label: self.common.label.clone(),
            kind: ValueKind::Str {
                min_length: constraints.min_length,
                max_length: constraints.max_length,
            },
            required: self.common.required,
            default: self.default_str.clone().map(Value::String),
            description: self.common.description.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default, alias = "default_email", skip_serializing_if = "Option::is_none")]
    pub default_email: Option<String>,
}

impl EmailField {
    pub(crate) fn compile(&self) -> Result<CompiledField> {
        self.common.check_default(self.default_email.is_some())?;
        if let Some(default) = &self.default_email {
            if !is_valid_email(default) {
                return Err(Error::field_definition(
                    &self.common.label,
                    format!("defaultEmail '{default}' is not a valid email address"),
                ));
            }
        }
        Ok(CompiledField {
            key: self.common.label.to_lowercase(),
            label: self.common.label.clone(),
            kind: ValueKind::Email,
            required: self.common.required,
            default: self.default_email.clone().map(Value::String),
            description: self.common.description.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default, alias = "allowed_values", skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
    #[serde(default, alias = "default_str", skip_serializing_if = "Option::is_none")]
    pub default_str: Option<String>,
}

impl EnumField {
    /// `status` becomes `StatusEnum`
    pub fn enum_name(&self) -> String {
        format!("{}Enum", capitalize(&self.common.label))
    }

    pub(crate) fn compile(&self) -> Result<CompiledField> {
        let label = &self.common.label;
        self.common.check_default(self.default_str.is_some())?;

        let values = match self.allowed_values.as_deref() {
            Some(values) if !values.is_empty() => values,
            _ => {
                return Err(Error::field_definition(
                    label,
                    format!("Enum field '{label}' must define at least one allowed value"),
                ))
            }
        };

        let mut members: Vec<EnumValue> = Vec::with_capacity(values.len());
        for value in values {
            let member = EnumValue::new(value.as_str());
            if members.iter().any(|m| m.name == member.name) {
                return Err(Error::field_definition(
                    label,
                    format!("Enum field '{label}' lists '{value}' more than once"),
                ));
            }
            members.push(member);
        }

        if let Some(default) = &self.default_str {
            if !values.contains(default) {
                return Err(Error::field_definition(
                    label,
                    format!("Default '{default}' is not one of the allowed values {values:?}"),
                ));
            }
        }

        Ok(CompiledField {
            key: label.to_lowercase(),
            label: label.clone(),
            kind: ValueKind::Enum(EnumSpec {
                name: self.enum_name(),
                values: members,
            }),
            required: self.common.required,
            default: self.default_str.clone().map(Value::String),
            description: self.common.description.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UuidField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default, alias = "default_uuid", skip_serializing_if = "Option::is_none")]
    pub default_uuid: Option<String>,
}

impl UuidField {
    pub(crate) fn compile(&self) -> Result<CompiledField> {
        self.common.check_default(self.default_uuid.is_some())?;
        let default = match &self.default_uuid {
            Some(raw) => {
                let uuid = get_valid_uuid(raw).ok_or_else(|| {
                    Error::field_definition(
                        &self.common.label,
                        format!("defaultUuid '{raw}' is not a valid UUID"),
                    )
                })?;
                Some(Value::String(uuid.to_string()))
            }
            None => None,
        };
        Ok(CompiledField {
            key: self.common.label.to_lowercase(),
            label: self.common.label.clone(),
            kind: ValueKind::Uuid,
            required: self.common.required,
            default,
            description: self.common.description.clone(),
        })
    }
}

/// First character upper-cased, the rest lower-cased
pub(crate) fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
