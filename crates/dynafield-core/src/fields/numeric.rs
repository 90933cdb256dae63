//! Int, Float and Bool descriptors

use super::{CompiledField, FieldCommon, ValueKind};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntConstraints {
    #[serde(default, alias = "ge_int", skip_serializing_if = "Option::is_none")]
    pub ge_int: Option<i64>,
    #[serde(default, alias = "le_int", skip_serializing_if = "Option::is_none")]
    pub le_int: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default, alias = "default_int", skip_serializing_if = "Option::is_none")]
    pub default_int: Option<i64>,
    #[serde(default, alias = "constraints_int", skip_serializing_if = "Option::is_none")]
    pub constraints_int: Option<IntConstraints>,
}

impl IntField {
    pub(crate) fn compile(&self) -> Result<CompiledField> {
        self.common.check_default(self.default_int.is_some())?;
        let constraints = self.constraints_int.clone().unwrap_or_default();
        if let (Some(ge), Some(le)) = (constraints.ge_int, constraints.le_int) {
            if ge > le {
                return Err(Error::field_definition(
                    &self.common.label,
                    format!("geInt ({ge}) is greater than leInt ({le})"),
                ));
            }
        }
        Ok(CompiledField {
            key: self.common.label.clone(),
            label: self.common.label.clone(),
            kind: ValueKind::Int {
                ge: constraints.ge_int,
                le: constraints.le_int,
            },
            required: self.common.required,
            default: self.default_int.map(Value::from),
            description: self.common.description.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloatConstraints {
    #[serde(default, alias = "ge_float", skip_serializing_if = "Option::is_none")]
    pub ge_float: Option<f64>,
    #[serde(default, alias = "le_float", skip_serializing_if = "Option::is_none")]
    pub le_float: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloatField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default, alias = "default_float", skip_serializing_if = "Option::is_none")]
    pub default_float: Option<f64>,
    #[serde(default, alias = "constraints_float", skip_serializing_if = "Option::is_none")]
    pub constraints_float: Option<FloatConstraints>,
}

impl FloatField {
    pub(crate) fn compile(&self) -> Result<CompiledField> {
        self.common.check_default(self.default_float.is_some())?;
        let constraints = self.constraints_float.clone().unwrap_or_default();
        if let (Some(ge), Some(le)) = (constraints.ge_float, constraints.le_float) {
            if ge > le {
                return Err(Error::field_definition(
                    &self.common.label,
                    format!("geFloat ({ge}) is greater than leFloat ({le})"),
                ));
            }
        }
        let default = match self.default_float {
            Some(value) => Some(
                serde_json::Number::from_f64(value)
                    .map(Value::Number)
                    .ok_or_else(|| {
                        Error::field_definition(&self.common.label, "defaultFloat must be finite")
                    })?,
            ),
            None => None,
        };
        Ok(CompiledField {
            key: self.common.label.clone(),
            label: self.common.label.clone(),
            kind: ValueKind::Float {
                ge: constraints.ge_float,
                le: constraints.le_float,
            },
            required: self.common.required,
            default,
            description: self.common.description.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoolField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default, alias = "default_bool", skip_serializing_if = "Option::is_none")]
    pub default_bool: Option<bool>,
}

impl BoolField {
    pub(crate) fn compile(&self) -> Result<CompiledField> {
        self.common.check_default(self.default_bool.is_some())?;
        Ok(CompiledField {
            key: self.common.label.to_lowercase(),
            label: self.common.label.clone(),
            kind: ValueKind::Bool,
            required: self.common.required,
            default: self.default_bool.map(Value::Bool),
            description: self.common.description.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_bounds_order() {
        let field = IntField {
            common: FieldCommon::new("age"),
            default_int: None,
            constraints_int: Some(IntConstraints {
                ge_int: Some(10),
                le_int: Some(1),
            }),
        };
        assert!(field.compile().is_err());
    }

    #[test]
    fn test_float_default_is_kept() {
        let field = FloatField {
            common: FieldCommon::new("rating"),
            default_float: Some(4.5),
            constraints_float: None,
        };
        let compiled = field.compile().unwrap();
        assert_eq!(compiled.default, Some(Value::from(4.5)));
        assert_eq!(compiled.key, "rating");
    }

    #[test]
    fn test_bool_key_is_lowercased() {
        let field = BoolField {
            common: FieldCommon::new("IsActive"),
            default_bool: Some(false),
        };
        assert_eq!(field.compile().unwrap().key, "isactive");
    }
}
