//! Json, List and Object descriptors

use super::{CompiledField, FieldCommon, FieldDefinition, ValueKind};
use crate::error::{Error, Result};
use crate::model::build_dynamic_model;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default, alias = "default_dict", skip_serializing_if = "Option::is_none")]
    pub default_dict: Option<Map<String, Value>>,
}

impl JsonField {
    pub(crate) fn compile(&self) -> Result<CompiledField> {
        self.common.check_default(self.default_dict.is_some())?;
        Ok(CompiledField {
            key: self.common.label.clone(),
            label: self.common.label.clone(),
            kind: ValueKind::Json,
            required: self.common.required,
            default: self.default_dict.clone().map(Value::Object),
            description: self.common.description.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default, alias = "default_list", skip_serializing_if = "Option::is_none")]
    pub default_list: Option<Vec<Value>>,
}

impl ListField {
    pub(crate) fn compile(&self) -> Result<CompiledField> {
        self.common.check_default(self.default_list.is_some())?;
        Ok(CompiledField {
            key: self.common.label.clone(),
            label: self.common.label.clone(),
            kind: ValueKind::List,
            required: self.common.required,
            default: self.default_list.clone().map(Value::Array),
            description: self.common.description.clone(),
        })
    }
}

/// A nested record described by its own descriptor list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl ObjectField {
    /// `shipping address` becomes `ShippingAddressSubModel`
    pub fn sub_model_name(&self) -> String {
        let title: String = self
            .common
            .label
            .split(|c: char| !c.is_alphanumeric())
            .map(super::text::capitalize)
            .collect();
        format!("{title}SubModel")
    }

    pub(crate) fn compile(&self) -> Result<CompiledField> {
        let nested = build_dynamic_model(self.sub_model_name(), &self.fields).map_err(|e| {
            Error::field_definition(&self.common.label, format!("nested fields are invalid: {e}"))
        })?;
        Ok(CompiledField {
            key: self.common.label.clone(),
            label: self.common.label.clone(),
            kind: ValueKind::Object(nested),
            required: self.common.required,
            default: None,
            description: self.common.description.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::StrField;
    use serde_json::json;

    #[test]
    fn test_object_field_compiles_nested_model() {
        let field = ObjectField {
            common: FieldCommon::new("shipping address"),
            fields: vec![StrField {
                common: FieldCommon::required("street"),
                ..Default::default()
            }
            .into()],
        };
        let compiled = field.compile().unwrap();
        let nested = compiled.nested_model().unwrap();
        assert_eq!(nested.name(), "ShippingAddressSubModel");
        assert_eq!(nested.keys().collect::<Vec<_>>(), vec!["street"]);
    }

    #[test]
    fn test_nested_errors_name_the_object() {
        let field: ObjectField = serde_json::from_value(json!({
            "label": "profile",
            "fields": [{"__typename": "IntField", "label": "age", "required": true, "defaultInt": 1}]
        }))
        .unwrap();
        let err = field.compile().unwrap_err();
        assert!(err.to_string().contains("profile"));
    }

    #[test]
    fn test_json_and_list_defaults() {
        let json_field = JsonField {
            common: FieldCommon::new("meta"),
            default_dict: Some(json!({"a": 1}).as_object().unwrap().clone()),
        };
        assert_eq!(json_field.compile().unwrap().default, Some(json!({"a": 1})));

        let list_field = ListField {
            common: FieldCommon::new("tags"),
            default_list: Some(vec![json!("x")]),
        };
        assert_eq!(list_field.compile().unwrap().default, Some(json!(["x"])));
    }
}
