//! Unit tests for record schema document validation across modes

use pretty_assertions::assert_eq;
use serde_json::json;
use dynafield_schemas::{create_record_schema_validator, SchemaValidator, ValidationConfig, ValidationContext, ValidationMode};

#[cfg(test)]
mod structure {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_legacy_typenames_are_accepted() {
        let validator = create_record_schema_validator();
        let schema = json!({"fieldDefinitions": [
            {"__typename": "StringField", "label": "title"},
            {"__typename": "BooleanField", "label": "Done"}
        ]});
        assert!(validator.validate(&schema).is_ok());
    }

    #[test]
    fn test_nested_paths() {
        let validator = create_record_schema_validator();
        let schema = json!({"fieldDefinitions": [
            {"__typename": "ObjectField", "label": "address", "fields": [
                {"__typename": "StrField", "label": "city"},
                {"__typename": "StrField"}
            ]}
        ]});
        let errors = validator.validate_basic(&schema).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.at("$.fieldDefinitions[0].fields[1].label").is_some());
    }

    #[test]
    fn test_definitions_under_two_keys() {
        let validator = create_record_schema_validator();
        let schema = json!({
            "fieldDefinitions": [{"__typename": "StrField", "label": "a"}],
            "field_definitions": [{"__typename": "StrField", "label": "b"}]
        });
        let errors = validator.validate_basic(&schema).unwrap_err();
        assert!(errors.at("$").unwrap().message.contains("several keys"));
    }

    #[test]
    fn test_error_display_has_path() {
        let validator = create_record_schema_validator();
        let errors = validator
            .validate_basic(&json!({"fieldDefinitions": [{"__typename": "Mystery", "label": "x"}]}))
            .unwrap_err();
        let rendered = errors.to_string();
        assert!(rendered.contains("Validation error at '$.fieldDefinitions[0].__typename'"), "{rendered}");
        assert!(rendered.contains("known_typename"), "{rendered}");
    }
}

#[cfg(test)]
mod consistency {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_checked_per_kind() {
        let validator = create_record_schema_validator();
        let schema = json!({"fieldDefinitions": [
            {"__typename": "DateField", "label": "Birthday", "defaultDate": "2024-13-40"},
            {"__typename": "DateTimeField", "label": "Seen", "defaultDatetime": "yesterday"},
            {"__typename": "UuidField", "label": "Ref", "defaultUuid": "1234"},
            {"__typename": "BoolField", "label": "Flag", "defaultBool": "yes"},
            {"__typename": "JsonField", "label": "meta", "defaultDict": [1]},
            {"__typename": "ListField", "label": "tags", "defaultList": {"a": 1}},
            {"__typename": "StrField", "label": "code", "defaultStr": "toolong", "constraintsStr": {"maxLength": 3}}
        ]});
        let errors = validator.validate_partial(&schema).unwrap_err();
        assert_eq!(errors.len(), 7);
        for (index, attribute) in [
            "defaultDate",
            "defaultDatetime",
            "defaultUuid",
            "defaultBool",
            "defaultDict",
            "defaultList",
            "defaultStr",
        ]
        .iter()
        .enumerate()
        {
            let path = format!("$.fieldDefinitions[{index}].{attribute}");
            assert!(errors.at(&path).is_some(), "missing {path}");
        }
    }

    #[test]
    fn test_null_defaults_are_ignored() {
        let validator = create_record_schema_validator();
        let schema = json!({"fieldDefinitions": [
            {"__typename": "IntField", "label": "n", "required": true, "defaultInt": null}
        ]});
        assert!(validator.validate(&schema).is_ok());
    }

    #[test]
    fn test_enum_requires_values() {
        let validator = create_record_schema_validator();
        let schema = json!({"fieldDefinitions": [
            {"__typename": "EnumField", "label": "Status"},
            {"__typename": "EnumField", "label": "Kind", "allowedValues": []}
        ]});
        let errors = validator.validate_partial(&schema).unwrap_err();
        assert!(errors.at("$.fieldDefinitions[0].allowedValues").is_some());
        assert!(errors.at("$.fieldDefinitions[1].allowedValues").is_some());
    }
}

#[cfg(test)]
mod modes {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strict_compiles_tenant_documents() {
        let validator = create_record_schema_validator();
        let document = json!({
            "tenantId": "t-1",
            "userId": "u-1",
            "name": "Orders",
            "description": "Customer orders",
            "fieldSchema": [
                {"__typename": "FloatField", "label": "total", "constraintsFloat": {"geFloat": 0.0}},
                {"__typename": "EmailField", "label": "Contact", "defaultEmail": "orders@example.com"}
            ]
        });
        assert!(validator.validate(&document).is_ok());
    }

    #[test]
    fn test_context_mode_controls_rules() {
        let validator = create_record_schema_validator();
        let schema = json!({"unexpected": true, "fieldDefinitions": [{"__typename": "StrField", "label": "a"}]});

        let basic = ValidationContext::new(ValidationMode::Basic);
        assert!(validator.validate_with_context(&schema, &basic).is_ok());
        let strict = ValidationContext::new(ValidationMode::Strict);
        assert!(validator.validate_with_context(&schema, &strict).is_err());
    }

    #[test]
    fn test_collect_errors() {
        let validator = create_record_schema_validator();
        let errors = validator.collect_errors(&json!({"fieldDefinitions": [{"label": "a"}]}));
        assert_eq!(errors.len(), 1);
        assert!(validator
            .collect_errors(&json!({"fieldDefinitions": [{"__typename": "StrField", "label": "a"}]}))
            .is_empty());
    }

    #[test]
    fn test_config_defaults() {
        let config = ValidationConfig::default();
        assert_eq!(config.mode, ValidationMode::Strict);
        assert!(!config.fail_fast);
        assert_eq!(config.max_errors, 0);
    }
}
