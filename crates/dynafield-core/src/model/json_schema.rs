//! JSON Schema rendering of a model

use super::DynamicModel;
use crate::fields::{CompiledField, ValueKind};
use serde_json::{json, Map, Value};

pub(super) fn model_schema(model: &DynamicModel) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in model.fields() {
        properties.insert(field.key.clone(), field_schema(field));
        if field.required {
            required.push(Value::String(field.key.clone()));
        }
    }

    let mut schema = json!({
        "title": model.name(),
        "type": "object",
        "properties": properties,
    });
    if !required.is_empty() {
        schema["required"] = Value::Array(required);
    }
    schema
}

fn field_schema(field: &CompiledField) -> Value {
    let mut schema = match &field.kind {
        ValueKind::Str { min_length, max_length } => {
            let mut s = json!({"type": "string"});
            if let Some(min) = min_length {
                s["minLength"] = json!(min);
            }
            if let Some(max) = max_length {
                s["maxLength"] = json!(max);
            }
            s
        }
        ValueKind::Int { ge, le } => bounded("integer", ge.map(Value::from), le.map(Value::from)),
        ValueKind::Float { ge, le } => bounded("number", ge.map(Value::from), le.map(Value::from)),
        ValueKind::Bool => json!({"type": "boolean"}),
        ValueKind::Date => json!({"type": "string", "format": "date"}),
        ValueKind::DateTime => json!({"type": "string", "format": "date-time"}),
        ValueKind::Email => json!({"type": "string", "format": "email"}),
        ValueKind::Enum(spec) => json!({
            "title": spec.name,
            "type": "string",
            "enum": spec.values.iter().map(|v| v.value.clone()).collect::<Vec<_>>(),
        }),
        ValueKind::Uuid => json!({"type": "string", "format": "uuid"}),
        ValueKind::Json => json!({"type": "object", "additionalProperties": true}),
        ValueKind::List => json!({"type": "array", "items": {}}),
        ValueKind::Object(nested) => model_schema(nested),
    };

    if !matches!(field.kind, ValueKind::Object(_) | ValueKind::Enum(_)) {
        schema["title"] = Value::String(field.label.clone());
    }
    if let Some(description) = &field.description {
        schema["description"] = Value::String(description.clone());
    }
    if let Some(default) = &field.default {
        schema["default"] = default.clone();
    }
    schema
}

fn bounded(kind: &str, minimum: Option<Value>, maximum: Option<Value>) -> Value {
    let mut schema = json!({"type": kind});
    if let Some(minimum) = minimum {
        schema["minimum"] = minimum;
    }
    if let Some(maximum) = maximum {
        schema["maximum"] = maximum;
    }
    schema
}

#[cfg(test)]
mod tests {
    use crate::fields::FieldDefinition;
    use crate::model::build_dynamic_model;
    use serde_json::json;

    #[test]
    fn test_schema_shape() {
        let definitions: Vec<FieldDefinition> = serde_json::from_value(json!([
            {"__typename": "StrField", "label": "name", "required": true, "constraintsStr": {"maxLength": 5}},
            {"__typename": "IntField", "label": "age", "description": "years", "constraintsInt": {"geInt": 0, "leInt": 130}},
            {"__typename": "EnumField", "label": "kind", "allowedValues": ["a", "b"], "defaultStr": "a"},
            {"__typename": "ObjectField", "label": "profile", "fields": [
                {"__typename": "EmailField", "label": "Email", "required": true}
            ]},
        ]))
        .unwrap();
        let schema = build_dynamic_model("Person", &definitions).unwrap().json_schema();

        assert_eq!(schema["title"], "Person");
        assert_eq!(schema["required"], json!(["name"]));
        assert_eq!(schema["properties"]["name"]["maxLength"], 5);
        assert_eq!(schema["properties"]["age"]["minimum"], 0);
        assert_eq!(schema["properties"]["age"]["maximum"], 130);
        assert_eq!(schema["properties"]["age"]["description"], "years");
        assert_eq!(schema["properties"]["kind"]["enum"], json!(["a", "b"]));
        assert_eq!(schema["properties"]["kind"]["default"], "a");
        assert_eq!(schema["properties"]["profile"]["title"], "ProfileSubModel");
        assert_eq!(schema["properties"]["profile"]["required"], json!(["email"]));
    }
}
