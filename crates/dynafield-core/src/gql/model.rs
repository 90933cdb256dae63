//! Output and input types mirroring a compiled dynamic model

use super::{gql_name, pascal_name, DATETIME_SCALAR, DATE_SCALAR, JSON_SCALAR, UUID_SCALAR};
use crate::error::{Error, Result};
use crate::fields::{CompiledField, ValueKind};
use crate::model::{DynamicModel, FieldValue, Record};
use async_graphql::dynamic::{
    Enum, EnumItem, Field, FieldFuture, FieldValue as GqlFieldValue, InputObject, InputValue, Object, ResolverContext,
    Type, TypeRef,
};
use async_graphql::{Name, Value as GqlValue};
use serde_json::{Map, Value};
use tracing::trace;

/// Types mirroring `model`: one output object named after the model, one
/// `<Model>Input` input object, plus the nested objects and enums its fields
/// need. Nested object fields produce `<Model><Label>` types and enum fields
/// produce `<Model><Label>Enum`.
pub fn model_types(model: &DynamicModel) -> Result<Vec<Type>> {
    let mut types = Vec::new();
    collect_types(model, &gql_name(model.name()), &mut types)?;
    Ok(types)
}

fn collect_types(model: &DynamicModel, type_name: &str, types: &mut Vec<Type>) -> Result<()> {
    if model.fields().is_empty() {
        return Err(Error::gql(format!(
            "model '{}' has no fields to expose",
            model.name()
        )));
    }

    let mut object = Object::new(type_name);
    let mut input = InputObject::new(format!("{type_name}Input"));

    for field in model.fields() {
        let (output_base, input_base) = field_type_names(field, type_name, types)?;
        let field_name = gql_name(&field.key);
        trace!(type_name, field = %field_name, ty = %output_base, "mirroring field");

        let (output_ty, input_ty) = if field.required {
            (TypeRef::named_nn(output_base), TypeRef::named_nn(input_base))
        } else {
            (TypeRef::named(output_base), TypeRef::named(input_base))
        };

        let mut output_field = record_field(field_name.clone(), output_ty);
        let mut input_field = InputValue::new(field_name, input_ty);
        if let Some(description) = &field.description {
            output_field = output_field.description(description);
            input_field = input_field.description(description);
        }
        object = object.field(output_field);
        input = input.field(input_field);
    }

    types.push(object.into());
    types.push(input.into());
    Ok(())
}

/// Output and input type names for a field, registering nested types on the way
fn field_type_names(field: &CompiledField, parent: &str, types: &mut Vec<Type>) -> Result<(String, String)> {
    let scalar = |name: &str| -> Result<(String, String)> { Ok((name.to_string(), name.to_string())) };
    match &field.kind {
        ValueKind::Str { .. } | ValueKind::Email => scalar(TypeRef::STRING),
        ValueKind::Int { .. } => scalar(TypeRef::INT),
        ValueKind::Float { .. } => scalar(TypeRef::FLOAT),
        ValueKind::Bool => scalar(TypeRef::BOOLEAN),
        ValueKind::Date => scalar(DATE_SCALAR),
        ValueKind::DateTime => scalar(DATETIME_SCALAR),
        ValueKind::Uuid => scalar(UUID_SCALAR),
        ValueKind::Json | ValueKind::List => scalar(JSON_SCALAR),
        ValueKind::Enum(spec) => {
            let enum_name = format!("{parent}{}", gql_name(&spec.name));
            let items = spec
                .values
                .iter()
                .map(|member| EnumItem::new(gql_name(&member.name)).description(&member.value));
            types.push(Enum::new(&enum_name).items(items).into());
            Ok((enum_name.clone(), enum_name))
        }
        ValueKind::Object(nested) => {
            let nested_name = format!("{parent}{}", pascal_name(&field.label));
            collect_types(nested, &nested_name, types)?;
            Ok((nested_name.clone(), format!("{nested_name}Input")))
        }
    }
}

/// Resolves a record field from the parent value built by [`record_to_gql_value`]
fn record_field(name: String, ty: TypeRef) -> Field {
    let key = name.clone();
    Field::new(name, ty, move |ctx: ResolverContext| {
        let key = key.clone();
        FieldFuture::new(async move {
            let value = match ctx.parent_value.as_value() {
                Some(GqlValue::Object(map)) => map.get(key.as_str()).cloned(),
                _ => None,
            };
            Ok(value
                .filter(|v| !matches!(v, GqlValue::Null))
                .map(GqlFieldValue::value))
        })
    })
}

fn field_value_to_gql(value: &FieldValue) -> Result<GqlValue> {
    match value {
        FieldValue::Null => Ok(GqlValue::Null),
        FieldValue::Scalar(json) => GqlValue::from_json(json.clone())
            .map_err(|e| Error::json("failed to convert record value", e)),
        FieldValue::Enum(member) => Ok(GqlValue::Enum(Name::new(gql_name(&member.name)))),
        FieldValue::Record(record) => record_to_gql_value(record),
    }
}

/// Converts a `<Model>Input` argument back into the JSON shape the model
/// validates, mapping GraphQL field names to keys and enum names to values
pub fn gql_input_to_json(model: &DynamicModel, input: &GqlValue) -> Result<Value> {
    let GqlValue::Object(entries) = input else {
        return input
            .clone()
            .into_json()
            .map_err(|e| Error::json("failed to convert graphql input", e));
    };

    let mut out = Map::with_capacity(entries.len());
    for (name, value) in entries {
        let Some(field) = model.fields().iter().find(|f| gql_name(&f.key) == name.as_str()) else {
            return Err(Error::gql(format!(
                "unknown input field '{name}' for model '{}'",
                model.name()
            )));
        };
        let converted = match (&field.kind, value) {
            (ValueKind::Enum(spec), GqlValue::Enum(item)) => spec
                .values
                .iter()
                .find(|member| gql_name(&member.name) == item.as_str())
                .map(|member| Value::String(member.value.clone()))
                .ok_or_else(|| Error::gql(format!("'{item}' is not a member of {}", spec.name)))?,
            (ValueKind::Object(nested), GqlValue::Object(_)) => gql_input_to_json(nested, value)?,
            _ => value
                .clone()
                .into_json()
                .map_err(|e| Error::json("failed to convert graphql input", e))?,
        };
        out.insert(field.key.clone(), converted);
    }
    Ok(Value::Object(out))
}

/// Value resolvable as the object type produced by [`model_types`]
pub fn record_to_gql_value(record: &Record) -> Result<GqlValue> {
    let entries = record
        .iter()
        .map(|(key, value)| Ok((Name::new(gql_name(key)), field_value_to_gql(value)?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(GqlValue::Object(entries.into_iter().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{EnumField, FieldCommon, FieldDefinition, IntField, ObjectField, StrField};
    use crate::model::build_dynamic_model;
    use serde_json::json;

    fn person_model() -> DynamicModel {
        let fields: Vec<FieldDefinition> = vec![
            StrField {
                common: FieldCommon::required("name"),
                ..Default::default()
            }
            .into(),
            IntField {
                common: FieldCommon::new("age"),
                ..Default::default()
            }
            .into(),
            EnumField {
                common: FieldCommon::new("status"),
                allowed_values: Some(vec!["active".into(), "inactive".into()]),
                default_str: None,
            }
            .into(),
            ObjectField {
                common: FieldCommon::new("home address"),
                fields: vec![StrField {
                    common: FieldCommon::new("city"),
                    ..Default::default()
                }
                .into()],
            }
            .into(),
        ];
        build_dynamic_model("Person", &fields).unwrap()
    }

    fn type_names(types: &[Type]) -> Vec<String> {
        types
            .iter()
            .map(|ty| match ty {
                Type::Object(object) => object.type_name().to_string(),
                Type::InputObject(input) => input.type_name().to_string(),
                Type::Enum(e) => e.type_name().to_string(),
                _ => String::new(),
            })
            .collect()
    }

    #[test]
    fn test_model_types_names() {
        let names = type_names(&model_types(&person_model()).unwrap());
        for expected in [
            "Person",
            "PersonInput",
            "PersonStatusEnum",
            "PersonHomeAddress",
            "PersonHomeAddressInput",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {expected} in {names:?}");
        }
    }

    #[test]
    fn test_empty_model_is_rejected() {
        let model = build_dynamic_model("Empty", &[]).unwrap();
        assert!(matches!(model_types(&model), Err(Error::Gql { .. })));
    }

    #[test]
    fn test_input_maps_enum_names_back_to_values() {
        let model = person_model();
        let input = GqlValue::from_json(json!({"name": "Ada", "home_address": {"city": "Paris"}})).unwrap();
        let GqlValue::Object(mut map) = input else {
            unreachable!()
        };
        map.insert(Name::new("status"), GqlValue::Enum(Name::new("INACTIVE")));

        let json = gql_input_to_json(&model, &GqlValue::Object(map)).unwrap();
        assert_eq!(
            json,
            json!({"name": "Ada", "status": "inactive", "home address": {"city": "Paris"}})
        );
    }

    #[test]
    fn test_record_value_uses_enum_names() {
        let record = person_model()
            .validate(&json!({"name": "Ada", "status": "active", "home address": {"city": "London"}}))
            .unwrap();
        let GqlValue::Object(map) = record_to_gql_value(&record).unwrap() else {
            panic!("expected an object");
        };
        assert_eq!(map.get("status"), Some(&GqlValue::Enum(Name::new("ACTIVE"))));
        assert!(matches!(map.get("home_address"), Some(GqlValue::Object(_))));
    }
}
