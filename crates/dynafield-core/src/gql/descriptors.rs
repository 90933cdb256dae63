//! Object types mirroring serialized field descriptors

use super::{DATETIME_SCALAR, DATE_SCALAR, JSON_SCALAR, UUID_SCALAR};
use crate::error::{Error, Result};
use crate::fields::{FieldDefinition, FieldKind};
use crate::registry::RecordSchemaDefinition;
use async_graphql::dynamic::{Field, FieldFuture, FieldValue, Object, ResolverContext, Type, TypeRef, Union};
use async_graphql::Value as GqlValue;
use serde::Serialize;

pub const TYPE_FIELDS_UNION: &str = "TypeFieldsUnion";
pub const RECORD_SCHEMA_TYPE: &str = "RecordSchemaDefinitionGql";

const STR_CONSTRAINTS_TYPE: &str = "StrFieldConstraintsGql";
const INT_CONSTRAINTS_TYPE: &str = "IntFieldConstraintsGql";
const FLOAT_CONSTRAINTS_TYPE: &str = "FloatFieldConstraintsGql";

/// GraphQL object name for a descriptor kind, e.g. `StrFieldGql`
pub fn descriptor_type_name(kind: FieldKind) -> String {
    format!("{}Gql", kind.typename())
}

fn kind_fields(kind: FieldKind) -> Vec<(&'static str, TypeRef)> {
    match kind {
        FieldKind::Str => vec![
            ("defaultStr", TypeRef::named(TypeRef::STRING)),
            ("constraintsStr", TypeRef::named(STR_CONSTRAINTS_TYPE)),
        ],
        FieldKind::Int => vec![
            ("defaultInt", TypeRef::named(TypeRef::INT)),
            ("constraintsInt", TypeRef::named(INT_CONSTRAINTS_TYPE)),
        ],
        FieldKind::Float => vec![
            ("defaultFloat", TypeRef::named(TypeRef::FLOAT)),
            ("constraintsFloat", TypeRef::named(FLOAT_CONSTRAINTS_TYPE)),
        ],
        FieldKind::Bool => vec![("defaultBool", TypeRef::named(TypeRef::BOOLEAN))],
        FieldKind::Date => vec![("defaultDate", TypeRef::named(DATE_SCALAR))],
        FieldKind::DateTime => vec![("defaultDatetime", TypeRef::named(DATETIME_SCALAR))],
        FieldKind::Email => vec![("defaultEmail", TypeRef::named(TypeRef::STRING))],
        FieldKind::Enum => vec![
            ("allowedValues", TypeRef::named_nn_list(TypeRef::STRING)),
            ("defaultStr", TypeRef::named(TypeRef::STRING)),
        ],
        FieldKind::Uuid => vec![("defaultUuid", TypeRef::named(UUID_SCALAR))],
        FieldKind::Json => vec![("defaultDict", TypeRef::named(JSON_SCALAR))],
        FieldKind::List => vec![("defaultList", TypeRef::named(JSON_SCALAR))],
        FieldKind::Object => vec![("fields", TypeRef::named(JSON_SCALAR))],
    }
}

/// Resolves `name` from the parent object value
fn parent_field(name: &'static str, ty: TypeRef) -> Field {
    Field::new(name, ty, move |ctx: ResolverContext| {
        FieldFuture::new(async move {
            let value = match ctx.parent_value.as_value() {
                Some(GqlValue::Object(map)) => map.get(name).cloned(),
                _ => None,
            };
            Ok(value
                .filter(|v| !matches!(v, GqlValue::Null))
                .map(FieldValue::value))
        })
    })
}

fn constraints_type(name: &str, bounds: [&'static str; 2], ty: &str) -> Object {
    bounds
        .into_iter()
        .fold(Object::new(name), |object, bound| object.field(parent_field(bound, TypeRef::named(ty))))
}

fn descriptor_object(kind: FieldKind) -> Object {
    let object = Object::new(descriptor_type_name(kind))
        .description(format!("Field descriptor of kind {}", kind.typename()))
        .field(parent_field("id", TypeRef::named_nn(TypeRef::STRING)))
        .field(parent_field("label", TypeRef::named_nn(TypeRef::STRING)))
        .field(parent_field("description", TypeRef::named(TypeRef::STRING)))
        .field(parent_field("required", TypeRef::named_nn(TypeRef::BOOLEAN)));

    kind_fields(kind)
        .into_iter()
        .fold(object, |object, (name, ty)| object.field(parent_field(name, ty)))
}

fn field_definitions_field() -> Field {
    Field::new(
        "fieldDefinitions",
        TypeRef::named_nn_list(TYPE_FIELDS_UNION),
        |ctx: ResolverContext| {
            FieldFuture::new(async move {
                let items = match ctx.parent_value.as_value() {
                    Some(GqlValue::Object(map)) => match map.get("fieldDefinitions") {
                        Some(GqlValue::List(items)) => items.clone(),
                        _ => return Ok(None),
                    },
                    _ => return Ok(None),
                };

                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let type_name = match &item {
                        GqlValue::Object(map) => match map.get("__typename") {
                            Some(GqlValue::String(tag)) => FieldKind::from_typename(tag).map(descriptor_type_name),
                            _ => None,
                        },
                        _ => None,
                    };
                    let type_name = type_name
                        .ok_or_else(|| async_graphql::Error::new("field descriptor without a known __typename"))?;
                    out.push(FieldValue::value(item).with_type(type_name));
                }
                Ok(Some(FieldValue::list(out)))
            })
        },
    )
}

/// Every type needed to expose descriptors and record schema definitions:
/// one object per descriptor kind, the constraint objects, the
/// `TypeFieldsUnion` and `RecordSchemaDefinitionGql`
pub fn descriptor_types() -> Vec<Type> {
    let mut types: Vec<Type> = vec![
        constraints_type(STR_CONSTRAINTS_TYPE, ["minLength", "maxLength"], TypeRef::INT).into(),
        constraints_type(INT_CONSTRAINTS_TYPE, ["geInt", "leInt"], TypeRef::INT).into(),
        constraints_type(FLOAT_CONSTRAINTS_TYPE, ["geFloat", "leFloat"], TypeRef::FLOAT).into(),
    ];

    let mut union = Union::new(TYPE_FIELDS_UNION).description("Any field descriptor");
    for kind in FieldKind::ALL {
        types.push(descriptor_object(kind).into());
        union = union.possible_type(descriptor_type_name(kind));
    }
    types.push(union.into());

    let schema = Object::new(RECORD_SCHEMA_TYPE)
        .description("A named list of field descriptors")
        .field(parent_field("id", TypeRef::named_nn(UUID_SCALAR)))
        .field(parent_field("name", TypeRef::named_nn(TypeRef::STRING)))
        .field(parent_field("description", TypeRef::named(TypeRef::STRING)))
        .field(field_definitions_field());
    types.push(schema.into());

    types
}

fn to_gql<T: Serialize>(value: &T, what: &str) -> Result<GqlValue> {
    let json = serde_json::to_value(value).map_err(|e| Error::json(format!("failed to serialize {what}"), e))?;
    GqlValue::from_json(json).map_err(|e| Error::json(format!("failed to convert {what}"), e))
}

/// Value resolvable as the descriptor's `...Gql` object type
pub fn descriptor_to_gql_value(definition: &FieldDefinition) -> Result<GqlValue> {
    to_gql(definition, "field descriptor")
}

/// Value resolvable as `RecordSchemaDefinitionGql`
pub fn schema_to_gql_value(schema: &RecordSchemaDefinition) -> Result<GqlValue> {
    to_gql(schema, "record schema")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldCommon, IntConstraints, IntField, StrField};

    #[test]
    fn test_descriptor_value_shape() {
        let field = FieldDefinition::from(IntField {
            common: FieldCommon::new("Age"),
            default_int: Some(18),
            constraints_int: Some(IntConstraints {
                ge_int: Some(0),
                le_int: None,
            }),
        });

        let GqlValue::Object(map) = descriptor_to_gql_value(&field).unwrap() else {
            panic!("expected an object");
        };
        assert_eq!(map.get("__typename"), Some(&GqlValue::String("IntField".into())));
        assert_eq!(map.get("label"), Some(&GqlValue::String("Age".into())));
        assert!(map.contains_key("defaultInt"));
        assert!(map.contains_key("constraintsInt"));
    }

    #[test]
    fn test_schema_value_lists_descriptors() {
        let schema = RecordSchemaDefinition::new("People", vec![StrField {
                common: FieldCommon::new("Name"),
                ..Default::default()
            }
            .into()]);
        let GqlValue::Object(map) = schema_to_gql_value(&schema).unwrap() else {
            panic!("expected an object");
        };
        match map.get("fieldDefinitions") {
            Some(GqlValue::List(items)) => assert_eq!(items.len(), 1),
            other => panic!("unexpected fieldDefinitions: {other:?}"),
        }
    }

    #[test]
    fn test_descriptor_types_cover_every_kind() {
        // 3 constraint objects + 12 kinds + union + schema object
        assert_eq!(descriptor_types().len(), 3 + FieldKind::ALL.len() + 2);
    }
}
