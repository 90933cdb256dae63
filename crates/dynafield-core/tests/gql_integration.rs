//! GraphQL schema execution over a registry

use dynafield_core::gql::build_schema;
use dynafield_core::{RecordSchemaDefinition, RecordSchemaRegistry};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;


fn registry_with_person(id: Uuid) -> Arc<RecordSchemaRegistry> {
    Arc::new(RecordSchemaRegistry::new([test_support::person_schema(id)]))
}

#[tokio::test]
async fn test_record_schema_query_resolves_union_members() {
    let id = Uuid::new_v4();
    let schema = build_schema(registry_with_person(id)).unwrap();

    let query = format!(
        r#"{{
            recordSchema(id: "{id}") {{
                name
                description
                fieldDefinitions {{
                    __typename
                    ... on StrFieldGql {{ label required constraintsStr {{ minLength maxLength }} }}
                    ... on EnumFieldGql {{ label allowedValues defaultStr }}
                    ... on ObjectFieldGql {{ label fields }}
                }}
            }}
        }}"#
    );
    let response = schema.execute(query).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let data = response.data.into_json().unwrap();
    let schema_json = &data["recordSchema"];
    assert_eq!(schema_json["name"], json!("Person"));
    assert_eq!(schema_json["description"], json!("People with every field kind"));

    let definitions = schema_json["fieldDefinitions"].as_array().unwrap();
    assert_eq!(definitions.len(), 12);
    assert_eq!(definitions[0]["__typename"], json!("StrFieldGql"));
    assert_eq!(definitions[0]["constraintsStr"], json!({"minLength": 2, "maxLength": 40}));
    assert_eq!(definitions[7]["allowedValues"], json!(["new", "active"]));
    assert_eq!(definitions[11]["fields"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_unknown_schema_resolves_to_null() {
    let schema = build_schema(registry_with_person(Uuid::new_v4())).unwrap();
    let query = format!(r#"{{ recordSchema(id: "{}") {{ name }} }}"#, Uuid::new_v4());

    let response = schema.execute(query).await;
    assert!(response.errors.is_empty());
    assert_eq!(response.data.into_json().unwrap(), json!({"recordSchema": null}));

    let response = schema.execute(r#"{ recordSchema(id: "nope") { name } }"#).await;
    assert_eq!(response.errors.len(), 1);
}

#[tokio::test]
async fn test_record_schemas_lists_everything() {
    let registry = registry_with_person(Uuid::new_v4());
    registry.register(test_support::person_schema(Uuid::new_v4()));
    let schema = build_schema(registry).unwrap();

    let response = schema.execute("{ recordSchemas { id name } }").await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["recordSchemas"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_validate_query_returns_typed_record() {
    let schema = build_schema(registry_with_person(Uuid::new_v4())).unwrap();

    let response = schema
        .execute(
            r#"{
                validatePerson(input: {name: "Ada", age: 36, status: ACTIVE, address: {city: "London"}}) {
                    name
                    age
                    status
                    address { city zip }
                }
            }"#,
        )
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({"validatePerson": {
            "name": "Ada",
            "age": 36,
            "status": "ACTIVE",
            "address": {"city": "London", "zip": null}
        }})
    );

    let response = schema
        .execute(r#"{ validatePerson(input: {name: "A", address: {city: "x"}}) { name } }"#)
        .await;
    assert_eq!(response.errors.len(), 1);
    assert!(response.errors[0].message.contains("$.name"));
}

#[tokio::test]
async fn test_schema_without_fields_stays_queryable() {
    let registry = registry_with_person(Uuid::new_v4());
    let draft = registry.register(RecordSchemaDefinition::new("Draft", vec![]));
    let schema = build_schema(registry).unwrap();

    let response = schema.execute("{ recordSchemas { name } }").await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["recordSchemas"].as_array().map(Vec::len), Some(2));

    let query = format!(r#"{{ recordSchema(id: "{}") {{ name fieldDefinitions {{ __typename }} }} }}"#, draft.id);
    let response = schema.execute(query).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({"recordSchema": {"name": "Draft", "fieldDefinitions": []}})
    );

    let response = schema.execute(r#"{ validatePerson(input: {name: "Ada"}) { name } }"#).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
}
