//! Loading schema documents from disk, validating them and building registries

use dynafield_schemas::loader::{CacheConfig, EnvExpander, LoaderConfig, LoaderError, SchemaLoader};
use dynafield_schemas::{create_record_schema_validator, validate_record_schemas_batch, SchemaValidator, ValidationConfig};
use serde_json::json;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

const ORDERS_JSON: &str = r#"{
    "tenantId": "acme",
    "userId": "u-7",
    "name": "Orders",
    "description": "Orders placed through the shop",
    "fieldSchema": [
        {"__typename": "FloatField", "label": "total", "required": true},
        {"__typename": "EnumField", "label": "State", "allowedValues": ["open", "paid"], "defaultStr": "open"}
    ]
}"#;

#[test]
fn test_load_then_validate_record() {
    let dir = tempdir().unwrap();
    let path = write(
        dir.path(),
        "people.yml",
        "name: People\nfieldDefinitions:\n  - __typename: StrField\n    label: name\n    required: true\n  - __typename: IntField\n    label: age\n    constraintsInt: {geInt: 0}\n",
    );

    let mut loader = SchemaLoader::new();
    let schema = loader.load_record_schema(&path).unwrap();
    let model = schema.build_record_model().unwrap();
    let record = model.validate(&json!({"name": "Grace", "age": "85"})).unwrap();
    assert_eq!(record.get_i64("age"), Some(85));
}

#[test]
fn test_load_document() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "orders.json", ORDERS_JSON);

    let document = SchemaLoader::new().load_document(&path).unwrap();
    assert_eq!(document.tenant_id, "acme");
    assert_eq!(document.field_schema.len(), 2);
    assert_eq!(document.to_model().unwrap().name(), "Orders");
}

#[test]
fn test_loaded_value_passes_strict_lint() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "orders.json", ORDERS_JSON);

    let value = SchemaLoader::new().load_value(&path).unwrap();
    assert!(create_record_schema_validator().validate(&value).is_ok());
}

#[test]
fn test_unknown_extension_falls_back_on_content() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "orders.schema", ORDERS_JSON);

    let document = SchemaLoader::new().load_document(&path).unwrap();
    assert_eq!(document.name, "Orders");
}

#[test]
fn test_env_expansion_can_be_disabled() {
    let dir = tempdir().unwrap();
    let path = write(
        dir.path(),
        "raw.yaml",
        "name: ${ENV:DYNAFIELD_UNSET_FOR_TESTS}\nfieldDefinitions:\n  - {__typename: StrField, label: a}\n",
    );

    let err = SchemaLoader::new().load_value(&path).unwrap_err();
    assert!(matches!(err, LoaderError::EnvironmentError { .. }));
    assert!(err.is_recoverable());

    let config = LoaderConfig {
        allow_env_expansion: false,
        ..LoaderConfig::default()
    };
    let value = SchemaLoader::with_config(config).load_value(&path).unwrap();
    assert_eq!(value["name"], "${ENV:DYNAFIELD_UNSET_FOR_TESTS}");
}

#[test]
fn test_env_values_feed_descriptors() {
    let dir = tempdir().unwrap();
    let path = write(
        dir.path(),
        "limits.yaml",
        "name: Limits\nfieldDefinitions:\n  - __typename: StrField\n    label: ${ENV:LABEL_NAME}\n",
    );

    let mut loader = SchemaLoader::new().with_env(EnvExpander::new().with_var("LABEL_NAME", "region"));
    let schema = loader.load_record_schema(&path).unwrap();
    assert_eq!(schema.fields()[0].label(), "region");
}

#[test]
fn test_cache_reuse_and_reload() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "orders.json", ORDERS_JSON);

    let mut loader = SchemaLoader::new();
    loader.load_value(&path).unwrap();
    loader.load_value(&path).unwrap();
    assert_eq!(loader.cache_stats().total_entries, 1);

    let reloaded = loader.reload(&path).unwrap();
    assert_eq!(reloaded["name"], "Orders");

    loader.clear_cache();
    assert!(!loader.is_cached(&path).unwrap());
}

#[test]
fn test_disabled_cache() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "orders.json", ORDERS_JSON);

    let config = LoaderConfig {
        cache: CacheConfig {
            enabled: false,
            max_entries: 4,
            max_age: Some(Duration::from_secs(5)),
        },
        ..LoaderConfig::default()
    };
    let mut loader = SchemaLoader::with_config(config);
    loader.load_value(&path).unwrap();
    assert!(!loader.is_cached(&path).unwrap());
}

#[test]
fn test_registry_from_nested_directories() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("more")).unwrap();
    write(
        dir.path(),
        "a.json",
        r#"{"name": "A", "fieldDefinitions": [{"__typename": "StrField", "label": "x"}]}"#,
    );
    write(
        &dir.path().join("more"),
        "b.yaml",
        "name: B\nfieldDefinitions:\n  - {__typename: IntField, label: y}\n",
    );

    let flat = SchemaLoader::new().load_registry(dir.path()).unwrap();
    assert_eq!(flat.len(), 1);

    let config = LoaderConfig {
        recursive: true,
        ..LoaderConfig::default()
    };
    let nested = SchemaLoader::with_config(config).load_registry(dir.path()).unwrap();
    assert_eq!(nested.len(), 2);
}

#[test]
fn test_registry_stops_at_broken_document() {
    let dir = tempdir().unwrap();
    write(dir.path(), "broken.json", "{ not json");

    let err = SchemaLoader::new().load_registry(dir.path()).unwrap_err();
    assert!(matches!(err, LoaderError::JsonParseError { .. }));
    assert!(err.path().is_some());
}

#[test]
fn test_missing_file() {
    let err = SchemaLoader::new()
        .load_value(Path::new("/definitely/not/here.yaml"))
        .unwrap_err();
    assert!(matches!(err, LoaderError::IoError { .. }));
}

#[test]
fn test_batch_over_loaded_documents() {
    let dir = tempdir().unwrap();
    let good = write(dir.path(), "orders.json", ORDERS_JSON);
    let bad = write(
        dir.path(),
        "bad.yaml",
        "fieldDefinitions:\n  - {__typename: EnumField, label: e, allowedValues: [a], defaultStr: z}\n",
    );

    let mut loader = SchemaLoader::new();
    let documents = vec![loader.load_value(&good).unwrap(), loader.load_value(&bad).unwrap()];
    let errors = validate_record_schemas_batch(&documents, &ValidationConfig::partial()).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors.at("$[1].fieldDefinitions[0].defaultStr").is_some());
}
