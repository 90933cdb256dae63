//! Schema assembly over a record schema registry

use super::{
    descriptor_types, gql_input_to_json, gql_name, model_types, record_to_gql_value, scalar_types, schema_to_gql_value,
    RECORD_SCHEMA_TYPE, TYPE_FIELDS_UNION,
};
use crate::error::{Error, Result};
use crate::model::DynamicModel;
use crate::registry::RecordSchemaRegistry;
use crate::utils::get_valid_uuid;
use async_graphql::dynamic::{Field, FieldFuture, FieldValue, InputValue, Object, ResolverContext, Schema, SchemaBuilder, TypeRef};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Registers the types mirroring `model` into `builder`
pub fn register_model_types(mut builder: SchemaBuilder, model: &DynamicModel) -> Result<SchemaBuilder> {
    for ty in model_types(model)? {
        trace!("adding type: {ty:?}");
        builder = builder.register(ty);
    }
    Ok(builder)
}

fn record_schema_query() -> Field {
    Field::new(
        "recordSchema",
        TypeRef::named(RECORD_SCHEMA_TYPE),
        |ctx: ResolverContext| {
            FieldFuture::new(async move {
                let registry = ctx.data::<Arc<RecordSchemaRegistry>>()?;
                let raw = ctx.args.try_get("id")?.string()?;
                let id = get_valid_uuid(raw)
                    .ok_or_else(|| async_graphql::Error::new(format!("'{raw}' is not a valid schema id")))?;

                match registry.get(id) {
                    Ok(schema) => Ok(Some(FieldValue::value(schema_to_gql_value(&schema)?))),
                    Err(Error::SchemaNotFound { .. }) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
        },
    )
    .argument(InputValue::new("id", TypeRef::named_nn(TypeRef::ID)))
}

fn record_schemas_query() -> Field {
    Field::new(
        "recordSchemas",
        TypeRef::named_nn_list_nn(RECORD_SCHEMA_TYPE),
        |ctx: ResolverContext| {
            FieldFuture::new(async move {
                let registry = ctx.data::<Arc<RecordSchemaRegistry>>()?;
                let values = registry
                    .list()
                    .iter()
                    .map(|schema| schema_to_gql_value(schema).map(FieldValue::value))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Some(FieldValue::list(values)))
            })
        },
    )
}

/// `validate<Model>(input: <Model>Input!): <Model>` runs lenient validation
/// and returns the typed record
fn validate_query(model: Arc<DynamicModel>, type_name: &str) -> Field {
    Field::new(
        format!("validate{type_name}"),
        TypeRef::named(type_name),
        move |ctx: ResolverContext| {
            let model = model.clone();
            FieldFuture::new(async move {
                let input = ctx.args.try_get("input")?;
                let json = gql_input_to_json(&model, input.as_value())?;
                let record = model.validate(&json)?;
                Ok(Some(FieldValue::value(record_to_gql_value(&record)?)))
            })
        },
    )
    .argument(InputValue::new("input", TypeRef::named_nn(format!("{type_name}Input"))))
}

/// Builds a schema exposing the registry through `recordSchema(id)` and
/// `recordSchemas`, with the mirrored types of every registered schema's
/// model registered alongside
pub fn build_schema(registry: Arc<RecordSchemaRegistry>) -> Result<Schema> {
    let mut query = Object::new("Query")
        .field(record_schema_query())
        .field(record_schemas_query());

    let mut builder = Schema::build("Query", None, None);
    for ty in scalar_types().into_iter().chain(descriptor_types()) {
        builder = builder.register(ty);
    }

    let mut model_names: HashSet<String> =
        ["Query", RECORD_SCHEMA_TYPE, TYPE_FIELDS_UNION].into_iter().map(String::from).collect();
    let mut exposed = 0;
    for schema in registry.list() {
        // A schema that cannot compile stays listed but gets no model types
        let model = match registry.build_model(schema.id) {
            Ok(model) => model,
            Err(e) => {
                warn!(
                    schema = %schema.id,
                    name = %schema.name,
                    error = %e,
                    "schema has no usable model, skipping its types"
                );
                continue;
            }
        };
        let type_name = gql_name(model.name());
        if !model_names.insert(type_name.clone()) {
            warn!(schema = %schema.id, model = model.name(), "model type name already registered, skipping");
            continue;
        }
        let types = match model_types(&model) {
            Ok(types) => types,
            Err(e) => {
                warn!(schema = %schema.id, model = model.name(), error = %e, "cannot mirror model, skipping its types");
                continue;
            }
        };
        for ty in types {
            trace!("adding type: {ty:?}");
            builder = builder.register(ty);
        }
        query = query.field(validate_query(model, &type_name));
        exposed += 1;
    }
    debug!(models = exposed, "built graphql schema");

    builder
        .register(query)
        .data(registry)
        .finish()
        .map_err(|e| Error::internal("failed to finish graphql schema", anyhow::anyhow!(e.0)))
}
