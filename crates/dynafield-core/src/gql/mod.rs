//! GraphQL mirroring of field descriptors, dynamic models and records
//!
//! Copyright (c) 2025 Dynafield Team
//! Licensed under the Apache-2.0 license
//!
//! Types are produced with the `async-graphql` dynamic schema API so that they
//! can be registered into any schema the embedding service builds. Descriptor
//! objects (`StrFieldGql`, ...) mirror the serialized descriptor shape, while
//! [`model_types`] mirrors a compiled [`DynamicModel`](crate::model::DynamicModel)
//! into an output object and a matching input object.

mod descriptors;
mod model;
mod schema;

pub use descriptors::{
    descriptor_to_gql_value, descriptor_type_name, descriptor_types, schema_to_gql_value,
    RECORD_SCHEMA_TYPE, TYPE_FIELDS_UNION,
};
pub use model::{gql_input_to_json, model_types, record_to_gql_value};
pub use schema::{build_schema, register_model_types};

use async_graphql::dynamic::{Scalar, Type};
use async_graphql::Value as GqlValue;

pub const JSON_SCALAR: &str = "JSON";
pub const UUID_SCALAR: &str = "UUID";
pub const DATE_SCALAR: &str = "Date";
pub const DATETIME_SCALAR: &str = "DateTime";

/// Custom scalars referenced by descriptor and model types
pub fn scalar_types() -> Vec<Type> {
    vec![
        Scalar::new(JSON_SCALAR)
            .description("Arbitrary JSON value")
            .into(),
        Scalar::new(UUID_SCALAR)
            .description("String encoded UUID")
            .specified_by_url("https://datatracker.ietf.org/doc/html/rfc4122")
            .validator(|v| matches!(v, GqlValue::String(s) if crate::utils::is_valid_uuid(s)))
            .into(),
        Scalar::new(DATE_SCALAR)
            .description("Calendar date, YYYY-MM-DD")
            .validator(|v| matches!(v, GqlValue::String(s) if crate::fields::parse_date(s).is_some()))
            .into(),
        Scalar::new(DATETIME_SCALAR)
            .description("RFC 3339 timestamp")
            .validator(|v| matches!(v, GqlValue::String(s) if crate::fields::parse_datetime(s).is_some()))
            .into(),
    ]
}

/// Turns an arbitrary label or key into a valid GraphQL name
pub fn gql_name(raw: &str) -> String {
    let mut name: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    // leading double underscores are reserved for introspection
    if name.starts_with("__") {
        name.insert(0, 'f');
    }
    name
}

/// PascalCase a label, used for nested type names
pub(crate) fn pascal_name(raw: &str) -> String {
    raw.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(crate::fields::capitalize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gql_name() {
        assert_eq!(gql_name("first_name"), "first_name");
        assert_eq!(gql_name("first name"), "first_name");
        assert_eq!(gql_name("1st"), "_1st");
        assert_eq!(gql_name(""), "_");
        assert_eq!(gql_name("__type"), "f__type");
    }

    #[test]
    fn test_pascal_name() {
        assert_eq!(pascal_name("home address"), "HomeAddress");
        assert_eq!(pascal_name("home_ADDRESS"), "HomeAddress");
    }
}
