//! Dynafield Core - runtime field descriptors compiled into validated record models
//!
//! Callers describe a record shape at runtime as a list of typed field
//! descriptors and get back a concrete, validating model plus a matching
//! GraphQL type.
//!
//! # Main Components
//!
//! - **Fields**: serializable descriptors for every supported kind, tagged by `__typename`
//! - **Model**: the dynamic model builder, record validation, merging and diffing
//! - **Registry**: named record schema definitions with cached compiled models
//! - **Signature**: descriptors inferred from a function signature
//! - **GQL**: `async-graphql` dynamic types mirroring descriptors and models
//! - **Expressions**: filter trees compiled to SQL or evaluated in memory
//!
//! # Example
//!
//! ```rust
//! use dynafield_core::{build_dynamic_model, FieldDefinition, Result};
//! use serde_json::json;
//!
//! fn example() -> Result<()> {
//!     let fields: Vec<FieldDefinition> = serde_json::from_value(json!([
//!         {"__typename": "StrField", "label": "name", "required": true},
//!         {"__typename": "IntField", "label": "age", "constraintsInt": {"geInt": 0}}
//!     ]))
//!     .map_err(|e| dynafield_core::Error::json("bad descriptors", e))?;
//!
//!     let model = build_dynamic_model("Person", &fields)?;
//!     let record = model.validate(&json!({"name": "Ada", "age": "36"}))?;
//!     assert_eq!(record.get_i64("age"), Some(36));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod document;
pub mod error;
pub mod expressions;
pub mod fields;
pub mod gql;
pub mod model;
pub mod registry;
pub mod signature;
pub mod utils;
pub mod validation;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use fields::{CompiledField, FieldCommon, FieldDefinition, FieldKind, ValueKind};
pub use model::{build_dynamic_model, DumpOptions, DynamicModel, FieldValue, MergeOptions, Record};
pub use registry::{RecordSchemaDefinition, RecordSchemaRegistry};
pub use document::DynamicModelDocument;
pub use signature::{build_model_from_signature, fields_from_signature, FieldOverride, FunctionSignature};
pub use expressions::{FilterExpression, SqlFilterBuilder};
pub use validation::{ValidationContext, ValidationError, ValidationErrors, ValidationMode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
