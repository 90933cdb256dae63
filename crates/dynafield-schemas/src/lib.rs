//! Dynafield Schemas - loading and linting of record schema documents
//!
//! Record schemas and tenant model documents usually live as YAML or JSON
//! files next to the services that use them. This crate reads them from disk
//! and checks them before they reach the model builder in `dynafield-core`.
//!
//! ## Features
//!
//! - **Loading**: YAML/JSON with a content-based fallback for unknown extensions
//! - **Environment expansion**: `${ENV:VAR}` and `${ENV:VAR:default}` in string values
//! - **Caching**: parsed documents are reused until the file changes
//! - **Linting**: Basic, Partial and Strict validation modes with JSON paths
//! - **Batch Processing**: many documents in one pass with fail-fast and error caps
//!
//! ## Quick Start
//!
//! ```rust
//! use dynafield_schemas::{create_record_schema_validator, SchemaValidator};
//! use serde_json::json;
//!
//! let validator = create_record_schema_validator();
//! let schema = json!({
//!     "name": "People",
//!     "fieldDefinitions": [
//!         {"__typename": "IntField", "label": "age", "required": true, "defaultInt": 1}
//!     ]
//! });
//!
//! let errors = validator.validate(&schema).unwrap_err();
//! assert!(errors.at("$.fieldDefinitions[0].defaultInt").is_some());
//! ```
//!
//! Copyright (c) 2025 Dynafield Team
//! Licensed under the Apache-2.0 license

pub mod loader;
pub mod validation;

pub use loader::{
    EnvExpander, Format, LoaderConfig, LoaderError, LoaderResult, SchemaCache, SchemaLoader, SchemaParser,
};
pub use validation::{
    create_record_schema_validator, validate_record_schemas_batch, RecordSchemaValidator, SchemaValidator,
    ValidationConfig, ValidationContext, ValidationError, ValidationErrors, ValidationMode,
};
