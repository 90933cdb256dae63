//! Schema document loading
//!
//! Documents are YAML or JSON, chosen by extension with a content-based
//! fallback. String values may reference environment variables as
//! `${ENV:VAR}`. Parsed documents are cached per file until the file changes.
//!
//! ```rust,no_run
//! use dynafield_schemas::loader::SchemaLoader;
//! use std::path::Path;
//!
//! let mut loader = SchemaLoader::new();
//! let schema = loader.load_record_schema(Path::new("schemas/people.yaml"))?;
//! println!("{} has {} fields", schema.name, schema.fields().len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Copyright (c) 2025 Dynafield Team
//! Licensed under the Apache-2.0 license

pub mod cache;
pub mod env;
pub mod error;
pub mod parser;
pub mod schema_loader;

pub use cache::{CacheConfig, CacheEntry, CacheStats, SchemaCache};
pub use env::EnvExpander;
pub use error::{LoaderError, LoaderResult};
pub use parser::{Format, SchemaParser};
pub use schema_loader::{LoaderConfig, SchemaLoader};
