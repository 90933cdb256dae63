//! Error types for the Dynafield core library
//!
//! This module defines the error handling for descriptor compilation, record
//! validation, registry lookups, signature parsing and filter compilation,
//! using thiserror for the error definitions and anyhow for wrapped sources.

use crate::validation::ValidationErrors;
use thiserror::Error;
use uuid::Uuid;

/// Main error type for Dynafield operations
#[derive(Error, Debug)]
pub enum Error {
    /// A field descriptor cannot be turned into a runtime field
    #[error("Invalid field definition '{label}': {message}")]
    FieldDefinition { label: String, message: String },

    /// A model cannot be assembled from its descriptors
    #[error("Failed to build model '{model}': {message}")]
    ModelBuild { model: String, message: String },

    /// Record data did not satisfy the model
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// Lookup of an unregistered record schema
    #[error("Record schema '{id}' is not registered")]
    SchemaNotFound { id: Uuid },

    /// Two records of different models were merged
    #[error("Cannot merge record of model '{incoming}' into '{current}'")]
    ModelMismatch { current: String, incoming: String },

    /// Malformed function signature text
    #[error("Signature parse error at offset {offset}: {message}")]
    SignatureParse { offset: usize, message: String },

    /// Invalid filter expression
    #[error("Filter error: {message}")]
    Filter { message: String },

    /// GraphQL type generation failed
    #[error("GraphQL schema error: {message}")]
    Gql { message: String },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn field_definition(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FieldDefinition {
            label: label.into(),
            message: message.into(),
        }
    }

    pub fn model_build(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModelBuild {
            model: model.into(),
            message: message.into(),
        }
    }

    pub fn filter(message: impl Into<String>) -> Self {
        Self::Filter {
            message: message.into(),
        }
    }

    pub fn gql(message: impl Into<String>) -> Self {
        Self::Gql {
            message: message.into(),
        }
    }

    pub fn json(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            message: message.into(),
            source,
        }
    }

    pub fn internal(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Validation errors carried by this error, if any
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;

    #[test]
    fn test_error_display() {
        let err = Error::field_definition("age", "Required field 'age' cannot specify a default value.");
        assert_eq!(
            err.to_string(),
            "Invalid field definition 'age': Required field 'age' cannot specify a default value."
        );

        let err = Error::from(ValidationErrors::from(ValidationError::new("$.age", "Field required")));
        assert!(err.to_string().contains("$.age"));
        assert!(err.validation_errors().is_some());
    }

    #[test]
    fn test_internal_error_keeps_source() {
        let err = Error::internal("failed to finish graphql schema", anyhow::anyhow!("type 'Book' is defined twice"));
        assert_eq!(err.to_string(), "Internal error: failed to finish graphql schema");
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("type 'Book' is defined twice"));
    }
}
