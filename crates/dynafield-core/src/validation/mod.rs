//! Validation errors and path context shared by records and descriptor checks

pub mod context;
pub mod error;

pub use context::{ValidationContext, ValidationMode};
pub use error::{ValidationError, ValidationErrors, ValidationResult, Violation};
