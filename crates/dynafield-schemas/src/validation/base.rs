//! Validator trait and traversal context for schema documents
//!
//! Copyright (c) 2025 Dynafield Team
//! Licensed under the Apache-2.0 license

use dynafield_core::{ValidationError, ValidationErrors};

/// How many rules a document is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Every rule, ending with a full compile of the descriptors
    Strict,
    /// Structure plus per-descriptor consistency rules
    Partial,
    /// Document structure only
    Basic,
}

impl ValidationMode {
    /// Whether rules introduced at `level` apply in this mode
    pub fn includes(self, level: ValidationMode) -> bool {
        self.rank() >= level.rank()
    }

    fn rank(self) -> u8 {
        match self {
            ValidationMode::Basic => 0,
            ValidationMode::Partial => 1,
            ValidationMode::Strict => 2,
        }
    }
}

/// Where in the document a rule is being checked
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// Current JSON path
    pub path: String,
    pub mode: ValidationMode,
}

impl ValidationContext {
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            path: "$".to_string(),
            mode,
        }
    }

    /// Create a child context with updated path
    pub fn child<P: AsRef<str>>(&self, path_segment: P) -> Self {
        Self {
            path: format!("{}.{}", self.path, path_segment.as_ref()),
            mode: self.mode,
        }
    }

    /// Create a child context for array index
    pub fn child_index(&self, index: usize) -> Self {
        Self {
            path: format!("{}[{}]", self.path, index),
            mode: self.mode,
        }
    }

    /// Error at the current path
    pub fn error(&self, message: impl Into<String>) -> ValidationError {
        ValidationError::new(&self.path, message)
    }

    /// Error at the current path with a single violated rule
    pub fn violation(
        &self,
        message: impl Into<String>,
        rule: &str,
        expected: &str,
        actual: impl Into<String>,
    ) -> ValidationError {
        ValidationError::rule(&self.path, message, rule, expected, actual)
    }
}

/// Base trait for schema document validators
pub trait SchemaValidator {
    /// The type being validated
    type Input;

    /// Validate with every rule
    fn validate(&self, input: &Self::Input) -> Result<(), ValidationErrors> {
        self.validate_with_context(input, &ValidationContext::new(ValidationMode::Strict))
    }

    fn validate_with_context(&self, input: &Self::Input, context: &ValidationContext) -> Result<(), ValidationErrors>;

    fn validate_partial(&self, input: &Self::Input) -> Result<(), ValidationErrors> {
        self.validate_with_context(input, &ValidationContext::new(ValidationMode::Partial))
    }

    fn validate_basic(&self, input: &Self::Input) -> Result<(), ValidationErrors> {
        self.validate_with_context(input, &ValidationContext::new(ValidationMode::Basic))
    }

    /// Every error found in strict mode, empty when the input is valid
    fn collect_errors(&self, input: &Self::Input) -> ValidationErrors {
        self.validate(input).err().unwrap_or_default()
    }
}
