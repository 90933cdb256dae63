//! Path tracking for nested record validation

/// How unknown keys in record input are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Unknown keys are reported as errors
    Strict,
    /// Unknown keys are silently dropped
    #[default]
    Lenient,
}

/// Validation context carried down through nested objects
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// Current JSON path
    pub path: String,
    /// Validation mode
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
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::new(ValidationMode::default())
    }
}
