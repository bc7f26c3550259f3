//! Constraint model errors

use thiserror::Error;

/// Result type for constraint construction
pub type ConstraintResult<T> = Result<T, ConstraintError>;

/// Errors raised while building constraints from loosely typed input
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConstraintError {
    /// Operator string not recognised for the given operator family
    #[error("Unknown {family} operator: '{operator}'")]
    UnknownOperator { family: String, operator: String },

    /// Discriminator does not name a constraint variant
    #[error("Unknown constraint class: {class_name}")]
    UnknownClass { class_name: String },

    /// Concept type string not recognised
    #[error("Unknown concept type: {name}")]
    UnknownConceptType { name: String },
}

impl ConstraintError {
    /// Create an unknown operator error
    pub fn unknown_operator(family: impl Into<String>, operator: impl Into<String>) -> Self {
        Self::UnknownOperator {
            family: family.into(),
            operator: operator.into(),
        }
    }

    /// Create an unknown class error
    pub fn unknown_class(class_name: impl Into<String>) -> Self {
        Self::UnknownClass {
            class_name: class_name.into(),
        }
    }
}
