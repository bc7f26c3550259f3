//! Query translation and backend errors

use thiserror::Error;

use crate::ApiType;

/// Result type for translator operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Failure reported by a [`QueryBackend`](crate::QueryBackend)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The backend has no such capability
    #[error("Not supported by backend: {0}")]
    Unsupported(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// A constraint that cannot be expressed as a backend request
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranslateError {
    /// The constraint shape has no representation for the active backend
    #[error("{backend} cannot express {what}")]
    Unsupported { what: String, backend: ApiType },

    /// Required data is missing or inconsistent
    #[error("Malformed constraint: {0}")]
    Malformed(String),

    /// A subject-level constraint was required
    #[error("{class_name} is not a subject-level constraint")]
    NotSubjectLevel { class_name: String },
}

impl TranslateError {
    pub fn unsupported(what: impl Into<String>, backend: ApiType) -> Self {
        Self::Unsupported {
            what: what.into(),
            backend,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    pub fn not_subject_level(class_name: impl Into<String>) -> Self {
        Self::NotSubjectLevel {
            class_name: class_name.into(),
        }
    }
}

/// Errors raised by the [`QueryTranslator`](crate::QueryTranslator)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The operation is not available for the configured backend.
    /// Raised before any backend call is made.
    #[error("Operation '{operation}' is not supported by the {backend} backend")]
    UnsupportedOperation { operation: String, backend: ApiType },

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Translate(#[from] TranslateError),
}

impl QueryError {
    /// Create an unsupported operation error
    pub fn unsupported(operation: impl Into<String>, backend: ApiType) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
            backend,
        }
    }

    /// "Feature not available": retrying cannot help
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedOperation { .. }
                | Self::Backend(BackendError::Unsupported(_))
                | Self::Translate(TranslateError::Unsupported { .. })
        )
    }

    /// "Try again": the failure came from the transport
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Backend(BackendError::Network(_)))
    }
}
