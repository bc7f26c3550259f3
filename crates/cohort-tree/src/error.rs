//! Tree loading and navigation errors

use thiserror::Error;

/// Result type for catalog and projector operations
pub type TreeResult<T> = Result<T, TreeError>;

/// Failure reported by a [`TreeSource`](crate::TreeSource)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeSourceError {
    #[error("Tree load failed: {0}")]
    LoadFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Tree node not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised by the catalog and the projector
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    /// No node with this path exists in the tree
    #[error("Unknown tree path: {path}")]
    UnknownPath { path: String },

    /// Leaf nodes never acquire children
    #[error("Cannot attach children to leaf node {path}")]
    LeafAttach { path: String },

    /// A path would appear twice in the tree
    #[error("Duplicate tree path: {path}")]
    DuplicatePath { path: String },

    #[error(transparent)]
    Source(#[from] TreeSourceError),
}

impl TreeError {
    pub fn unknown_path(path: impl Into<String>) -> Self {
        Self::UnknownPath { path: path.into() }
    }

    pub fn leaf_attach(path: impl Into<String>) -> Self {
        Self::LeafAttach { path: path.into() }
    }

    pub fn duplicate_path(path: impl Into<String>) -> Self {
        Self::DuplicatePath { path: path.into() }
    }
}
