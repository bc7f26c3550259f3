use thiserror::Error;

use crate::config::ConfigError;
use cohort_constraint::ConstraintError;
use cohort_query::QueryError;
use cohort_tree::TreeError;

/// Result type for the facade crate
pub type Result<T> = std::result::Result<T, Error>;

/// Any error raised by the cohort crates
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Whether the failure means "feature not available" rather than "try again"
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Query(e) if e.is_unsupported())
    }
}
