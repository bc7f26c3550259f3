//! Cohort definition core
//!
//! This crate ties together:
//! - [`constraint`]: the constraint expressions a cohort is defined by
//! - [`tree`]: the ontology tree catalog, lazy/greedy loading and projections
//! - [`query`]: backend-specific translation and composed query calls
//! - [`config`]: startup configuration selecting the backend and loading mode
//!
//! # Example
//!
//! ```
//! use cohort::config::AppConfig;
//! use cohort::query::ApiType;
//!
//! let config =
//!     AppConfig::from_yaml_str("api-type: PICSURE\nenable-greedy-tree-loading: false").unwrap();
//! assert_eq!(config.api_type().unwrap(), ApiType::PicSure);
//! assert!(!config.catalog_options().greedy);
//! ```

pub use cohort_constraint as constraint;
pub use cohort_query as query;
pub use cohort_tree as tree;

pub mod config;
mod error;

// Convenience re-exports
pub use cohort_constraint::{Concept, ConceptConstraint, Constraint};
pub use cohort_query::{ApiType, QueryBackend, QueryTranslator};
pub use cohort_tree::{TreeArena, TreeCatalog, TreeProjector, TreeSource};
pub use crate::config::{AppConfig, ConfigError};
pub use error::{Error, Result};

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
