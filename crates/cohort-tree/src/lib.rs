//! Cohort Ontology Tree
//!
//! This crate owns the ontology tree browsed while defining a cohort:
//!
//! - [`TreeCatalog`] loads the canonical tree from a [`TreeSource`], lazily or
//!   greedily, and derives concepts and concept constraints from CONCEPT nodes.
//! - [`TreeProjector`] derives count-filtered projections and final selections
//!   without touching the canonical tree.
//! - [`paths`] holds the path helpers used to reduce drag selections.

mod arena;
mod catalog;
mod error;
mod node;
pub mod paths;
mod projector;
mod registry;
mod source;

pub use arena::TreeArena;
pub use catalog::{
    CatalogOptions, DEFAULT_CHILD_REQUEST_DEPTH, DEFAULT_ROOT_REQUEST_DEPTH, LoadProgress,
    LoadReport, TreeCatalog,
};
pub use error::{TreeError, TreeResult, TreeSourceError};
pub use node::{ITEM_NAME_KEY, METADATA_MARKER, NodeType, TreeNode, TreeNodeData, count_label};
pub use paths::{get_parent_paths, get_top_nodes, get_top_paths};
pub use projector::{
    CountMap, Counts, EXPANDED_DISPLAY_DEPTH, TreeProjector, annotate_counts, descendants_at_depth,
    queryable_descendants,
};
pub use registry::ConceptRegistry;
pub use source::{StaticTreeSource, TreeRequest, TreeSource};
