//! CLI functionality for the cohort tool
//!
//! This module contains all CLI-related functionality including:
//! - Concept listing from a tree file
//! - Count-filtered projections and selections
//! - Constraint translation
//! - Drag selection reduction
//! - Output formatting

pub mod concepts;
pub mod output;
pub mod project;
pub mod top_nodes;
pub mod translate;

use anyhow::{Context, Result};
use cohort_tree::{CatalogOptions, StaticTreeSource, TreeCatalog};
use std::path::Path;
use std::sync::Arc;

/// Load a JSON tree file into a catalog, printing failed branches as warnings
pub(crate) async fn load_catalog(tree: &Path, options: CatalogOptions) -> Result<TreeCatalog> {
    let source = StaticTreeSource::from_file(tree)
        .with_context(|| format!("Failed to read tree file: {}", tree.display()))?;
    let catalog = TreeCatalog::new(Arc::new(source), options);
    let report = catalog
        .load_root()
        .await
        .with_context(|| format!("Failed to load tree from {}", tree.display()))?;
    for (path, error) in &report.failures {
        eprintln!("{}", output::format_warning(&format!("{path}: {error}")));
    }
    Ok(catalog)
}
