//! Project command implementation

use super::{load_catalog, output};
use anyhow::{Context, Result};
use cohort_tree::{CatalogOptions, CountMap, TreeProjector};
use std::fs;
use std::path::PathBuf;

/// Configuration for project command
pub struct ProjectConfig {
    pub tree: PathBuf,
    pub counts: PathBuf,
    pub select: Vec<String>,
    pub catalog: CatalogOptions,
    pub output_file: Option<PathBuf>,
}

/// Print the count-filtered projection of a tree, or the final selection
/// when paths are selected
pub async fn project(config: ProjectConfig) -> Result<()> {
    let catalog = load_catalog(&config.tree, config.catalog).await?;

    let counts_content = fs::read_to_string(&config.counts)
        .with_context(|| format!("Failed to read counts file: {}", config.counts.display()))?;
    let counts: CountMap = serde_json::from_str(&counts_content)
        .with_context(|| format!("Failed to parse counts file: {}", config.counts.display()))?;

    let mut projector = TreeProjector::new();
    let canonical = catalog.snapshot();
    projector
        .project(&canonical, &counts)
        .context("Failed to project tree")?;

    let content = if config.select.is_empty() {
        output::format_tree(projector.projection())
    } else {
        let marked = projector.select_paths(config.select.as_slice());
        if marked < config.select.len() {
            eprintln!(
                "{}",
                output::format_warning(&format!(
                    "{} of {} selected path(s) are not in the projection",
                    config.select.len() - marked,
                    config.select.len()
                ))
            );
        }
        let selection = projector
            .commit_selection()
            .context("Failed to build final selection")?;
        output::format_tree(selection)
    };
    output::write_output(&content, config.output_file.as_deref())
}
