//! Concepts command implementation

use super::{load_catalog, output};
use anyhow::Result;
use cohort_tree::CatalogOptions;
use std::path::PathBuf;
use tabled::{Table, Tabled, settings::Style};

/// Configuration for concepts command
pub struct ConceptsConfig {
    pub tree: PathBuf,
    pub catalog: CatalogOptions,
    pub output_file: Option<PathBuf>,
}

#[derive(Tabled)]
struct ConceptRow {
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Type")]
    concept_type: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Path")]
    path: String,
}

/// Load a tree file and list the concepts found in it
pub async fn concepts(config: ConceptsConfig) -> Result<()> {
    let catalog = load_catalog(&config.tree, config.catalog).await?;

    let rows: Vec<ConceptRow> = catalog
        .concepts()
        .into_iter()
        .map(|concept| ConceptRow {
            label: concept.label,
            concept_type: concept.concept_type.to_string(),
            code: concept.code,
            path: concept.path,
        })
        .collect();

    let content = if rows.is_empty() {
        "No concepts found".to_string()
    } else {
        let count = rows.len();
        format!(
            "{}\n{count} concept(s)",
            Table::new(rows).with(Style::modern())
        )
    };
    output::write_output(&content, config.output_file.as_deref())
}
