//! Translate command implementation

use super::output;
use anyhow::{Context, Result};
use cohort_constraint::Constraint;
use cohort_query::{ApiType, translate_constraint};
use std::fs;
use std::path::PathBuf;

/// Configuration for translate command
pub struct TranslateConfig {
    pub constraint: PathBuf,
    pub api_type: ApiType,
    pub pretty: bool,
    pub output_file: Option<PathBuf>,
}

/// Translate a constraint file into the wire form of the configured backend
pub async fn translate(config: TranslateConfig) -> Result<()> {
    let content = fs::read_to_string(&config.constraint).with_context(|| {
        format!("Failed to read constraint file: {}", config.constraint.display())
    })?;
    let constraint: Constraint = serde_json::from_str(&content).with_context(|| {
        format!("Failed to parse constraint file: {}", config.constraint.display())
    })?;

    let wire = translate_constraint(config.api_type, &constraint)
        .with_context(|| format!("Failed to translate constraint for {}", config.api_type))?;

    let output_content = output::format_json(&wire, config.pretty)?;
    output::write_output(&output_content, config.output_file.as_deref())
}
