//! Top nodes command implementation

use super::output;
use anyhow::Result;
use cohort_tree::get_top_paths;
use std::path::Path;

/// Print the topmost paths of a selection, one per line
pub fn top_nodes(paths: &[String], output_file: Option<&Path>) -> Result<()> {
    let top = get_top_paths(paths);
    output::write_output(&top.join("\n"), output_file)
}
