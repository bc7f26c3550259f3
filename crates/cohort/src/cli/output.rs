//! Output formatting utilities

use anyhow::{Context, Result};
use cohort_tree::{NodeType, TreeArena};
use colored::Colorize;
use serde_json::Value;
use std::fs::File;
use std::io::{IsTerminal, Write};
use std::path::Path;

/// Set up color output based on user preference
pub fn setup_colors(mode: &str) {
    match mode.to_lowercase().as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::set_override(std::io::stdout().is_terminal()),
    }
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {:#}", "Error:".red().bold(), error)
}

/// Format a warning for display
pub fn format_warning(warning: &str) -> String {
    format!("{} {}", "Warning:".yellow().bold(), warning)
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Write content to a file, or to stdout when no file is given
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to output file: {}", path.display()))?;
        eprintln!(
            "{}",
            format_success(&format!("Output written to {}", path.display()))
        );
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Format JSON value for output
pub fn format_json(value: &Value, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value).context("Failed to serialize JSON")
    } else {
        serde_json::to_string(value).context("Failed to serialize JSON")
    }
}

/// Render a tree as an indented outline, roots first
pub fn format_tree(tree: &TreeArena) -> String {
    let mut lines = Vec::new();
    for path in tree.preorder() {
        let Some(node) = tree.get(&path) else {
            continue;
        };
        let indent = "  ".repeat(tree.level(&path).unwrap_or(0));
        let marker = if node.selected {
            "[x] "
        } else if node.partial_selected {
            "[-] "
        } else {
            ""
        };
        let label = match node.node_type {
            NodeType::Study => node.label.cyan().bold().to_string(),
            NodeType::Concept => node.label.green().to_string(),
            NodeType::Container => node.label.normal().to_string(),
        };
        lines.push(format!("{indent}{marker}{label}"));
    }
    if lines.is_empty() {
        "(empty tree)".to_string()
    } else {
        lines.join("\n")
    }
}
