//! Backslash-delimited tree path helpers
//!
//! Paths take the form `\Public Studies\Demo\Age\`: a leading and a trailing
//! separator around non-empty segments.

use crate::node::TreeNode;

pub const PATH_SEPARATOR: char = '\\';

/// Proper ancestor paths of `path`, shallowest first.
///
/// The root (`\`) and the path itself are excluded. A path that does not
/// parse into segments yields an empty list.
pub fn get_parent_paths(path: &str) -> Vec<String> {
    let Some(body) = path.strip_prefix(PATH_SEPARATOR) else {
        return Vec::new();
    };
    let body = body.strip_suffix(PATH_SEPARATOR).unwrap_or(body);
    let segments: Vec<&str> = body.split(PATH_SEPARATOR).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Vec::new();
    }

    let mut prefix = String::from(PATH_SEPARATOR);
    let mut parents = Vec::with_capacity(segments.len().saturating_sub(1));
    for segment in &segments[..segments.len() - 1] {
        prefix.push_str(segment);
        prefix.push(PATH_SEPARATOR);
        parents.push(prefix.clone());
    }
    parents
}

/// Whether `ancestor` equals `path` or lies above it, respecting segment
/// boundaries (`\A\B\` is not an ancestor of `\A\BC\`)
pub fn is_ancestor_or_self(ancestor: &str, path: &str) -> bool {
    if ancestor == path {
        return true;
    }
    path.starts_with(ancestor)
        && (ancestor.ends_with(PATH_SEPARATOR)
            || path[ancestor.len()..].starts_with(PATH_SEPARATOR))
}

/// Keep the topmost items of their branches.
///
/// Items whose path is covered by an earlier kept item are discarded; an
/// item that covers kept items replaces all of them and is appended at the
/// end. No returned path is an ancestor of another, and every input path lies
/// at or below exactly one returned path.
pub fn top_by_path<T>(items: impl IntoIterator<Item = T>, path_of: impl Fn(&T) -> &str) -> Vec<T> {
    let mut top: Vec<T> = Vec::new();
    for item in items {
        let path = path_of(&item);
        if top.iter().any(|kept| is_ancestor_or_self(path_of(kept), path)) {
            continue;
        }
        top.retain(|kept| !is_ancestor_or_self(path, path_of(kept)));
        top.push(item);
    }
    top
}

/// Topmost nodes among `nodes`, used to reduce a multi-node drag selection
pub fn get_top_nodes<'a>(nodes: impl IntoIterator<Item = &'a TreeNode>) -> Vec<&'a TreeNode> {
    top_by_path(nodes, |node| node.path.as_str())
}

/// Topmost paths among `paths`
pub fn get_top_paths<S: AsRef<str>>(paths: impl IntoIterator<Item = S>) -> Vec<String> {
    top_by_path(paths, |p| p.as_ref())
        .into_iter()
        .map(|p| p.as_ref().to_string())
        .collect()
}
