//! Filtered views of the catalog tree
//!
//! The projector keeps three trees apart: a cached copy of the canonical tree
//! taken on first use, the projection derived from it for a count map, and
//! the final selection committed from the projection. Each is an independent
//! [`TreeArena`]; none of them shares nodes with the canonical tree.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::arena::TreeArena;
use crate::node::NodeType;
use crate::{TreeError, TreeResult};

/// Display depth (roots are at depth 1) up to which projected containers
/// start expanded
pub const EXPANDED_DISPLAY_DEPTH: usize = 2;

/// Subject and observation counts of one concept or study
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counts {
    pub patient_count: i64,
    pub observation_count: i64,
}

impl Counts {
    pub fn new(patient_count: i64, observation_count: i64) -> Self {
        Self {
            patient_count,
            observation_count,
        }
    }
}

/// Counts keyed by concept code (or study id). A missing key means "not yet
/// counted".
pub type CountMap = IndexMap<String, Counts>;

/// Nodes exactly `depth - 1` levels below `path`.
///
/// A depth of 2 or less yields the immediate children; every step above 2
/// descends one more level. This is the frontier of a request of the same
/// depth: those nodes arrived without their children.
pub fn descendants_at_depth(arena: &TreeArena, path: &str, depth: usize) -> Vec<String> {
    fn walk(arena: &TreeArena, path: &str, depth: usize, out: &mut Vec<String>) {
        let Some(node) = arena.get(path) else {
            return;
        };
        if depth <= 2 {
            out.extend(node.child_paths().iter().cloned());
        } else {
            for child in node.child_paths() {
                walk(arena, child, depth - 1, out);
            }
        }
    }
    let mut out = Vec::new();
    walk(arena, path, depth, &mut out);
    out
}

/// Direct children of `path` that have children themselves
pub fn queryable_descendants(arena: &TreeArena, path: &str) -> Vec<String> {
    arena
        .children(path)
        .filter(|child| child.has_children())
        .map(|child| child.path.clone())
        .collect()
}

/// Store cached subject counts on STUDY and CONCEPT nodes.
///
/// Studies are looked up by study id in `study_counts`, concepts by concept
/// code in `concept_counts`. Missing keys store `None`.
pub fn annotate_counts(arena: &mut TreeArena, study_counts: &CountMap, concept_counts: &CountMap) {
    for node in arena.iter_mut() {
        let (key, map) = match node.node_type {
            NodeType::Study => (
                node.study_id.as_ref().or(node.concept_code.as_ref()),
                study_counts,
            ),
            NodeType::Concept => (node.concept_code.as_ref(), concept_counts),
            NodeType::Container => continue,
        };
        node.patient_count = key.and_then(|k| map.get(k)).map(|c| c.patient_count);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keep {
    /// Concept code present in the count map
    Matched,
    /// Below a matched node
    Inside,
    /// Container on the way to a matched node
    Container,
}

/// Builds projections and final selections from the catalog tree
#[derive(Debug, Clone, Default)]
pub struct TreeProjector {
    base: Option<TreeArena>,
    projection: TreeArena,
    final_selection: TreeArena,
}

impl TreeProjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a copy of the canonical tree is cached
    pub fn has_base(&self) -> bool {
        self.base.is_some()
    }

    /// Drop the cached copy; the next projection copies the canonical tree again
    pub fn reset(&mut self) {
        self.base = None;
    }

    pub fn projection(&self) -> &TreeArena {
        &self.projection
    }

    pub fn final_selection(&self) -> &TreeArena {
        &self.final_selection
    }

    /// Rebuild the projection for `counts`.
    ///
    /// Nodes whose concept code is a key of `counts` are kept with their
    /// subtree and get the counts in their label. Containers are kept only
    /// when some descendant is kept. Selection is cleared.
    pub fn project(&mut self, canonical: &TreeArena, counts: &CountMap) -> TreeResult<&TreeArena> {
        let base: &TreeArena = self.base.get_or_insert_with(|| canonical.clone());

        let mut keep = HashMap::new();
        for root in base.root_paths() {
            mark_kept(base, root, counts, &mut keep);
        }

        let mut projection = TreeArena::new();
        for root in base.root_paths() {
            copy_projected(base, root, None, 1, counts, &keep, &mut projection)?;
        }
        self.projection = projection;
        Ok(&self.projection)
    }

    /// Mark projection nodes whose path is listed as selected.
    /// Returns the number of nodes marked.
    pub fn select_paths<S: AsRef<str>>(&mut self, paths: &[S]) -> usize {
        let wanted: HashSet<&str> = paths.iter().map(AsRef::as_ref).collect();
        let mut marked = 0;
        for node in self.projection.iter_mut() {
            if wanted.contains(node.path.as_str()) {
                node.selected = true;
                marked += 1;
            }
        }
        marked
    }

    pub fn select_all(&mut self) {
        for node in self.projection.iter_mut() {
            node.selected = true;
        }
    }

    pub fn clear_selection(&mut self) {
        for node in self.projection.iter_mut() {
            node.selected = false;
            node.partial_selected = false;
        }
    }

    pub fn set_selected(&mut self, path: &str, selected: bool) -> TreeResult<()> {
        let node = self
            .projection
            .get_mut(path)
            .ok_or_else(|| TreeError::unknown_path(path))?;
        node.selected = selected;
        Ok(())
    }

    pub fn set_partial_selected(&mut self, path: &str, partial: bool) -> TreeResult<()> {
        let node = self
            .projection
            .get_mut(path)
            .ok_or_else(|| TreeError::unknown_path(path))?;
        node.partial_selected = partial;
        Ok(())
    }

    /// Selected projection paths, in tree order
    pub fn selected_paths(&self) -> Vec<String> {
        self.projection
            .preorder()
            .into_iter()
            .filter(|p| self.projection.get(p).is_some_and(|n| n.selected))
            .collect()
    }

    /// Replace the final selection with the selected and partially selected
    /// nodes of the projection, plus the containers leading to them
    pub fn commit_selection(&mut self) -> TreeResult<&TreeArena> {
        let mut keep = HashSet::new();
        for root in self.projection.root_paths() {
            mark_selected(&self.projection, root, &mut keep);
        }

        let mut selection = TreeArena::new();
        for path in self.projection.preorder() {
            if !keep.contains(&path) {
                continue;
            }
            let Some(node) = self.projection.get(&path) else {
                continue;
            };
            let parent = node.parent().filter(|p| keep.contains(*p));
            selection.insert(node.clone(), parent)?;
        }
        self.final_selection = selection;
        Ok(&self.final_selection)
    }

    /// Expand or collapse every projection node
    pub fn expand_all(&mut self, expanded: bool) {
        for node in self.projection.iter_mut() {
            node.expanded = expanded;
        }
    }
}

fn mark_kept(
    base: &TreeArena,
    path: &str,
    counts: &CountMap,
    keep: &mut HashMap<String, Keep>,
) -> bool {
    let Some(node) = base.get(path) else {
        return false;
    };
    if node.concept_code.as_ref().is_some_and(|code| counts.contains_key(code)) {
        keep.insert(path.to_string(), Keep::Matched);
        for inner in base.descendants(path) {
            keep.insert(inner, Keep::Inside);
        }
        return true;
    }

    let mut any = false;
    for child in node.child_paths() {
        any |= mark_kept(base, child, counts, keep);
    }
    if any {
        keep.insert(path.to_string(), Keep::Container);
    }
    any
}

fn copy_projected(
    base: &TreeArena,
    path: &str,
    parent: Option<&str>,
    depth: usize,
    counts: &CountMap,
    keep: &HashMap<String, Keep>,
    out: &mut TreeArena,
) -> TreeResult<()> {
    let (Some(node), Some(kind)) = (base.get(path), keep.get(path)) else {
        return Ok(());
    };

    let mut copy = node.clone();
    copy.selected = false;
    copy.partial_selected = false;
    match kind {
        Keep::Matched => {
            copy.expanded = false;
            if let Some(c) = copy.concept_code.as_ref().and_then(|code| counts.get(code)) {
                copy.label = format!(
                    "{} (sub: {}, obs: {})",
                    copy.name, c.patient_count, c.observation_count
                );
            }
        }
        Keep::Container => copy.expanded = depth <= EXPANDED_DISPLAY_DEPTH,
        Keep::Inside => {}
    }
    out.insert(copy, parent)?;

    for child in node.child_paths() {
        copy_projected(base, child, Some(path), depth + 1, counts, keep, out)?;
    }
    Ok(())
}

fn mark_selected(projection: &TreeArena, path: &str, keep: &mut HashSet<String>) -> bool {
    let Some(node) = projection.get(path) else {
        return false;
    };
    let mut any = false;
    for child in node.child_paths() {
        any |= mark_selected(projection, child, keep);
    }
    let kept = node.selected || node.partial_selected || any;
    if kept {
        keep.insert(path.to_string());
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::TreeNodeData;
    use cohort_constraint::ConceptType;

    fn tree() -> TreeArena {
        let mut arena =
            TreeArena::from_roots(vec![TreeNodeData::study("\\S\\", "S", "S")]).unwrap();
        arena
            .attach_children(
                "\\S\\",
                vec![
                    TreeNodeData::container("\\S\\A\\", "A").with_children(vec![
                        TreeNodeData::concept("\\S\\A\\x\\", "x", ConceptType::Numerical, "X"),
                    ]),
                    TreeNodeData::concept("\\S\\y\\", "y", ConceptType::Categorical, "Y"),
                ],
            )
            .unwrap();
        arena
    }

    #[test]
    fn frontier_depths() {
        let arena = tree();
        assert_eq!(descendants_at_depth(&arena, "\\S\\", 2), vec!["\\S\\A\\", "\\S\\y\\"]);
        assert_eq!(descendants_at_depth(&arena, "\\S\\", 1), vec!["\\S\\A\\", "\\S\\y\\"]);
        assert_eq!(descendants_at_depth(&arena, "\\S\\", 3), vec!["\\S\\A\\x\\"]);
        assert!(descendants_at_depth(&arena, "\\S\\", 4).is_empty());
        assert_eq!(queryable_descendants(&arena, "\\S\\"), vec!["\\S\\A\\"]);
    }

    #[test]
    fn annotate_counts_marks_missing_as_uncounted() {
        let mut arena = tree();
        let mut concepts = CountMap::new();
        concepts.insert("X".into(), Counts::new(10, 31));
        let mut studies = CountMap::new();
        studies.insert("S".into(), Counts::new(100, 0));

        annotate_counts(&mut arena, &studies, &concepts);
        assert_eq!(arena.get("\\S\\").unwrap().patient_count, Some(100));
        assert_eq!(arena.get("\\S\\A\\x\\").unwrap().patient_count, Some(10));
        assert_eq!(arena.get("\\S\\y\\").unwrap().patient_count, None);
        assert_eq!(arena.get("\\S\\A\\").unwrap().patient_count, None);
    }
}
