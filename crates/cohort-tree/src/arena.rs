//! Path-keyed node arena
//!
//! Nodes are stored flat and refer to their parent and children by path, so a
//! whole tree can be cloned with a plain structural `Clone` and no relation has
//! to be severed or restored.

use indexmap::IndexMap;
use std::collections::HashSet;

use crate::node::{TreeNode, TreeNodeData};
use crate::{TreeError, TreeResult};

/// A forest of [`TreeNode`]s with globally unique paths
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeArena {
    nodes: IndexMap<String, TreeNode>,
    roots: Vec<String>,
}

impl TreeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an arena from root payloads. Root nodes are not marked as
    /// attached: their children are only a preview of the first level.
    pub fn from_roots(roots: Vec<TreeNodeData>) -> TreeResult<Self> {
        let mut arena = Self::new();
        arena.check_unique(&roots, &HashSet::new())?;
        for root in roots {
            let path = arena.ingest(root, None, false, &mut Vec::new());
            arena.roots.push(path);
        }
        Ok(arena)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.nodes.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&TreeNode> {
        self.nodes.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut TreeNode> {
        self.nodes.get_mut(path)
    }

    pub fn root_paths(&self) -> &[String] {
        &self.roots
    }

    pub fn roots(&self) -> impl Iterator<Item = &TreeNode> {
        self.roots.iter().filter_map(|p| self.nodes.get(p))
    }

    /// Direct children of `path`, in order; empty for unknown paths
    pub fn children(&self, path: &str) -> impl Iterator<Item = &TreeNode> {
        self.nodes
            .get(path)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|p| self.nodes.get(p))
    }

    pub fn parent(&self, path: &str) -> Option<&TreeNode> {
        self.nodes
            .get(path)
            .and_then(|n| n.parent.as_deref())
            .and_then(|p| self.nodes.get(p))
    }

    /// All nodes, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TreeNode> {
        self.nodes.values_mut()
    }

    /// Number of ancestors of `path` (0 for a root)
    pub fn level(&self, path: &str) -> Option<usize> {
        let mut node = self.nodes.get(path)?;
        let mut level = 0;
        while let Some(parent) = node.parent.as_deref().and_then(|p| self.nodes.get(p)) {
            level += 1;
            node = parent;
        }
        Some(level)
    }

    /// Paths of every node below `path`, in pre-order
    pub fn descendants(&self, path: &str) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(node) = self.nodes.get(path) {
            for child in &node.children {
                self.collect_preorder(child, &mut out);
            }
        }
        out
    }

    /// Paths of the whole forest, in pre-order
    pub fn preorder(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            self.collect_preorder(root, &mut out);
        }
        out
    }

    fn collect_preorder(&self, path: &str, out: &mut Vec<String>) {
        if let Some(node) = self.nodes.get(path) {
            out.push(node.path.clone());
            for child in &node.children {
                self.collect_preorder(child, out);
            }
        }
    }

    /// Replace the children of `path` with `children`.
    ///
    /// Previously attached descendants are dropped. The target and every
    /// ingested non-leaf node that arrives with children are marked attached.
    /// Returns the paths of all inserted nodes in pre-order.
    pub fn attach_children(
        &mut self,
        path: &str,
        children: Vec<TreeNodeData>,
    ) -> TreeResult<Vec<String>> {
        let node = self.nodes.get(path).ok_or_else(|| TreeError::unknown_path(path))?;
        if node.leaf {
            return Err(TreeError::leaf_attach(path));
        }

        let old = self.descendants(path);
        let replaced: HashSet<&str> = old.iter().map(String::as_str).collect();
        self.check_unique(&children, &replaced)?;
        for stale in &old {
            self.nodes.swap_remove(stale);
        }

        let mut inserted = Vec::new();
        let mut child_paths = Vec::with_capacity(children.len());
        for child in children {
            child_paths.push(self.ingest(child, Some(path), true, &mut inserted));
        }
        if let Some(node) = self.nodes.get_mut(path) {
            node.children = child_paths;
            node.children_attached = true;
        }
        Ok(inserted)
    }

    /// Insert a copy of `node` under `parent` (or as a new root), dropping any
    /// relations it carried. Used to assemble derived views.
    pub fn insert(&mut self, mut node: TreeNode, parent: Option<&str>) -> TreeResult<()> {
        if self.nodes.contains_key(&node.path) {
            return Err(TreeError::duplicate_path(node.path));
        }
        match parent {
            Some(parent_path) => {
                let parent_node = self
                    .nodes
                    .get_mut(parent_path)
                    .ok_or_else(|| TreeError::unknown_path(parent_path))?;
                parent_node.children.push(node.path.clone());
                node.parent = Some(parent_path.to_string());
            }
            None => {
                self.roots.push(node.path.clone());
                node.parent = None;
            }
        }
        node.children.clear();
        self.nodes.insert(node.path.clone(), node);
        Ok(())
    }

    /// Nested payload of the subtree at `path`
    pub fn to_data(&self, path: &str) -> Option<TreeNodeData> {
        let node = self.nodes.get(path)?;
        Some(TreeNodeData {
            path: node.path.clone(),
            name: node.name.clone(),
            display_name: (node.display_name != node.name).then(|| node.display_name.clone()),
            node_type: node.node_type,
            concept_type: node.concept_type,
            concept_code: node.concept_code.clone(),
            study_id: node.study_id.clone(),
            leaf: node.leaf,
            metadata: node.metadata.clone(),
            children: node.children.iter().filter_map(|c| self.to_data(c)).collect(),
        })
    }

    /// Nested payload of the whole forest
    pub fn to_roots_data(&self) -> Vec<TreeNodeData> {
        self.roots.iter().filter_map(|r| self.to_data(r)).collect()
    }

    fn ingest(
        &mut self,
        data: TreeNodeData,
        parent: Option<&str>,
        mark_attached: bool,
        inserted: &mut Vec<String>,
    ) -> String {
        let mut node = TreeNode::from_data(&data, parent.map(str::to_string));
        let path = node.path.clone();
        node.children_attached = mark_attached && !data.leaf && !data.children.is_empty();
        node.children = data.children.iter().map(|c| c.path.clone()).collect();
        self.nodes.insert(path.clone(), node);
        inserted.push(path.clone());

        for child in data.children {
            self.ingest(child, Some(&path), mark_attached, inserted);
        }
        path
    }

    fn check_unique(&self, payload: &[TreeNodeData], replaced: &HashSet<&str>) -> TreeResult<()> {
        fn walk<'a>(
            arena: &TreeArena,
            nodes: &'a [TreeNodeData],
            replaced: &HashSet<&str>,
            seen: &mut HashSet<&'a str>,
        ) -> TreeResult<()> {
            for node in nodes {
                let taken = arena.nodes.contains_key(&node.path)
                    && !replaced.contains(node.path.as_str());
                if taken || !seen.insert(node.path.as_str()) {
                    return Err(TreeError::duplicate_path(node.path.clone()));
                }
                walk(arena, &node.children, replaced, seen)?;
            }
            Ok(())
        }
        walk(self, payload, replaced, &mut HashSet::new())
    }
}
