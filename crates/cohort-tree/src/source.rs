//! Tree sources
//!
//! A [`TreeSource`] delivers ontology nodes on request. Transport, timeouts and
//! retries belong to the implementation; the catalog only sees a generic
//! [`TreeSourceError`].

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use std::path::Path;

use crate::TreeSourceError;
use crate::node::TreeNodeData;

/// Trait for fetching ontology tree nodes
#[async_trait]
pub trait TreeSource: Send + Sync {
    /// Root nodes, nested `depth` levels deep (the roots count as one level)
    async fn get_root_nodes(
        &self,
        depth: u32,
        include_counts: bool,
        include_tags: bool,
    ) -> Result<Vec<TreeNodeData>, TreeSourceError>;

    /// Children of `path`, nested so that the deepest returned level lies
    /// `depth - 1` levels below `path`
    async fn get_child_nodes(
        &self,
        path: &str,
        depth: u32,
        include_counts: bool,
        include_tags: bool,
    ) -> Result<Vec<TreeNodeData>, TreeSourceError>;
}

/// One request received by a [`StaticTreeSource`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRequest {
    /// `None` for a root request
    pub path: Option<String>,
    pub depth: u32,
    pub include_counts: bool,
    pub include_tags: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TreeFile {
    Roots(Vec<TreeNodeData>),
    Wrapped {
        #[serde(alias = "treeNodes")]
        tree_nodes: Vec<TreeNodeData>,
    },
}

/// Tree source serving a complete tree held in memory
#[derive(Debug, Default)]
pub struct StaticTreeSource {
    roots: Vec<TreeNodeData>,
    requests: Mutex<Vec<TreeRequest>>,
}

impl StaticTreeSource {
    pub fn new(roots: Vec<TreeNodeData>) -> Self {
        Self {
            roots,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Load from JSON: either an array of root nodes or an object with a
    /// `tree_nodes` array
    pub fn from_json(json: &str) -> Result<Self, TreeSourceError> {
        let file: TreeFile =
            serde_json::from_str(json).map_err(|e| TreeSourceError::LoadFailed(e.to_string()))?;
        Ok(Self::new(file.into_roots()))
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, TreeSourceError> {
        let file: TreeFile =
            serde_json::from_value(value).map_err(|e| TreeSourceError::LoadFailed(e.to_string()))?;
        Ok(Self::new(file.into_roots()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TreeSourceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| TreeSourceError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn roots(&self) -> &[TreeNodeData] {
        &self.roots
    }

    /// Every request received so far, in arrival order
    pub fn requests(&self) -> Vec<TreeRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn find<'a>(nodes: &'a [TreeNodeData], path: &str) -> Option<&'a TreeNodeData> {
        nodes.iter().find_map(|node| {
            if node.path == path {
                Some(node)
            } else {
                Self::find(&node.children, path)
            }
        })
    }

    fn record(&self, path: Option<&str>, depth: u32, include_counts: bool, include_tags: bool) {
        self.requests.lock().push(TreeRequest {
            path: path.map(str::to_string),
            depth,
            include_counts,
            include_tags,
        });
    }
}

impl TreeFile {
    fn into_roots(self) -> Vec<TreeNodeData> {
        match self {
            Self::Roots(roots) => roots,
            Self::Wrapped { tree_nodes } => tree_nodes,
        }
    }
}

#[async_trait]
impl TreeSource for StaticTreeSource {
    async fn get_root_nodes(
        &self,
        depth: u32,
        include_counts: bool,
        include_tags: bool,
    ) -> Result<Vec<TreeNodeData>, TreeSourceError> {
        self.record(None, depth, include_counts, include_tags);
        let levels = depth.max(1) as usize;
        Ok(self.roots.iter().map(|r| r.truncated(levels)).collect())
    }

    async fn get_child_nodes(
        &self,
        path: &str,
        depth: u32,
        include_counts: bool,
        include_tags: bool,
    ) -> Result<Vec<TreeNodeData>, TreeSourceError> {
        self.record(Some(path), depth, include_counts, include_tags);
        let node = Self::find(&self.roots, path)
            .ok_or_else(|| TreeSourceError::NotFound(path.to_string()))?;
        let levels = depth.saturating_sub(1).max(1) as usize;
        Ok(node.children.iter().map(|c| c.truncated(levels)).collect())
    }
}
