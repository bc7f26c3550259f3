//! Mock implementations for testing
//!
//! Provides a configurable TreeSource whose child responses can be held back
//! until the test releases them, so loading progress can be observed while
//! requests are in flight.

use async_trait::async_trait;
use cohort_tree::{TreeNodeData, TreeSource, TreeSourceError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Mock tree source with configurable responses
pub struct MockTreeSource {
    roots: Arc<RwLock<Vec<TreeNodeData>>>,
    children: Arc<RwLock<HashMap<String, Result<Vec<TreeNodeData>, TreeSourceError>>>>,
    calls: Arc<RwLock<Vec<(Option<String>, u32)>>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockTreeSource {
    pub fn new() -> Self {
        Self {
            roots: Arc::new(RwLock::new(Vec::new())),
            children: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            gate: None,
        }
    }

    /// Child responses wait until [`release`](Self::release) is called
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::new()
        }
    }

    pub fn set_roots(&self, roots: Vec<TreeNodeData>) {
        *self.roots.write() = roots;
    }

    pub fn set_children(&self, path: impl Into<String>, children: Vec<TreeNodeData>) {
        self.children.write().insert(path.into(), Ok(children));
    }

    pub fn fail_children(&self, path: impl Into<String>, error: TreeSourceError) {
        self.children.write().insert(path.into(), Err(error));
    }

    /// Let `n` held child responses through
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Paths of all child requests, in arrival order
    pub fn child_calls(&self) -> Vec<String> {
        self.calls.read().iter().filter_map(|(p, _)| p.clone()).collect()
    }

    pub fn calls(&self) -> Vec<(Option<String>, u32)> {
        self.calls.read().clone()
    }
}

impl Default for MockTreeSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TreeSource for MockTreeSource {
    async fn get_root_nodes(
        &self,
        depth: u32,
        _include_counts: bool,
        _include_tags: bool,
    ) -> Result<Vec<TreeNodeData>, TreeSourceError> {
        self.calls.write().push((None, depth));
        Ok(self.roots.read().clone())
    }

    async fn get_child_nodes(
        &self,
        path: &str,
        depth: u32,
        _include_counts: bool,
        _include_tags: bool,
    ) -> Result<Vec<TreeNodeData>, TreeSourceError> {
        self.calls.write().push((Some(path.to_string()), depth));
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        self.children
            .read()
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(TreeSourceError::NotFound(path.to_string())))
    }
}
