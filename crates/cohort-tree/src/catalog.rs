//! Canonical ontology tree with lazy and greedy loading
//!
//! Greedy loading works as a wavefront: every child response exposes a
//! frontier of nodes that arrived without their children, and one further
//! request is issued per frontier node. Responses are applied as they arrive,
//! in any order. Progress is tracked with two counters only; there is no
//! blocking join across branches.

use cohort_constraint::{
    CombinationConstraint, Concept, ConceptConstraint, Constraint, Study, StudyConstraint,
};
use futures::FutureExt;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::arena::TreeArena;
use crate::node::{NodeType, TreeNode, TreeNodeData};
use crate::projector::{CountMap, annotate_counts, descendants_at_depth};
use crate::registry::ConceptRegistry;
use crate::source::TreeSource;
use crate::{TreeError, TreeResult, TreeSourceError};

/// Depth of the initial root request: the roots plus one level of preview
pub const DEFAULT_ROOT_REQUEST_DEPTH: u32 = 2;

/// Depth of every child request. The same value locates the frontier of a
/// response (see [`descendants_at_depth`]).
pub const DEFAULT_CHILD_REQUEST_DEPTH: u32 = 20;

/// Loading behaviour of a [`TreeCatalog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Keep requesting frontier nodes until the whole tree is loaded
    pub greedy: bool,
    pub root_request_depth: u32,
    pub child_request_depth: u32,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            greedy: true,
            root_request_depth: DEFAULT_ROOT_REQUEST_DEPTH,
            child_request_depth: DEFAULT_CHILD_REQUEST_DEPTH,
        }
    }
}

impl CatalogOptions {
    pub fn lazy() -> Self {
        Self {
            greedy: false,
            ..Self::default()
        }
    }
}

/// Sent/received counters of child requests
#[derive(Debug, Default)]
pub struct LoadProgress {
    sent: AtomicUsize,
    received: AtomicUsize,
}

impl LoadProgress {
    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }

    /// True when every request sent so far has been answered
    pub fn is_complete(&self) -> bool {
        self.sent() == self.received()
    }

    fn request_sent(&self) {
        self.sent.fetch_add(1, Ordering::SeqCst);
    }

    fn response_received(&self) {
        self.received.fetch_add(1, Ordering::SeqCst);
    }
}

/// Outcome of one loading run
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Child requests issued
    pub requests: usize,
    /// Branches left unattached, with the reason
    pub failures: Vec<(String, TreeError)>,
    /// Responses dropped because their node disappeared in the meantime
    pub stale: usize,
}

impl LoadReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Default)]
struct CatalogState {
    arena: TreeArena,
    registry: ConceptRegistry,
    studies: Vec<Study>,
}

impl CatalogState {
    /// Decorate freshly attached nodes and collect concepts and studies
    fn process(&mut self, paths: &[String]) -> usize {
        let mut new_concepts = 0;
        for path in paths {
            let Some(node) = self.arena.get_mut(path) else {
                continue;
            };
            node.decorate();
            match node.node_type {
                NodeType::Concept => {
                    if self.registry.register(TreeCatalog::get_concept_from_node(node)) {
                        new_concepts += 1;
                    }
                }
                NodeType::Study => {
                    if let Some(id) = &node.study_id {
                        if !self.studies.iter().any(|s| &s.study_id == id) {
                            self.studies.push(Study::new(id.clone()));
                        }
                    }
                }
                NodeType::Container => {}
            }
        }
        new_concepts
    }

    fn constraint_for(&self, node: &TreeNode) -> Option<Constraint> {
        match node.node_type {
            NodeType::Study => node
                .study_id
                .as_ref()
                .map(|id| StudyConstraint::new([Study::new(id.clone())]).into()),
            NodeType::Concept => {
                let concept = TreeCatalog::get_concept_from_node(node);
                let constraint = self
                    .registry
                    .constraint_for(&concept.label)
                    .cloned()
                    .unwrap_or_else(|| ConceptConstraint::new(concept));
                Some(constraint.into())
            }
            NodeType::Container => {
                let children: Vec<Constraint> = self
                    .arena
                    .children(&node.path)
                    .filter_map(|child| self.constraint_for(child))
                    .collect();
                (!children.is_empty()).then(|| CombinationConstraint::or(children).into())
            }
        }
    }
}

type ChildResponse = (String, Result<Vec<TreeNodeData>, TreeSourceError>);

/// Owner of the canonical ontology tree
pub struct TreeCatalog {
    source: Arc<dyn TreeSource>,
    options: CatalogOptions,
    state: RwLock<CatalogState>,
    progress: Arc<LoadProgress>,
}

impl TreeCatalog {
    pub fn new(source: Arc<dyn TreeSource>, options: CatalogOptions) -> Self {
        Self {
            source,
            options,
            state: RwLock::new(CatalogState::default()),
            progress: Arc::new(LoadProgress::default()),
        }
    }

    pub fn options(&self) -> CatalogOptions {
        self.options
    }

    /// Shared handle on the request counters
    pub fn progress(&self) -> Arc<LoadProgress> {
        Arc::clone(&self.progress)
    }

    pub fn is_loading_complete(&self) -> bool {
        self.progress.is_complete()
    }

    /// Load the root level, replacing the current tree and concepts.
    ///
    /// With greedy loading on, this returns only after the whole wavefront
    /// started from the roots has settled.
    pub async fn load_root(&self) -> TreeResult<LoadReport> {
        let depth = self.options.root_request_depth;
        debug!("Requesting root tree nodes (depth {})", depth);
        let roots = self
            .source
            .get_root_nodes(depth, false, true)
            .await
            .inspect_err(|e| warn!("Failed to load root tree nodes: {}", e))?;
        let arena = TreeArena::from_roots(roots)?;

        let pending = {
            let mut state = self.state.write();
            state.arena = arena;
            state.registry.clear();
            state.studies.clear();
            let all = state.arena.preorder();
            state.process(&all);
            info!(
                "Loaded {} root tree nodes ({} nodes, {} concepts)",
                state.arena.root_paths().len(),
                state.arena.len(),
                state.registry.len()
            );
            if self.options.greedy {
                state
                    .arena
                    .roots()
                    .filter(|root| root.needs_loading())
                    .map(|root| root.path.clone())
                    .collect()
            } else {
                Vec::new()
            }
        };

        Ok(self.drive(pending).await)
    }

    /// Load the children of `path` unless it is a leaf or already attached.
    ///
    /// Failed branches are logged and reported but never turned into an
    /// error; they stay unattached so a later call can retry them.
    pub async fn load_children(&self, path: &str) -> TreeResult<LoadReport> {
        let needs_loading = {
            let state = self.state.read();
            let node = state.arena.get(path).ok_or_else(|| TreeError::unknown_path(path))?;
            node.needs_loading()
        };
        if !needs_loading {
            return Ok(LoadReport::default());
        }
        Ok(self.drive(vec![path.to_string()]).await)
    }

    async fn drive(&self, initial: Vec<String>) -> LoadReport {
        let mut report = LoadReport::default();
        let mut pending: FuturesUnordered<BoxFuture<'static, ChildResponse>> =
            FuturesUnordered::new();
        for path in initial {
            pending.push(self.request_children(path));
            report.requests += 1;
        }

        while let Some((path, result)) = pending.next().await {
            self.progress.response_received();
            let children = match result {
                Ok(children) => children,
                Err(e) => {
                    warn!("Failed to load children of {}: {}", path, e);
                    report.failures.push((path, e.into()));
                    continue;
                }
            };
            match self.attach(&path, children) {
                Ok(frontier) => {
                    for next in frontier {
                        pending.push(self.request_children(next));
                        report.requests += 1;
                    }
                }
                Err(TreeError::UnknownPath { .. }) => {
                    warn!("Dropping children of {}: node no longer in the tree", path);
                    report.stale += 1;
                }
                Err(e) => {
                    warn!("Failed to attach children of {}: {}", path, e);
                    report.failures.push((path, e));
                }
            }
        }
        report
    }

    fn request_children(&self, path: String) -> BoxFuture<'static, ChildResponse> {
        let depth = self.options.child_request_depth;
        debug!("Requesting children of {} (depth {})", path, depth);
        self.progress.request_sent();
        let source = Arc::clone(&self.source);
        async move {
            let result = source.get_child_nodes(&path, depth, false, true).await;
            debug!("Received children of {}", path);
            (path, result)
        }
        .boxed()
    }

    /// Attach a response and return the frontier to request next
    fn attach(&self, path: &str, children: Vec<TreeNodeData>) -> TreeResult<Vec<String>> {
        let mut state = self.state.write();
        let inserted = state.arena.attach_children(path, children)?;
        let new_concepts = state.process(&inserted);
        debug!(
            "Attached {} nodes under {} ({} new concepts)",
            inserted.len(),
            path,
            new_concepts
        );

        if !self.options.greedy {
            return Ok(Vec::new());
        }
        let depth = self.options.child_request_depth as usize;
        let frontier: Vec<String> = descendants_at_depth(&state.arena, path, depth)
            .into_iter()
            .filter(|p| state.arena.get(p).is_some_and(TreeNode::needs_loading))
            .collect();
        Ok(frontier)
    }

    /// Concept projection of a CONCEPT node
    pub fn get_concept_from_node(node: &TreeNode) -> Concept {
        Concept::new(
            node.display_name.clone(),
            node.path.clone(),
            node.concept_type.unwrap_or_default(),
            node.concept_code.clone().unwrap_or_default(),
        )
        .with_name(node.name.clone())
    }

    /// Run `f` against the canonical tree
    pub fn with_tree<R>(&self, f: impl FnOnce(&TreeArena) -> R) -> R {
        f(&self.state.read().arena)
    }

    /// Structural copy of the canonical tree
    pub fn snapshot(&self) -> TreeArena {
        self.state.read().arena.clone()
    }

    pub fn node(&self, path: &str) -> Option<TreeNode> {
        self.state.read().arena.get(path).cloned()
    }

    /// Discovered concepts, in discovery order
    pub fn concepts(&self) -> Vec<Concept> {
        self.state.read().registry.concepts().cloned().collect()
    }

    pub fn concept_constraints(&self) -> Vec<ConceptConstraint> {
        self.state.read().registry.concept_constraints().cloned().collect()
    }

    pub fn concept_count(&self) -> usize {
        self.state.read().registry.len()
    }

    /// Studies discovered from STUDY nodes, without duplicates
    pub fn studies(&self) -> Vec<Study> {
        self.state.read().studies.clone()
    }

    /// Nodes whose path is listed, in tree order
    pub fn find_nodes_by_paths<S: AsRef<str>>(&self, paths: &[S]) -> Vec<TreeNode> {
        let state = self.state.read();
        state
            .arena
            .preorder()
            .iter()
            .filter(|p| paths.iter().any(|wanted| wanted.as_ref() == p.as_str()))
            .filter_map(|p| state.arena.get(p).cloned())
            .collect()
    }

    /// Paths of nodes whose `item_name` metadata is listed, in tree order
    pub fn convert_items_to_paths<S: AsRef<str>>(&self, items: &[S]) -> Vec<String> {
        let state = self.state.read();
        state
            .arena
            .preorder()
            .into_iter()
            .filter(|p| {
                state
                    .arena
                    .get(p)
                    .and_then(TreeNode::item_name)
                    .is_some_and(|name| items.iter().any(|item| item.as_ref() == name))
            })
            .collect()
    }

    /// Constraint a node stands for when dropped into a query: a study
    /// constraint for STUDY, the registered concept constraint for CONCEPT,
    /// and an OR over the children for a container. `None` when nothing
    /// below the node is queryable.
    pub fn constraint_from_node(&self, path: &str) -> Option<Constraint> {
        let state = self.state.read();
        let node = state.arena.get(path)?;
        state.constraint_for(node)
    }

    /// Store cached subject counts on the canonical tree's nodes
    pub fn annotate_counts(&self, study_counts: &CountMap, concept_counts: &CountMap) {
        annotate_counts(&mut self.state.write().arena, study_counts, concept_counts);
    }
}
