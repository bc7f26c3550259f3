//! Ontology tree nodes
//!
//! [`TreeNodeData`] is the nested payload a tree source returns. Once loaded,
//! nodes live in a [`TreeArena`](crate::TreeArena) as flat [`TreeNode`]s
//! related by path keys.

use cohort_constraint::ConceptType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata key naming the export item a node stands for
pub const ITEM_NAME_KEY: &str = "item_name";

/// Suffix appended to the label of nodes that carry metadata
pub const METADATA_MARKER: &str = " ⓘ";

/// Kind of ontology entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Study,
    Concept,
    #[default]
    #[serde(alias = "FOLDER")]
    Container,
}

/// Nested tree node as delivered by a tree source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNodeData {
    #[serde(alias = "fullName")]
    pub path: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept_type: Option<ConceptType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_id: Option<String>,
    /// True when no children exist in the domain
    #[serde(default)]
    pub leaf: bool,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: IndexMap<String, Value>,
    /// Empty means "not loaded" for non-leaf nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNodeData>,
}

impl TreeNodeData {
    pub fn container(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            display_name: None,
            node_type: NodeType::Container,
            concept_type: None,
            concept_code: None,
            study_id: None,
            leaf: false,
            metadata: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn study(
        path: impl Into<String>,
        name: impl Into<String>,
        study_id: impl Into<String>,
    ) -> Self {
        Self {
            node_type: NodeType::Study,
            study_id: Some(study_id.into()),
            ..Self::container(path, name)
        }
    }

    /// A concept leaf
    pub fn concept(
        path: impl Into<String>,
        name: impl Into<String>,
        concept_type: ConceptType,
        concept_code: impl Into<String>,
    ) -> Self {
        Self {
            node_type: NodeType::Concept,
            concept_type: Some(concept_type),
            concept_code: Some(concept_code.into()),
            leaf: true,
            ..Self::container(path, name)
        }
    }

    pub fn with_children(mut self, children: Vec<TreeNodeData>) -> Self {
        self.children = children;
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Number of nodes in this subtree, including itself
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNodeData::count).sum::<usize>()
    }

    /// Copy keeping `levels` levels of this subtree (1 keeps the node alone)
    pub fn truncated(&self, levels: usize) -> Self {
        let mut copy = self.clone();
        if levels <= 1 {
            copy.children.clear();
        } else {
            copy.children = self.children.iter().map(|c| c.truncated(levels - 1)).collect();
        }
        copy
    }
}

/// A node of the canonical tree or of a derived view
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub path: String,
    pub name: String,
    pub display_name: String,
    pub node_type: NodeType,
    pub concept_type: Option<ConceptType>,
    pub concept_code: Option<String>,
    pub study_id: Option<String>,
    pub leaf: bool,
    pub metadata: IndexMap<String, Value>,
    /// Set once the children were requested and attached
    pub children_attached: bool,
    pub(crate) parent: Option<String>,
    pub(crate) children: Vec<String>,

    // View state, owned by the projector and the UI
    pub expanded: bool,
    pub selected: bool,
    pub partial_selected: bool,
    /// Cached subject count; `None` means "not yet counted"
    pub patient_count: Option<i64>,

    // Presentation
    pub label: String,
    pub icon: Option<String>,
    pub expanded_icon: Option<String>,
    pub collapsed_icon: Option<String>,
}

impl TreeNode {
    /// Node without relations, built from the payload's own fields
    pub fn from_data(data: &TreeNodeData, parent: Option<String>) -> Self {
        Self {
            path: data.path.clone(),
            name: data.name.clone(),
            display_name: data.display_name.clone().unwrap_or_else(|| data.name.clone()),
            node_type: data.node_type,
            concept_type: data.concept_type,
            concept_code: data.concept_code.clone(),
            study_id: data.study_id.clone(),
            leaf: data.leaf,
            metadata: data.metadata.clone(),
            children_attached: false,
            parent,
            children: Vec::new(),
            expanded: false,
            selected: false,
            partial_selected: false,
            patient_count: None,
            label: data.name.clone(),
            icon: None,
            expanded_icon: None,
            collapsed_icon: None,
        }
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Paths of the direct children, in order
    pub fn child_paths(&self) -> &[String] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Non-leaf node whose children were never attached
    pub fn needs_loading(&self) -> bool {
        !self.leaf && !self.children_attached
    }

    pub fn is_concept(&self) -> bool {
        self.node_type == NodeType::Concept
    }

    pub fn is_study(&self) -> bool {
        self.node_type == NodeType::Study
    }

    pub fn item_name(&self) -> Option<&str> {
        self.metadata.get(ITEM_NAME_KEY).and_then(Value::as_str)
    }

    /// Assign label and icons. Purely presentational.
    pub fn decorate(&mut self) {
        self.label = self.name.clone();
        if !self.metadata.is_empty() {
            self.label.push_str(METADATA_MARKER);
        }

        if self.leaf {
            let icon = match self.concept_type {
                Some(ConceptType::Numerical) => "icon-123",
                Some(ConceptType::HighDim) => "icon-hd",
                Some(ConceptType::Categorical) => "icon-abc",
                Some(ConceptType::Date) => "fa-calendar",
                Some(ConceptType::Text) => "fa-newspaper-o",
                Some(ConceptType::Simple) | None => "fa-folder-o",
            };
            self.icon = Some(icon.to_string());
        } else {
            let (expanded, collapsed) = if self.is_study() {
                ("icon-folder-study-open", "icon-folder-study")
            } else {
                ("fa-folder-open", "fa-folder")
            };
            self.icon = None;
            self.expanded_icon = Some(expanded.to_string());
            self.collapsed_icon = Some(collapsed.to_string());
        }
    }
}

/// Count badge text; `None` renders as an ellipsis, never as zero
pub fn count_label(count: Option<i64>) -> String {
    match count {
        Some(n) if n >= 0 => format!("({n})"),
        _ => "...".to_string(),
    }
}
