//! Append-only concept registry

use cohort_constraint::{Concept, ConceptConstraint};
use indexmap::IndexMap;

/// Concepts discovered while loading the tree, keyed by label.
///
/// The first concept registered for a label wins; later ones are ignored.
/// Each concept is paired with a concept constraint holding only that concept.
#[derive(Debug, Clone, Default)]
pub struct ConceptRegistry {
    entries: IndexMap<String, (Concept, ConceptConstraint)>,
}

impl ConceptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `concept` unless its label is already known.
    /// Returns whether it was added.
    pub fn register(&mut self, concept: Concept) -> bool {
        if self.entries.contains_key(&concept.label) {
            return false;
        }
        let constraint = ConceptConstraint::new(concept.clone());
        self.entries.insert(concept.label.clone(), (concept, constraint));
        true
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    pub fn get(&self, label: &str) -> Option<&Concept> {
        self.entries.get(label).map(|(concept, _)| concept)
    }

    pub fn constraint_for(&self, label: &str) -> Option<&ConceptConstraint> {
        self.entries.get(label).map(|(_, constraint)| constraint)
    }

    /// Concepts in discovery order
    pub fn concepts(&self) -> impl Iterator<Item = &Concept> {
        self.entries.values().map(|(concept, _)| concept)
    }

    pub fn concept_constraints(&self) -> impl Iterator<Item = &ConceptConstraint> {
        self.entries.values().map(|(_, constraint)| constraint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
