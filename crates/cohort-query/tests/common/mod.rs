//! Common test utilities for query translation tests
//!
//! This module provides:
//! - A recording QueryBackend with canned responses
//! - Constraint builders over a small demo ontology

pub mod mocks;

pub use mocks::*;

use cohort_constraint::{Concept, ConceptConstraint, ConceptType};

pub fn age() -> ConceptConstraint {
    ConceptConstraint::new(Concept::new(
        "Age",
        "\\Public Studies\\EHR\\Demographics\\Age\\",
        ConceptType::Numerical,
        "EHR:DEM:AGE",
    ))
}

pub fn gender() -> ConceptConstraint {
    ConceptConstraint::new(Concept::new(
        "Gender",
        "\\Public Studies\\EHR\\Demographics\\Gender\\",
        ConceptType::Categorical,
        "EHR:DEM:SEX",
    ))
}
