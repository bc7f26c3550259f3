//! Common test utilities for tree testing
//!
//! This module provides shared testing infrastructure including:
//! - A mock tree source with gated responses
//! - Ontology fixtures

pub mod mocks;

pub use mocks::*;

use cohort_constraint::ConceptType;
use cohort_tree::{ITEM_NAME_KEY, TreeNodeData};

pub const EHR_AGE: &str = "\\Public Studies\\EHR\\Demographics\\Age\\";
pub const EHR_GENDER: &str = "\\Public Studies\\EHR\\Demographics\\Gender\\";
pub const EHR_HEART_RATE: &str = "\\Public Studies\\EHR\\Vital Signs\\Heart Rate\\";
pub const CT_AGE: &str = "\\Public Studies\\CLINICAL_TRIAL\\Demographics\\Age\\";

/// Two public studies sharing an "Age" label, and one private study
pub fn demo_tree() -> Vec<TreeNodeData> {
    vec![
        TreeNodeData::container("\\Public Studies\\", "Public Studies").with_children(vec![
            TreeNodeData::study("\\Public Studies\\EHR\\", "EHR", "EHR").with_children(vec![
                TreeNodeData::container("\\Public Studies\\EHR\\Demographics\\", "Demographics")
                    .with_children(vec![
                        TreeNodeData::concept(EHR_AGE, "Age", ConceptType::Numerical, "EHR:DEM:AGE")
                            .with_metadata(ITEM_NAME_KEY, "age"),
                        TreeNodeData::concept(
                            EHR_GENDER,
                            "Gender",
                            ConceptType::Categorical,
                            "EHR:DEM:SEX",
                        ),
                    ]),
                TreeNodeData::container("\\Public Studies\\EHR\\Vital Signs\\", "Vital Signs")
                    .with_children(vec![TreeNodeData::concept(
                        EHR_HEART_RATE,
                        "Heart Rate",
                        ConceptType::Numerical,
                        "EHR:VSIGN:HR",
                    )]),
            ]),
            TreeNodeData::study(
                "\\Public Studies\\CLINICAL_TRIAL\\",
                "CLINICAL_TRIAL",
                "CLINICAL_TRIAL",
            )
            .with_children(vec![
                TreeNodeData::container(
                    "\\Public Studies\\CLINICAL_TRIAL\\Demographics\\",
                    "Demographics",
                )
                .with_children(vec![TreeNodeData::concept(
                    CT_AGE,
                    "Age",
                    ConceptType::Numerical,
                    "CT:DEM:AGE",
                )]),
            ]),
        ]),
        TreeNodeData::container("\\Private Studies\\", "Private Studies").with_children(vec![
            TreeNodeData::study("\\Private Studies\\SHARED\\", "SHARED", "SHARED").with_children(
                vec![TreeNodeData::concept(
                    "\\Private Studies\\SHARED\\Weight\\",
                    "Weight",
                    ConceptType::Numerical,
                    "SHARED:WEIGHT",
                )],
            ),
        ]),
    ]
}

/// A single branch `\0\1\...\depth\` ending in a concept leaf
pub fn chain(depth: usize) -> TreeNodeData {
    let path = |level: usize| {
        let segments: Vec<String> = (0..=level).map(|i| i.to_string()).collect();
        format!("\\{}\\", segments.join("\\"))
    };
    let mut node = TreeNodeData::concept(path(depth), "leaf", ConceptType::Simple, "LEAF");
    for level in (0..depth).rev() {
        node = TreeNodeData::container(path(level), level.to_string()).with_children(vec![node]);
    }
    node
}
