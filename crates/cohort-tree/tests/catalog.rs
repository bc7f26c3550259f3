//! Tree catalog loading tests
//!
//! Tests loading against mock and static sources:
//! - Root request parameters
//! - Greedy wavefront termination
//! - Completion tracking while requests are in flight
//! - Failure isolation per branch
//! - Concept and study extraction

mod common;

use cohort_constraint::{CombinationOperator, ConceptType, Constraint};
use cohort_tree::*;
use common::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn leaf(path: &str, name: &str) -> TreeNodeData {
    TreeNodeData::concept(path, name, ConceptType::Categorical, name)
}

async fn loaded_demo() -> (TreeCatalog, Arc<StaticTreeSource>) {
    let source = Arc::new(StaticTreeSource::new(demo_tree()));
    let catalog = TreeCatalog::new(source.clone(), CatalogOptions::default());
    let report = catalog.load_root().await.unwrap();
    assert!(report.is_success());
    (catalog, source)
}

// === Root loading ===

#[tokio::test]
async fn test_root_request_parameters() {
    let source = Arc::new(StaticTreeSource::new(demo_tree()));
    let catalog = TreeCatalog::new(source.clone(), CatalogOptions::lazy());
    catalog.load_root().await.unwrap();

    assert_eq!(
        source.requests(),
        vec![TreeRequest {
            path: None,
            depth: 2,
            include_counts: false,
            include_tags: true,
        }]
    );
    catalog.with_tree(|tree| {
        assert_eq!(tree.root_paths(), ["\\Public Studies\\", "\\Private Studies\\"]);
        assert!(tree.roots().all(|root| !root.children_attached));
        assert!(tree.contains("\\Public Studies\\EHR\\"));
        assert!(!tree.contains("\\Public Studies\\EHR\\Demographics\\"));
    });
    assert!(catalog.is_loading_complete());
}

#[tokio::test]
async fn test_empty_source_loads_empty_tree() {
    let source = Arc::new(StaticTreeSource::default());
    let catalog = TreeCatalog::new(source, CatalogOptions::default());
    let report = catalog.load_root().await.unwrap();
    assert_eq!(report.requests, 0);
    assert!(catalog.snapshot().is_empty());
}

// === Greedy loading ===

#[tokio::test]
async fn test_greedy_two_leaf_children_terminates() {
    let source = Arc::new(MockTreeSource::new());
    let root = TreeNodeData::container("\\R\\", "R")
        .with_children(vec![leaf("\\R\\A\\", "A"), leaf("\\R\\B\\", "B")]);
    source.set_roots(vec![root]);
    source.set_children("\\R\\", vec![leaf("\\R\\A\\", "A"), leaf("\\R\\B\\", "B")]);

    let catalog = TreeCatalog::new(source.clone(), CatalogOptions::default());
    let report = catalog.load_root().await.unwrap();

    assert_eq!(report.requests, 1);
    assert_eq!(source.child_calls(), vec!["\\R\\"]);
    assert_eq!(source.calls()[1], (Some("\\R\\".to_string()), 20));
    let progress = catalog.progress();
    assert_eq!((progress.sent(), progress.received()), (1, 1));
    assert!(catalog.is_loading_complete());
    assert!(catalog.node("\\R\\").unwrap().children_attached);
}

#[tokio::test]
async fn test_wavefront_requests_frontier_nodes() {
    let source = Arc::new(StaticTreeSource::new(vec![chain(6)]));
    let options = CatalogOptions {
        child_request_depth: 3,
        ..CatalogOptions::default()
    };
    let catalog = TreeCatalog::new(source.clone(), options);
    let report = catalog.load_root().await.unwrap();

    let child_paths: Vec<Option<String>> =
        source.requests().into_iter().skip(1).map(|r| r.path).collect();
    assert_eq!(
        child_paths,
        vec![
            Some("\\0\\".to_string()),
            Some("\\0\\1\\2\\".to_string()),
            Some("\\0\\1\\2\\3\\4\\".to_string()),
        ]
    );
    assert_eq!(report.requests, 3);
    catalog.with_tree(|tree| {
        assert_eq!(tree.len(), 7);
        assert!(tree.iter().all(|node| node.leaf || node.children_attached));
    });
    assert_eq!(catalog.concept_count(), 1);
}

#[tokio::test]
async fn test_full_tree_loads_greedily() {
    let (catalog, source) = loaded_demo().await;
    let tree = catalog.snapshot();
    assert_eq!(tree.len(), 13);
    assert!(tree.iter().all(|node| !node.needs_loading()));
    // one request per root: depth 20 covers the rest
    assert_eq!(source.request_count(), 3);
}

// === Lazy loading ===

#[tokio::test]
async fn test_load_children_is_noop_for_leaf_and_attached() {
    let source = Arc::new(MockTreeSource::new());
    source.set_roots(vec![TreeNodeData::container("\\R\\", "R"), leaf("\\L\\", "L")]);
    source.set_children("\\R\\", vec![leaf("\\R\\A\\", "A")]);
    let catalog = TreeCatalog::new(source.clone(), CatalogOptions::lazy());
    catalog.load_root().await.unwrap();

    assert_eq!(catalog.load_children("\\L\\").await.unwrap().requests, 0);
    assert_eq!(catalog.load_children("\\R\\").await.unwrap().requests, 1);
    assert_eq!(catalog.load_children("\\R\\").await.unwrap().requests, 0);
    assert_eq!(source.child_calls(), vec!["\\R\\"]);

    let err = catalog.load_children("\\missing\\").await.unwrap_err();
    assert_eq!(err, TreeError::unknown_path("\\missing\\"));
}

#[tokio::test]
async fn test_failed_branch_stays_unattached() {
    let source = Arc::new(MockTreeSource::new());
    source.set_roots(vec![
        TreeNodeData::container("\\X\\", "X"),
        TreeNodeData::container("\\Y\\", "Y"),
    ]);
    source.fail_children("\\X\\", TreeSourceError::Network("timeout".into()));
    source.set_children("\\Y\\", vec![leaf("\\Y\\a\\", "a")]);

    let catalog = TreeCatalog::new(source.clone(), CatalogOptions::default());
    let report = catalog.load_root().await.unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, "\\X\\");
    assert_eq!(
        report.failures[0].1,
        TreeError::Source(TreeSourceError::Network("timeout".into()))
    );
    assert!(!catalog.node("\\X\\").unwrap().children_attached);
    assert!(catalog.node("\\Y\\").unwrap().children_attached);
    assert!(catalog.is_loading_complete());

    // retry once the source recovers
    source.set_children("\\X\\", vec![leaf("\\X\\b\\", "b")]);
    let retry = catalog.load_children("\\X\\").await.unwrap();
    assert!(retry.is_success());
    assert!(catalog.node("\\X\\b\\").is_some());
}

// === Completion tracking ===

#[tokio::test]
async fn test_loading_incomplete_while_request_in_flight() {
    let source = Arc::new(MockTreeSource::gated());
    source.set_roots(vec![TreeNodeData::container("\\R\\", "R")]);
    source.set_children("\\R\\", vec![leaf("\\R\\A\\", "A")]);
    let catalog = TreeCatalog::new(source.clone(), CatalogOptions::lazy());
    catalog.load_root().await.unwrap();
    assert!(catalog.is_loading_complete());

    let progress = catalog.progress();
    let (report, observed) = tokio::join!(catalog.load_children("\\R\\"), async {
        while progress.sent() == 0 {
            tokio::task::yield_now().await;
        }
        let during = progress.is_complete();
        source.release(1);
        during
    });

    assert!(!observed);
    assert!(report.unwrap().is_success());
    assert!(catalog.is_loading_complete());
}

#[tokio::test]
async fn test_completion_waits_for_every_response() {
    let source = Arc::new(MockTreeSource::gated());
    source.set_roots(vec![
        TreeNodeData::container("\\X\\", "X"),
        TreeNodeData::container("\\Y\\", "Y"),
    ]);
    source.set_children("\\X\\", vec![leaf("\\X\\a\\", "a")]);
    source.set_children("\\Y\\", vec![leaf("\\Y\\b\\", "b")]);
    let catalog = TreeCatalog::new(source.clone(), CatalogOptions::default());

    let progress = catalog.progress();
    let (report, observed) = tokio::join!(catalog.load_root(), async {
        while progress.sent() < 2 {
            tokio::task::yield_now().await;
        }
        source.release(1);
        while progress.received() < 1 {
            tokio::task::yield_now().await;
        }
        let after_first = progress.is_complete();
        source.release(1);
        after_first
    });

    assert!(!observed);
    assert_eq!(report.unwrap().requests, 2);
    assert_eq!((progress.sent(), progress.received()), (2, 2));
    assert!(catalog.is_loading_complete());
}

#[tokio::test]
async fn test_response_for_replaced_tree_is_dropped() {
    let source = Arc::new(MockTreeSource::gated());
    source.set_roots(vec![TreeNodeData::container("\\Old\\", "Old")]);
    source.set_children("\\Old\\", vec![leaf("\\Old\\a\\", "a")]);
    let catalog = TreeCatalog::new(source.clone(), CatalogOptions::lazy());
    catalog.load_root().await.unwrap();

    let progress = catalog.progress();
    let (report, reload) = tokio::join!(catalog.load_children("\\Old\\"), async {
        while progress.sent() == 0 {
            tokio::task::yield_now().await;
        }
        source.set_roots(vec![TreeNodeData::container("\\New\\", "New")]);
        let reload = catalog.load_root().await;
        source.release(1);
        reload
    });

    reload.unwrap();
    let report = report.unwrap();
    assert_eq!(report.stale, 1);
    assert!(catalog.node("\\Old\\a\\").is_none());
    assert_eq!(catalog.snapshot().root_paths(), ["\\New\\"]);
    assert!(catalog.is_loading_complete());
}

// === Concepts and studies ===

#[tokio::test]
async fn test_concepts_are_deduplicated_by_label() {
    let (catalog, _) = loaded_demo().await;
    let concepts = catalog.concepts();
    let mut labels: Vec<&str> = concepts.iter().map(|c| c.label.as_str()).collect();
    labels.sort_unstable();
    assert_eq!(labels, vec!["Age", "Gender", "Heart Rate", "Weight"]);

    // both "Age" nodes arrive in one response; the EHR one comes first
    let age = concepts.iter().find(|c| c.label == "Age").unwrap();
    assert_eq!(age.path, EHR_AGE);
    assert_eq!(age.full_name, EHR_AGE);
    assert_eq!(age.code, "EHR:DEM:AGE");
    assert_eq!(age.concept_type, ConceptType::Numerical);
    assert_eq!(catalog.concept_constraints().len(), 4);
}

#[tokio::test]
async fn test_root_reload_resets_concepts() {
    let source = Arc::new(MockTreeSource::new());
    source.set_roots(vec![leaf("\\A\\", "A")]);
    let catalog = TreeCatalog::new(source.clone(), CatalogOptions::lazy());
    catalog.load_root().await.unwrap();
    assert_eq!(catalog.concept_count(), 1);

    source.set_roots(vec![leaf("\\B\\", "B"), leaf("\\C\\", "C")]);
    catalog.load_root().await.unwrap();
    let labels: Vec<String> = catalog.concepts().into_iter().map(|c| c.label).collect();
    assert_eq!(labels, vec!["B", "C"]);
}

#[tokio::test]
async fn test_studies_are_listed_once() {
    let (catalog, _) = loaded_demo().await;
    let ids: Vec<String> = catalog.studies().into_iter().map(|s| s.study_id).collect();
    assert_eq!(ids, vec!["EHR", "CLINICAL_TRIAL", "SHARED"]);
}

#[tokio::test]
async fn test_nodes_are_decorated() {
    let (catalog, _) = loaded_demo().await;
    let age = catalog.node(EHR_AGE).unwrap();
    assert_eq!(age.label, "Age ⓘ");
    assert_eq!(age.icon.as_deref(), Some("icon-123"));
    let gender = catalog.node(EHR_GENDER).unwrap();
    assert_eq!(gender.icon.as_deref(), Some("icon-abc"));
    let ehr = catalog.node("\\Public Studies\\EHR\\").unwrap();
    assert_eq!(ehr.collapsed_icon.as_deref(), Some("icon-folder-study"));
}

// === Lookups ===

#[tokio::test]
async fn test_find_nodes_and_items() {
    let (catalog, _) = loaded_demo().await;
    let found = catalog.find_nodes_by_paths(&[EHR_HEART_RATE, CT_AGE, "\\nope\\"]);
    let paths: Vec<&str> = found.iter().map(|n| n.path.as_str()).collect();
    assert_eq!(paths, vec![EHR_HEART_RATE, CT_AGE]);

    assert_eq!(catalog.convert_items_to_paths(&["age", "unknown"]), vec![EHR_AGE]);
}

#[tokio::test]
async fn test_constraint_from_node() {
    let (catalog, _) = loaded_demo().await;

    let study = catalog.constraint_from_node("\\Public Studies\\EHR\\").unwrap();
    assert_eq!(study.text_representation(), "Study: EHR");

    let concept = catalog.constraint_from_node(CT_AGE).unwrap();
    // the registry keeps the first "Age", so the registered constraint wins
    assert_eq!(
        concept.as_concept().and_then(|c| c.concept.as_ref()).map(|c| c.path.as_str()),
        Some(EHR_AGE)
    );

    let container = catalog
        .constraint_from_node("\\Public Studies\\EHR\\Demographics\\")
        .unwrap();
    let combination = container.as_combination().unwrap();
    assert_eq!(combination.operator, CombinationOperator::Or);
    assert_eq!(combination.children.len(), 2);
    assert!(matches!(combination.children[0], Constraint::Concept(_)));

    assert!(catalog.constraint_from_node("\\nope\\").is_none());
}

// === Static source files ===

#[tokio::test]
async fn test_static_source_reads_wrapped_tree_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tree.json");
    let body = serde_json::json!({ "treeNodes": demo_tree() });
    std::fs::write(&path, body.to_string()).unwrap();

    let source = Arc::new(StaticTreeSource::from_file(&path).unwrap());
    assert_eq!(source.roots(), demo_tree().as_slice());

    let catalog = TreeCatalog::new(source, CatalogOptions::default());
    catalog.load_root().await.unwrap();
    let (expected, _) = loaded_demo().await;
    assert_eq!(catalog.concepts(), expected.concepts());
}

#[test]
fn test_static_source_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = StaticTreeSource::from_file(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, TreeSourceError::LoadFailed(_)));
}
