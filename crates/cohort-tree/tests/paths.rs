//! Tree path tests
//!
//! Tests ancestor path parsing and the reduction of drag selections to their
//! topmost nodes.

use cohort_tree::paths::is_ancestor_or_self;
use cohort_tree::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case("\\A\\B\\C\\", vec!["\\A\\", "\\A\\B\\"])]
#[case("\\Public Studies\\EHR\\Age\\", vec!["\\Public Studies\\", "\\Public Studies\\EHR\\"])]
#[case("\\A\\", vec![])]
#[case("", vec![])]
#[case("no separators", vec![])]
#[case("/A/B/C/", vec![])]
fn test_parent_paths(#[case] path: &str, #[case] expected: Vec<&str>) {
    assert_eq!(get_parent_paths(path), expected);
}

#[test]
fn test_top_paths_example() {
    let input = ["A\\B\\C\\", "A\\B\\", "A\\D\\E\\", "A\\D\\E\\F\\", "A\\E\\"];
    assert_eq!(get_top_paths(input), vec!["A\\B\\", "A\\D\\E\\", "A\\E\\"]);
}

#[test]
fn test_top_paths_ancestor_replaces_every_descendant() {
    let input = ["\\A\\B\\", "\\A\\C\\", "\\A\\", "\\D\\"];
    assert_eq!(get_top_paths(input), vec!["\\A\\", "\\D\\"]);
}

#[test]
fn test_top_paths_drop_duplicates() {
    let input = ["\\A\\", "\\A\\", "\\AB\\"];
    assert_eq!(get_top_paths(input), vec!["\\A\\", "\\AB\\"]);
}

#[test]
fn test_top_nodes_from_arena() {
    let arena = TreeArena::from_roots(vec![TreeNodeData::container("\\A\\", "A").with_children(
        vec![TreeNodeData::container("\\A\\B\\", "B"), TreeNodeData::container("\\A\\C\\", "C")],
    )])
    .unwrap();
    let dragged = ["\\A\\C\\", "\\A\\B\\"].map(|p| arena.get(p).unwrap());
    let top: Vec<&str> = get_top_nodes(dragged).into_iter().map(|n| n.path.as_str()).collect();
    assert_eq!(top, vec!["\\A\\C\\", "\\A\\B\\"]);

    let dragged = ["\\A\\C\\", "\\A\\"].map(|p| arena.get(p).unwrap());
    let top: Vec<&str> = get_top_nodes(dragged).into_iter().map(|n| n.path.as_str()).collect();
    assert_eq!(top, vec!["\\A\\"]);
}

fn path_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(prop::sample::select(vec!["A", "B", "AB", "C"]), 1..5)
        .prop_map(|segments| format!("\\{}\\", segments.join("\\")))
}

proptest! {
    #[test]
    fn test_top_paths_are_minimal_and_cover_input(
        paths in proptest::collection::vec(path_strategy(), 0..24),
    ) {
        let top = get_top_paths(&paths);

        for (i, a) in top.iter().enumerate() {
            for (j, b) in top.iter().enumerate() {
                if i != j {
                    prop_assert!(!is_ancestor_or_self(a, b), "{} covers {}", a, b);
                }
            }
        }
        for path in &paths {
            let covering = top.iter().filter(|t| is_ancestor_or_self(t, path)).count();
            prop_assert_eq!(covering, 1, "{} covered {} times", path, covering);
        }
    }

    #[test]
    fn test_top_paths_are_idempotent(paths in proptest::collection::vec(path_strategy(), 0..24)) {
        let top = get_top_paths(&paths);
        prop_assert_eq!(get_top_paths(&top), top);
    }
}
