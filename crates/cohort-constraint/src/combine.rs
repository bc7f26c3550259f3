//! Structural operations over constraint trees

use crate::{CombinationConstraint, Constraint};

/// Deepest border level; every depth at or past it renders the same
pub const MAX_PRESENTATION_LEVEL: u8 = 4;

/// Number of combinations strictly above `target` within `root`.
///
/// `target` is located by identity, not by value, so two equal constraints at
/// different positions report their own depth. Returns `None` when `target`
/// is not part of `root`.
pub fn depth_of(root: &Constraint, target: &Constraint) -> Option<usize> {
    fn walk(node: &Constraint, target: &Constraint, depth: usize) -> Option<usize> {
        if std::ptr::eq(node, target) {
            return Some(depth);
        }
        node.children()
            .iter()
            .find_map(|child| walk(child, target, depth + 1))
    }
    walk(root, target, 0)
}

/// Visit every constraint in pre-order together with its depth
pub fn visit_with_depth<'a, F>(root: &'a Constraint, mut visit: F)
where
    F: FnMut(&'a Constraint, usize),
{
    fn walk<'a, F>(node: &'a Constraint, depth: usize, visit: &mut F)
    where
        F: FnMut(&'a Constraint, usize),
    {
        visit(node, depth);
        for child in node.children() {
            walk(child, depth + 1, visit);
        }
    }
    walk(root, 0, &mut visit);
}

/// Border level used to group nested combinations visually.
///
/// Depth 0 is the root itself and gets no border.
pub fn presentation_level(depth: usize) -> u8 {
    match depth {
        0 => 0,
        1..=3 => depth as u8,
        _ => MAX_PRESENTATION_LEVEL,
    }
}

/// Fold sibling subject-level constraints into one AND combination.
///
/// An empty list yields [`Constraint::True`]; otherwise the result wraps
/// exactly the given constraints, in order, even when there is only one.
pub fn combine_subject_level_constraints(constraints: Vec<Constraint>) -> Constraint {
    if constraints.is_empty() {
        return Constraint::True;
    }
    Constraint::Combination(CombinationConstraint::and(constraints))
}

impl Constraint {
    /// See [`depth_of`]
    pub fn depth_of(&self, target: &Constraint) -> Option<usize> {
        depth_of(self, target)
    }
}
