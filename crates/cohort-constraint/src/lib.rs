//! Cohort Constraint Model
//!
//! Boolean query expressions ("constraints") built while defining a cohort:
//! combinations, studies, concepts with value/date/visit sub-constraints, and
//! patient sets.
//!
//! # Example
//!
//! ```
//! use cohort_constraint::{
//!     combine_subject_level_constraints, Concept, ConceptConstraint, ConceptType, Constraint,
//! };
//!
//! let age = Concept::new("Age", "\\Demo\\Age\\", ConceptType::Numerical, "AGE");
//! let combined = combine_subject_level_constraints(vec![ConceptConstraint::new(age).into()]);
//! assert_eq!(combined.class_name(), "CombinationConstraint");
//! assert_eq!(combine_subject_level_constraints(vec![]), Constraint::True);
//! ```

mod combine;
mod concept;
mod constraint;
mod error;
mod operator;

pub use combine::{
    MAX_PRESENTATION_LEVEL, combine_subject_level_constraints, depth_of, presentation_level,
    visit_with_depth,
};
pub use concept::{Concept, ConceptType, Study, TrialVisit};
pub use constraint::{
    CombinationConstraint, ConceptConstraint, Constraint, ConstraintValue, NULL_VALUE_PLACEHOLDER,
    PatientSetConstraint, StudyConstraint, TimeConstraint, TrialVisitConstraint, ValueConstraint,
};
pub use error::{ConstraintError, ConstraintResult};
pub use operator::{CombinationOperator, DateOperator, ValueOperator};
