//! Constraint expression variants
//!
//! A constraint is a finite tree: combinations own their children, so no
//! constraint can appear twice on a root-to-leaf path. The `className`
//! discriminator is carried explicitly through serde and [`Constraint::class_name`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CombinationOperator, Concept, DateOperator, Study, TrialVisit, ValueOperator};

/// Placeholder shown for a value constraint without a value
pub const NULL_VALUE_PLACEHOLDER: &str = "(no value)";

/// A boolean query expression over studies, concepts and values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "className")]
pub enum Constraint {
    #[serde(rename = "CombinationConstraint")]
    Combination(CombinationConstraint),
    #[serde(rename = "StudyConstraint")]
    Study(StudyConstraint),
    #[serde(rename = "ConceptConstraint")]
    Concept(ConceptConstraint),
    #[serde(rename = "ValueConstraint")]
    Value(ValueConstraint),
    #[serde(rename = "TrialVisitConstraint")]
    TrialVisit(TrialVisitConstraint),
    #[serde(rename = "PatientSetConstraint")]
    PatientSet(PatientSetConstraint),
    /// Always-true identity constraint
    #[serde(rename = "TrueConstraint")]
    True,
}

impl Constraint {
    /// Discriminator used for dispatch and (de)serialization
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Combination(_) => "CombinationConstraint",
            Self::Study(_) => "StudyConstraint",
            Self::Concept(_) => "ConceptConstraint",
            Self::Value(_) => "ValueConstraint",
            Self::TrialVisit(_) => "TrialVisitConstraint",
            Self::PatientSet(_) => "PatientSetConstraint",
            Self::True => "TrueConstraint",
        }
    }

    /// Whether both constraints are of the same variant
    pub fn same_class(&self, other: &Constraint) -> bool {
        self.class_name() == other.class_name()
    }

    /// Display text of the constraint
    pub fn text_representation(&self) -> String {
        match self {
            Self::Combination(c) if c.is_root => "Root".to_string(),
            Self::Combination(_) => "Group".to_string(),
            Self::Study(s) => s.text_representation(),
            Self::Concept(c) => c.text_representation(),
            Self::Value(v) => v.text_representation(),
            Self::TrialVisit(_) => "Trial visit".to_string(),
            Self::PatientSet(_) => "Patient set".to_string(),
            Self::True => "True".to_string(),
        }
    }

    /// Whether the constraint selects subjects rather than observations
    ///
    /// Value and trial-visit fragments only make sense inside a concept and
    /// are observation-level; a combination is subject-level when all of its
    /// children are.
    pub fn is_subject_level(&self) -> bool {
        match self {
            Self::Combination(c) => c.children.iter().all(Constraint::is_subject_level),
            Self::Study(_) | Self::Concept(_) | Self::PatientSet(_) | Self::True => true,
            Self::Value(_) | Self::TrialVisit(_) => false,
        }
    }

    /// Direct children; empty for anything but a combination
    pub fn children(&self) -> &[Constraint] {
        match self {
            Self::Combination(c) => &c.children,
            _ => &[],
        }
    }

    pub fn as_combination(&self) -> Option<&CombinationConstraint> {
        match self {
            Self::Combination(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_combination_mut(&mut self) -> Option<&mut CombinationConstraint> {
        match self {
            Self::Combination(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_concept(&self) -> Option<&ConceptConstraint> {
        match self {
            Self::Concept(c) => Some(c),
            _ => None,
        }
    }

    /// Whether this is the root combination
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Combination(c) if c.is_root)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text_representation())
    }
}

impl From<CombinationConstraint> for Constraint {
    fn from(c: CombinationConstraint) -> Self {
        Self::Combination(c)
    }
}

impl From<StudyConstraint> for Constraint {
    fn from(c: StudyConstraint) -> Self {
        Self::Study(c)
    }
}

impl From<ConceptConstraint> for Constraint {
    fn from(c: ConceptConstraint) -> Self {
        Self::Concept(c)
    }
}

impl From<ValueConstraint> for Constraint {
    fn from(c: ValueConstraint) -> Self {
        Self::Value(c)
    }
}

impl From<TrialVisitConstraint> for Constraint {
    fn from(c: TrialVisitConstraint) -> Self {
        Self::TrialVisit(c)
    }
}

impl From<PatientSetConstraint> for Constraint {
    fn from(c: PatientSetConstraint) -> Self {
        Self::PatientSet(c)
    }
}

// ============================================================================
// Combination
// ============================================================================

/// AND/OR over an ordered list of child constraints
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationConstraint {
    pub operator: CombinationOperator,
    #[serde(default)]
    pub children: Vec<Constraint>,
    /// The root combination is presented differently and never counts
    /// toward nesting borders
    #[serde(default)]
    pub is_root: bool,
}

impl CombinationConstraint {
    pub fn new(operator: CombinationOperator) -> Self {
        Self {
            operator,
            children: Vec::new(),
            is_root: false,
        }
    }

    /// The top-level combination of a query
    pub fn root() -> Self {
        Self {
            is_root: true,
            ..Self::default()
        }
    }

    pub fn and(children: Vec<Constraint>) -> Self {
        Self {
            operator: CombinationOperator::And,
            children,
            is_root: false,
        }
    }

    pub fn or(children: Vec<Constraint>) -> Self {
        Self {
            operator: CombinationOperator::Or,
            children,
            is_root: false,
        }
    }

    pub fn with_child(mut self, child: impl Into<Constraint>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn add_child(&mut self, child: impl Into<Constraint>) {
        self.children.push(child.into());
    }

    /// Remove the child at `index`, if present
    pub fn remove_child(&mut self, index: usize) -> Option<Constraint> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    pub fn is_and(&self) -> bool {
        self.operator == CombinationOperator::And
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

// ============================================================================
// Study
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyConstraint {
    #[serde(default)]
    pub studies: Vec<Study>,
}

impl StudyConstraint {
    pub fn new(studies: impl IntoIterator<Item = Study>) -> Self {
        let mut constraint = Self::default();
        for study in studies {
            constraint.add_study(study);
        }
        constraint
    }

    /// Add a study unless one with the same id is already selected.
    /// Returns whether the study was added.
    pub fn add_study(&mut self, study: Study) -> bool {
        if self.studies.iter().any(|s| s.study_id == study.study_id) {
            return false;
        }
        self.studies.push(study);
        true
    }

    pub fn remove_study(&mut self, study_id: &str) -> bool {
        let before = self.studies.len();
        self.studies.retain(|s| s.study_id != study_id);
        self.studies.len() != before
    }

    fn text_representation(&self) -> String {
        let ids: Vec<&str> = self.studies.iter().map(|s| s.study_id.as_str()).collect();
        format!("Study: {}", ids.join(", "))
    }
}

// ============================================================================
// Value
// ============================================================================

/// Numeric or categorical operand of a value constraint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintValue {
    Number(Decimal),
    Text(String),
}

impl fmt::Display for ConstraintValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n.normalize()),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<Decimal> for ConstraintValue {
    fn from(n: Decimal) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for ConstraintValue {
    fn from(n: i64) -> Self {
        Self::Number(Decimal::from(n))
    }
}

impl From<&str> for ConstraintValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ConstraintValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Comparison of an observation value against an operand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueConstraint {
    pub operator: ValueOperator,
    #[serde(default)]
    pub value: Option<ConstraintValue>,
}

impl ValueConstraint {
    pub fn new(operator: ValueOperator, value: impl Into<ConstraintValue>) -> Self {
        Self {
            operator,
            value: Some(value.into()),
        }
    }

    /// A value constraint whose operand is not set yet
    pub fn without_value(operator: ValueOperator) -> Self {
        Self {
            operator,
            value: None,
        }
    }

    pub fn text_representation(&self) -> String {
        match &self.value {
            Some(value) => value.to_string(),
            None => NULL_VALUE_PLACEHOLDER.to_string(),
        }
    }
}

// ============================================================================
// Dates and trial visits
// ============================================================================

/// Date range sub-constraint of a concept
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeConstraint {
    pub operator: DateOperator,
    #[serde(default)]
    pub date1: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date2: Option<DateTime<Utc>>,
}

impl TimeConstraint {
    pub fn new(operator: DateOperator, date1: DateTime<Utc>, date2: Option<DateTime<Utc>>) -> Self {
        Self {
            operator,
            date1: Some(date1),
            date2,
        }
    }

    pub fn is_negated(&self) -> bool {
        self.operator.is_negated()
    }

    /// Whether every date the operator reads is set
    pub fn is_complete(&self) -> bool {
        self.date1.is_some() && (!self.operator.uses_both_dates() || self.date2.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialVisitConstraint {
    #[serde(default)]
    pub trial_visits: Vec<TrialVisit>,
}

impl TrialVisitConstraint {
    pub fn new(trial_visits: Vec<TrialVisit>) -> Self {
        Self { trial_visits }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSetConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subject_ids: Vec<String>,
}

impl PatientSetConstraint {
    pub fn from_id(id: i64) -> Self {
        Self {
            id: Some(id),
            subject_ids: Vec::new(),
        }
    }

    pub fn from_subject_ids(subject_ids: Vec<String>) -> Self {
        Self {
            id: None,
            subject_ids,
        }
    }
}

// ============================================================================
// Concept
// ============================================================================

/// Constraint on a concept, optionally narrowed by values, dates and visits
///
/// A missing concept is accepted here and rejected when the constraint is
/// translated for a backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptConstraint {
    #[serde(default)]
    pub concept: Option<Concept>,
    #[serde(default)]
    pub value_constraints: Vec<ValueConstraint>,
    #[serde(default)]
    pub apply_obs_date_constraint: bool,
    #[serde(default)]
    pub obs_date_constraint: TimeConstraint,
    #[serde(default)]
    pub apply_val_date_constraint: bool,
    #[serde(default)]
    pub val_date_constraint: TimeConstraint,
    #[serde(default)]
    pub apply_trial_visit_constraint: bool,
    #[serde(default)]
    pub trial_visit_constraint: TrialVisitConstraint,
}

impl ConceptConstraint {
    pub fn new(concept: Concept) -> Self {
        Self {
            concept: Some(concept),
            ..Self::default()
        }
    }

    /// Copy holding only the concept, with every sub-constraint dropped.
    /// Aggregates are requested against this so that they are not narrowed by
    /// the range being edited.
    pub fn concept_only(&self) -> Self {
        Self {
            concept: self.concept.clone(),
            ..Self::default()
        }
    }

    /// Whether any value, date or visit filter is active
    pub fn has_sub_constraints(&self) -> bool {
        !self.value_constraints.is_empty()
            || self.apply_obs_date_constraint
            || self.apply_val_date_constraint
            || self.apply_trial_visit_constraint
    }

    /// Replace the value constraints with a single equality
    pub fn set_numeric_equal(&mut self, value: Decimal) {
        self.value_constraints = vec![ValueConstraint::new(ValueOperator::Equal, value)];
    }

    /// Replace the value constraints with a range; absent bounds are skipped
    pub fn set_numeric_range(
        &mut self,
        min: Option<Decimal>,
        min_inclusive: bool,
        max: Option<Decimal>,
        max_inclusive: bool,
    ) {
        self.value_constraints.clear();
        if let Some(min) = min {
            let op = if min_inclusive {
                ValueOperator::GreaterOrEqual
            } else {
                ValueOperator::Greater
            };
            self.value_constraints.push(ValueConstraint::new(op, min));
        }
        if let Some(max) = max {
            let op = if max_inclusive {
                ValueOperator::LessOrEqual
            } else {
                ValueOperator::Less
            };
            self.value_constraints.push(ValueConstraint::new(op, max));
        }
    }

    /// Replace the value constraints with one equality per category
    pub fn set_categories<I, S>(&mut self, categories: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value_constraints = categories
            .into_iter()
            .map(|c| ValueConstraint::new(ValueOperator::Equal, c.into()))
            .collect();
    }

    fn text_representation(&self) -> String {
        match &self.concept {
            Some(concept) => format!("Concept: {}", concept.label),
            None => "Concept".to_string(),
        }
    }
}
