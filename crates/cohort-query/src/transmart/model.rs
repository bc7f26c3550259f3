//! TranSMART v2 constraint wire model

use chrono::{DateTime, Utc};
use cohort_constraint::ValueOperator;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Dimension holding observation start dates
pub const START_TIME_DIMENSION: &str = "start time";
/// Dimension holding observation values
pub const VALUE_DIMENSION: &str = "value";
pub const TRIAL_VISIT_DIMENSION: &str = "trial visit";
pub const PATIENT_DIMENSION: &str = "patient";

/// One node of a TranSMART constraint, discriminated by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransmartConstraint {
    True,
    And {
        args: Vec<TransmartConstraint>,
    },
    Or {
        args: Vec<TransmartConstraint>,
    },
    Negation {
        arg: Box<TransmartConstraint>,
    },
    Concept(ConceptRef),
    #[serde(rename_all = "camelCase")]
    StudyName {
        study_id: String,
    },
    Value(ValueComparison),
    Time(TimeComparison),
    Field(FieldComparison),
    PatientSet(PatientSetRef),
    /// Select the subjects having observations that satisfy `constraint`
    Subselection {
        dimension: String,
        constraint: Box<TransmartConstraint>,
    },
}

impl TransmartConstraint {
    /// Wrap in a patient subselection
    pub fn for_patients(self) -> Self {
        Self::Subselection {
            dimension: PATIENT_DIMENSION.to_string(),
            constraint: Box::new(self),
        }
    }

    pub fn negated(self) -> Self {
        Self::Negation { arg: Box::new(self) }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::True => "true",
            Self::And { .. } => "and",
            Self::Or { .. } => "or",
            Self::Negation { .. } => "negation",
            Self::Concept(_) => "concept",
            Self::StudyName { .. } => "study_name",
            Self::Value(_) => "value",
            Self::Time(_) => "time",
            Self::Field(_) => "field",
            Self::PatientSet(_) => "patient_set",
            Self::Subselection { .. } => "subselection",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptRef {
    pub concept_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WireValueType {
    Numeric,
    String,
    Date,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueComparison {
    pub value_type: WireValueType,
    pub operator: ValueOperator,
    pub value: Value,
}

/// Field of a dimension addressed by `time` and `field` constraints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRef {
    pub dimension: String,
    pub field_name: String,
    #[serde(rename = "type")]
    pub field_type: WireValueType,
}

impl FieldRef {
    pub fn observation_start() -> Self {
        Self {
            dimension: START_TIME_DIMENSION.to_string(),
            field_name: "startDate".to_string(),
            field_type: WireValueType::Date,
        }
    }

    pub fn value_date() -> Self {
        Self {
            dimension: VALUE_DIMENSION.to_string(),
            field_name: "numberValue".to_string(),
            field_type: WireValueType::Date,
        }
    }

    pub fn trial_visit_id() -> Self {
        Self {
            dimension: TRIAL_VISIT_DIMENSION.to_string(),
            field_name: "id".to_string(),
            field_type: WireValueType::Numeric,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOperator {
    #[serde(rename = "<-->")]
    Between,
    #[serde(rename = "->")]
    After,
    #[serde(rename = "<-")]
    Before,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeComparison {
    pub field: FieldRef,
    pub operator: TimeOperator,
    pub values: Vec<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldOperator {
    #[serde(rename = "in")]
    In,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldComparison {
    pub field: FieldRef,
    pub operator: FieldOperator,
    pub value: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSetRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_set_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subject_ids: Vec<String>,
}
