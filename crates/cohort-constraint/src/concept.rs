//! Queryable entities referenced by constraints

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ConstraintError;

/// Value type of a concept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConceptType {
    Numerical,
    Categorical,
    Date,
    Text,
    HighDim,
    /// Concept without observation values (modifiers, simple flags)
    #[default]
    Simple,
}

impl ConceptType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numerical => "NUMERICAL",
            Self::Categorical => "CATEGORICAL",
            Self::Date => "DATE",
            Self::Text => "TEXT",
            Self::HighDim => "HIGH_DIM",
            Self::Simple => "SIMPLE",
        }
    }

    /// Whether value constraints compare numbers
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numerical | Self::Date)
    }
}

impl fmt::Display for ConceptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConceptType {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NUMERICAL" | "NUMERIC" => Ok(Self::Numerical),
            "CATEGORICAL" | "STRING" => Ok(Self::Categorical),
            "DATE" => Ok(Self::Date),
            "TEXT" => Ok(Self::Text),
            "HIGH_DIM" | "HIGHDIM" => Ok(Self::HighDim),
            "SIMPLE" => Ok(Self::Simple),
            _ => Err(ConstraintError::UnknownConceptType { name: s.to_string() }),
        }
    }
}

/// Lightweight projection of a CONCEPT tree node
///
/// Concepts are identified by `label`; the registry that collects them keeps
/// the first concept seen for each label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub label: String,
    pub path: String,
    #[serde(rename = "type")]
    pub concept_type: ConceptType,
    pub code: String,
    pub full_name: String,
    pub name: String,
}

impl Concept {
    pub fn new(
        label: impl Into<String>,
        path: impl Into<String>,
        concept_type: ConceptType,
        code: impl Into<String>,
    ) -> Self {
        let path = path.into();
        let label = label.into();
        Self {
            name: label.clone(),
            full_name: path.clone(),
            label,
            path,
            concept_type,
            code: code.into(),
        }
    }

    /// Override the short name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// A study, identified by its study id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Study {
    pub study_id: String,
}

impl Study {
    pub fn new(study_id: impl Into<String>) -> Self {
        Self {
            study_id: study_id.into(),
        }
    }
}

/// A study-defined temporal grouping of observations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialVisit {
    pub id: String,
    pub rel_time_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel_time_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel_time: Option<i64>,
}

impl TrialVisit {
    pub fn new(id: impl Into<String>, rel_time_label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rel_time_label: rel_time_label.into(),
            rel_time_unit: None,
            rel_time: None,
        }
    }
}
