//! PIC-SURE query wire model

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A flat list of `where` clauses, folded left to right
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PicSureQuery {
    #[serde(rename = "where", default)]
    pub where_clauses: Vec<WhereClause>,
}

impl PicSureQuery {
    pub fn is_empty(&self) -> bool {
        self.where_clauses.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhereClause {
    pub field: PicSureField,
    pub predicate: Predicate,
    pub logical_operator: LogicalOperator,
    pub fields: IndexMap<String, Value>,
}

impl WhereClause {
    /// Subjects having any observation of `pui`
    pub fn contains(pui: impl Into<String>, logical_operator: LogicalOperator) -> Self {
        let mut fields = IndexMap::new();
        fields.insert("ENCOUNTER".to_string(), Value::String("YES".to_string()));
        Self {
            field: PicSureField { pui: pui.into() },
            predicate: Predicate::Contains,
            logical_operator,
            fields,
        }
    }

    /// Subjects having an observation of `pui` that compares to `constraint`
    pub fn constrain_value(
        pui: impl Into<String>,
        logical_operator: LogicalOperator,
        operator: ValueComparator,
        constraint: impl Into<String>,
    ) -> Self {
        let mut fields = IndexMap::new();
        fields.insert("OPERATOR".to_string(), Value::String(operator.as_str().to_string()));
        fields.insert("CONSTRAINT".to_string(), Value::String(constraint.into()));
        Self {
            field: PicSureField { pui: pui.into() },
            predicate: Predicate::ConstrainValue,
            logical_operator,
            fields,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PicSureField {
    pub pui: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Predicate {
    Contains,
    ConstrainValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValueComparator {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl ValueComparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "EQ",
            Self::Lt => "LT",
            Self::Lte => "LTE",
            Self::Gt => "GT",
            Self::Gte => "GTE",
        }
    }
}
