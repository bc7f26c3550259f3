//! Query backend contract and the result types it returns

use async_trait::async_trait;
use cohort_constraint::TrialVisit;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::BackendError;

/// Executes translated requests against a query service.
///
/// Requests arrive already in the backend's wire form. Any method may answer
/// [`BackendError::Unsupported`].
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Subject and observation counts for a query
    async fn get_counts(&self, query: &Value) -> Result<QueryCounts, BackendError>;

    /// Summary statistics for a concept-only query
    async fn get_aggregate(&self, query: &Value) -> Result<Aggregate, BackendError>;

    async fn get_trial_visits(&self, query: &Value) -> Result<Vec<TrialVisit>, BackendError>;

    /// Identifiers of the studies a query touches
    async fn get_study_identifiers(&self, query: &Value) -> Result<Vec<String>, BackendError>;

    /// Dimensions available across the given studies
    async fn get_dimensions(&self, study_ids: &[String]) -> Result<Vec<Dimension>, BackendError>;

    async fn run_table_query(&self, request: &TableRequest) -> Result<Table, BackendError>;

    async fn run_cross_table(
        &self,
        request: &CrossTableRequest,
    ) -> Result<CrossTable, BackendError>;

    /// Set differences between consecutive results of a saved query
    async fn diff_query(&self, query_id: &str) -> Result<Vec<Value>, BackendError>;
}

/// Counts returned for a query. Backends that cannot count observations
/// leave `observation_count` empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryCounts {
    pub patient_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation_count: Option<i64>,
}

impl QueryCounts {
    pub fn new(patient_count: i64, observation_count: Option<i64>) -> Self {
        Self {
            patient_count,
            observation_count,
        }
    }
}

/// Summary statistics of one concept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Aggregate {
    #[serde(rename_all = "camelCase")]
    Numerical {
        min: Option<f64>,
        max: Option<f64>,
        average: Option<f64>,
        count: i64,
    },
    #[serde(rename_all = "camelCase")]
    Categorical {
        value_counts: IndexMap<String, i64>,
        #[serde(default)]
        null_value_counts: Option<i64>,
    },
}

impl Aggregate {
    /// Number of observations the statistics were computed over
    pub fn count(&self) -> i64 {
        match self {
            Self::Numerical { count, .. } => *count,
            Self::Categorical {
                value_counts,
                null_value_counts,
            } => value_counts.values().sum::<i64>() + null_value_counts.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    pub name: String,
    /// `subject` or `observation`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_index: Option<i64>,
}

impl Dimension {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dimension_type: None,
            sort_index: None,
        }
    }
}

/// Which dimensions go on the rows and which on the columns of a data table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableState {
    pub row_dimensions: Vec<String>,
    pub column_dimensions: Vec<String>,
}

impl TableState {
    /// Dimensions placed on rows when available
    pub const ROW_DIMENSIONS: [&'static str; 2] = ["study", "patient"];

    /// Default layout: study and patient on rows, everything else on columns.
    /// Dimensions are deduplicated by name, keeping the first one seen.
    pub fn from_dimensions(dimensions: &[Dimension]) -> Self {
        let mut state = Self::default();
        for dimension in dimensions {
            let name = &dimension.name;
            if state.row_dimensions.contains(name) || state.column_dimensions.contains(name) {
                continue;
            }
            if Self::ROW_DIMENSIONS.contains(&name.as_str()) {
                state.row_dimensions.push(name.clone());
            } else {
                state.column_dimensions.push(name.clone());
            }
        }
        state
    }

    pub fn is_empty(&self) -> bool {
        self.row_dimensions.is_empty() && self.column_dimensions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRequest {
    pub constraint: Value,
    pub table_config: TableState,
    pub offset: u64,
    pub limit: u64,
}

/// One page of a data table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default)]
    pub column_headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
    pub offset: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossTableRequest {
    pub subject_constraint: Value,
    pub row_constraints: Vec<Value>,
    pub column_constraints: Vec<Value>,
}

/// Subject counts per row/column constraint pair
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossTable {
    pub rows: Vec<Vec<i64>>,
}
