//! Mock implementations for testing
//!
//! Provides a QueryBackend that records every request it receives and
//! answers from configurable responses.

use async_trait::async_trait;
use cohort_constraint::TrialVisit;
use cohort_query::{
    Aggregate, BackendError, CrossTable, CrossTableRequest, Dimension, QueryBackend, QueryCounts,
    Table, TableRequest,
};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Counts(Value),
    Aggregate(Value),
    TrialVisits(Value),
    StudyIdentifiers(Value),
    Dimensions(Vec<String>),
    Table(TableRequest),
    CrossTable(CrossTableRequest),
    Diff(String),
}

/// Mock backend with configurable responses
pub struct RecordingBackend {
    calls: Arc<RwLock<Vec<Call>>>,
    counts: RwLock<Result<QueryCounts, BackendError>>,
    study_ids: RwLock<Vec<String>>,
    dimensions: RwLock<Vec<Dimension>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            counts: RwLock::new(Ok(QueryCounts::new(0, Some(0)))),
            study_ids: RwLock::new(Vec::new()),
            dimensions: RwLock::new(Vec::new()),
        }
    }

    pub fn set_counts(&self, counts: Result<QueryCounts, BackendError>) {
        *self.counts.write() = counts;
    }

    pub fn set_study_ids(&self, ids: &[&str]) {
        *self.study_ids.write() = ids.iter().map(|s| s.to_string()).collect();
    }

    pub fn set_dimensions(&self, names: &[&str]) {
        *self.dimensions.write() = names.iter().map(|n| Dimension::new(*n)).collect();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().len()
    }

    fn record(&self, call: Call) {
        self.calls.write().push(call);
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryBackend for RecordingBackend {
    async fn get_counts(&self, query: &Value) -> Result<QueryCounts, BackendError> {
        self.record(Call::Counts(query.clone()));
        self.counts.read().clone()
    }

    async fn get_aggregate(&self, query: &Value) -> Result<Aggregate, BackendError> {
        self.record(Call::Aggregate(query.clone()));
        Ok(Aggregate::Numerical {
            min: Some(18.0),
            max: Some(90.0),
            average: Some(47.5),
            count: 12,
        })
    }

    async fn get_trial_visits(&self, query: &Value) -> Result<Vec<TrialVisit>, BackendError> {
        self.record(Call::TrialVisits(query.clone()));
        Ok(vec![TrialVisit::new("1", "Baseline"), TrialVisit::new("2", "Week 1")])
    }

    async fn get_study_identifiers(&self, query: &Value) -> Result<Vec<String>, BackendError> {
        self.record(Call::StudyIdentifiers(query.clone()));
        Ok(self.study_ids.read().clone())
    }

    async fn get_dimensions(&self, study_ids: &[String]) -> Result<Vec<Dimension>, BackendError> {
        self.record(Call::Dimensions(study_ids.to_vec()));
        Ok(self.dimensions.read().clone())
    }

    async fn run_table_query(&self, request: &TableRequest) -> Result<Table, BackendError> {
        self.record(Call::Table(request.clone()));
        Ok(Table {
            column_headers: request.table_config.column_dimensions.clone(),
            rows: Vec::new(),
            offset: request.offset,
            row_count: Some(0),
        })
    }

    async fn run_cross_table(
        &self,
        request: &CrossTableRequest,
    ) -> Result<CrossTable, BackendError> {
        self.record(Call::CrossTable(request.clone()));
        Ok(CrossTable {
            rows: vec![vec![0; request.column_constraints.len()]; request.row_constraints.len()],
        })
    }

    async fn diff_query(&self, query_id: &str) -> Result<Vec<Value>, BackendError> {
        self.record(Call::Diff(query_id.to_string()));
        Ok(Vec::new())
    }
}
