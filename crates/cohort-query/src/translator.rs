//! Backend-specific translation and composed backend calls

use std::sync::Arc;

use cohort_constraint::{
    ConceptConstraint, Constraint, TrialVisit, combine_subject_level_constraints,
};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::{
    Aggregate, CrossTable, CrossTableRequest, Dimension, QueryBackend, QueryCounts, Table,
    TableRequest, TableState,
};
use crate::transmart::TransmartConstraint;
use crate::{ApiType, Capability, QueryError, QueryResult, TranslateError, picsure, transmart};

/// Defaults attached to every export request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    pub data_view: String,
    pub include_measurement_date_columns: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            data_view: "default".to_string(),
            include_measurement_date_columns: true,
        }
    }
}

/// One data type/format pair of an export job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportElement {
    pub data_type: String,
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_view: Option<String>,
}

impl ExportElement {
    pub fn new(data_type: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            format: format.into(),
            data_view: None,
        }
    }

    /// Tabular exports carry the table layout
    pub fn is_tabular(&self) -> bool {
        self.format.eq_ignore_ascii_case("TSV")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportRequest {
    constraint: Value,
    elements: Vec<ExportElement>,
    include_measurement_date_columns: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    table_config: Option<TableState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionFrequency {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct SavedQueryRequest {
    name: String,
    patients_query: Value,
    bookmarked: bool,
    subscribed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    subscription_freq: Option<SubscriptionFrequency>,
}

/// Result of the three-step data table chain
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    pub study_ids: Vec<String>,
    pub dimensions: Vec<Dimension>,
    pub state: TableState,
    pub table: Table,
}

/// Translates constraints for the configured backend and issues the calls
/// built from them.
///
/// Every operation first checks the backend's capability table; an operation
/// the backend lacks fails with [`QueryError::UnsupportedOperation`] before
/// anything is sent.
#[derive(Clone)]
pub struct QueryTranslator {
    api_type: ApiType,
    backend: Arc<dyn QueryBackend>,
    export: ExportOptions,
}

impl std::fmt::Debug for QueryTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryTranslator")
            .field("api_type", &self.api_type)
            .field("export", &self.export)
            .finish_non_exhaustive()
    }
}

impl QueryTranslator {
    pub fn new(api_type: ApiType, backend: Arc<dyn QueryBackend>) -> Self {
        Self {
            api_type,
            backend,
            export: ExportOptions::default(),
        }
    }

    pub fn with_export_options(mut self, export: ExportOptions) -> Self {
        self.export = export;
        self
    }

    pub fn api_type(&self) -> ApiType {
        self.api_type
    }

    pub fn export_options(&self) -> &ExportOptions {
        &self.export
    }

    fn require(&self, capability: Capability) -> QueryResult<()> {
        if self.api_type.supports(capability) {
            Ok(())
        } else {
            Err(QueryError::unsupported(capability.as_str(), self.api_type))
        }
    }

    /// Wire form of a constraint for the configured backend
    pub fn translate(&self, constraint: &Constraint) -> QueryResult<Value> {
        translate_constraint(self.api_type, constraint)
    }

    /// Read a wire constraint back into the constraint model
    pub fn parse_constraint(&self, wire: &Value) -> QueryResult<Constraint> {
        self.require(Capability::ConstraintImport)?;
        let wire: TransmartConstraint = serde_json::from_value(wire.clone())
            .map_err(|e| TranslateError::malformed(e.to_string()))?;
        Ok(transmart::from_wire(&wire)?)
    }

    pub async fn counts(&self, constraint: &Constraint) -> QueryResult<QueryCounts> {
        self.require(Capability::Counts)?;
        let query = self.translate(constraint)?;
        debug!("Requesting counts from {} backend", self.api_type);
        Ok(self.backend.get_counts(&query).await?)
    }

    /// Aggregates are computed over the concept alone, so that the bounds
    /// shown while editing a range are not narrowed by that range.
    pub async fn aggregate(&self, constraint: &ConceptConstraint) -> QueryResult<Aggregate> {
        self.require(Capability::Aggregates)?;
        let query = self.translate(&constraint.concept_only().into())?;
        debug!("Requesting aggregate from {} backend", self.api_type);
        Ok(self.backend.get_aggregate(&query).await?)
    }

    pub async fn trial_visits(
        &self,
        constraint: &ConceptConstraint,
    ) -> QueryResult<Vec<TrialVisit>> {
        self.require(Capability::TrialVisits)?;
        let query = self.translate(&constraint.concept_only().into())?;
        debug!("Requesting trial visits from {} backend", self.api_type);
        Ok(self.backend.get_trial_visits(&query).await?)
    }

    /// Studies, then their dimensions, then the table page.
    ///
    /// Each step waits for the previous one. When the constraint touches no
    /// study, no dimension request is made and the table is requested with an
    /// empty layout.
    pub async fn data_table(
        &self,
        constraint: &Constraint,
        offset: u64,
        limit: u64,
    ) -> QueryResult<DataTable> {
        self.require(Capability::DataTable)?;
        let query = self.translate(constraint)?;

        debug!("Requesting study identifiers from {} backend", self.api_type);
        let study_ids = self.backend.get_study_identifiers(&query).await?;

        let dimensions = if study_ids.is_empty() {
            debug!("No studies in data table query, skipping dimension request");
            Vec::new()
        } else {
            debug!("Requesting dimensions of {} studies", study_ids.len());
            self.backend.get_dimensions(&study_ids).await?
        };

        let state = TableState::from_dimensions(&dimensions);
        let request = TableRequest {
            constraint: query,
            table_config: state.clone(),
            offset,
            limit,
        };
        debug!("Requesting data table page at offset {offset}");
        let table = self.backend.run_table_query(&request).await?;

        Ok(DataTable {
            study_ids,
            dimensions,
            state,
            table,
        })
    }

    /// Cross table of subject counts.
    ///
    /// Each row and column is a group of constraints combined into one
    /// subject-level constraint; a group that does not combine to a
    /// subject-level constraint is rejected.
    pub async fn cross_table(
        &self,
        subject: &Constraint,
        row_groups: Vec<Vec<Constraint>>,
        column_groups: Vec<Vec<Constraint>>,
    ) -> QueryResult<CrossTable> {
        self.require(Capability::CrossTable)?;
        let request = CrossTableRequest {
            subject_constraint: self.translate(subject)?,
            row_constraints: self.translate_groups(row_groups)?,
            column_constraints: self.translate_groups(column_groups)?,
        };
        debug!(
            "Requesting {}x{} cross table from {} backend",
            request.row_constraints.len(),
            request.column_constraints.len(),
            self.api_type
        );
        Ok(self.backend.run_cross_table(&request).await?)
    }

    fn translate_groups(&self, groups: Vec<Vec<Constraint>>) -> QueryResult<Vec<Value>> {
        groups
            .into_iter()
            .map(|group| {
                if let Some(invalid) = group.iter().find(|c| !c.is_subject_level()) {
                    return Err(TranslateError::not_subject_level(invalid.class_name()).into());
                }
                self.translate(&combine_subject_level_constraints(group))
            })
            .collect()
    }

    /// Body of an export job run. Elements without a data view get the
    /// configured one; the table layout is only sent for tabular formats.
    pub fn export_request(
        &self,
        constraint: &Constraint,
        elements: &[ExportElement],
        table_state: Option<&TableState>,
    ) -> QueryResult<Value> {
        self.require(Capability::Export)?;
        let elements: Vec<ExportElement> = elements
            .iter()
            .cloned()
            .map(|mut e| {
                e.data_view.get_or_insert_with(|| self.export.data_view.clone());
                e
            })
            .collect();
        let table_config = table_state
            .filter(|_| elements.iter().any(ExportElement::is_tabular))
            .cloned();
        let request = ExportRequest {
            constraint: self.translate(constraint)?,
            elements,
            include_measurement_date_columns: self.export.include_measurement_date_columns,
            table_config,
        };
        to_body(&request)
    }

    /// Body of a saved query create request
    pub fn saved_query_request(
        &self,
        name: &str,
        constraint: &Constraint,
        bookmarked: bool,
        subscription: Option<SubscriptionFrequency>,
    ) -> QueryResult<Value> {
        self.require(Capability::SavedQueries)?;
        let request = SavedQueryRequest {
            name: name.to_string(),
            patients_query: self.translate(constraint)?,
            bookmarked,
            subscribed: subscription.is_some(),
            subscription_freq: subscription,
        };
        to_body(&request)
    }

    /// Body of a subject set create request
    pub fn subject_set_request(&self, name: &str, constraint: &Constraint) -> QueryResult<Value> {
        self.require(Capability::PatientSets)?;
        if !constraint.is_subject_level() {
            return Err(TranslateError::not_subject_level(constraint.class_name()).into());
        }
        let mut body = serde_json::Map::new();
        body.insert("name".to_string(), Value::String(name.to_string()));
        body.insert("constraint".to_string(), self.translate(constraint)?);
        Ok(Value::Object(body))
    }

    pub async fn diff_query(&self, query_id: &str) -> QueryResult<Vec<Value>> {
        self.require(Capability::Difference)?;
        debug!("Requesting differences of query {query_id}");
        Ok(self.backend.diff_query(query_id).await?)
    }
}

/// Wire form of a constraint for `api_type`, without a backend
pub fn translate_constraint(api_type: ApiType, constraint: &Constraint) -> QueryResult<Value> {
    match api_type {
        ApiType::Transmart => to_body(&transmart::to_wire(constraint)?),
        ApiType::PicSure => to_body(&picsure::to_query(constraint)?),
    }
}

fn to_body<T: Serialize>(request: &T) -> QueryResult<Value> {
    serde_json::to_value(request).map_err(|e| TranslateError::malformed(e.to_string()).into())
}
