//! Cohort Query Translation
//!
//! Turns constraint expressions into backend requests. The backend variant is
//! chosen once, by [`ApiType`], and decides both the wire form and which
//! operations exist:
//!
//! - `transmart`: TranSMART v2 constraint JSON, every operation
//! - `picsure`: flat PIC-SURE `where` clauses, counts and aggregates only
//!
//! # Example
//!
//! ```
//! use cohort_constraint::{Constraint, ValueConstraint, ValueOperator};
//! use cohort_query::transmart;
//!
//! let value: Constraint = ValueConstraint::new(ValueOperator::Equal, "X").into();
//! let wire = serde_json::to_value(transmart::to_wire(&value).unwrap()).unwrap();
//! assert_eq!(wire["operator"], "=");
//! assert_eq!(wire["value"], "X");
//! ```

mod api_type;
mod backend;
mod error;
pub mod picsure;
pub mod transmart;
mod translator;

pub use api_type::{ApiType, Capability, InvalidApiType};
pub use backend::{
    Aggregate, CrossTable, CrossTableRequest, Dimension, QueryBackend, QueryCounts, Table,
    TableRequest, TableState,
};
pub use error::{BackendError, QueryError, QueryResult, TranslateError};
pub use translator::{
    DataTable, ExportElement, ExportOptions, QueryTranslator, SubscriptionFrequency,
    translate_constraint,
};
