//! Reduced-capability strategy: flat PIC-SURE queries

mod mapper;
mod model;

pub use mapper::{to_pui, to_query};
pub use model::{
    LogicalOperator, PicSureField, PicSureQuery, Predicate, ValueComparator, WhereClause,
};
