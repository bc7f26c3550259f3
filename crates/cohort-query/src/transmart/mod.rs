//! Full-capability strategy: TranSMART v2 constraint JSON

mod mapper;
mod model;

pub use mapper::{from_wire, to_wire};
pub use model::{
    ConceptRef, FieldComparison, FieldOperator, FieldRef, PATIENT_DIMENSION, PatientSetRef,
    START_TIME_DIMENSION, TRIAL_VISIT_DIMENSION, TimeComparison, TimeOperator, TransmartConstraint,
    VALUE_DIMENSION, ValueComparison, WireValueType,
};
