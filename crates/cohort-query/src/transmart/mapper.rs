//! Mapping between constraints and TranSMART wire constraints

use std::str::FromStr;

use cohort_constraint::{
    CombinationConstraint, CombinationOperator, Concept, ConceptConstraint, ConceptType,
    Constraint, ConstraintValue, DateOperator, PatientSetConstraint, Study, StudyConstraint,
    TimeConstraint, TrialVisit, TrialVisitConstraint, ValueConstraint, ValueOperator,
};
use rust_decimal::Decimal;
use serde_json::{Number, Value};

use super::model::{
    ConceptRef, FieldComparison, FieldOperator, FieldRef, PATIENT_DIMENSION, PatientSetRef,
    START_TIME_DIMENSION, TRIAL_VISIT_DIMENSION, TimeComparison, TimeOperator, TransmartConstraint,
    ValueComparison, WireValueType,
};
use crate::{ApiType, TranslateError};

type MapResult<T> = Result<T, TranslateError>;

// ============================================================================
// Constraint -> wire
// ============================================================================

/// Translate a constraint into its TranSMART form.
///
/// Concept constraints inside a combination are wrapped in a patient
/// subselection, so that combining two concepts selects subjects rather than
/// single observations.
pub fn to_wire(constraint: &Constraint) -> MapResult<TransmartConstraint> {
    match constraint {
        Constraint::True => Ok(TransmartConstraint::True),
        Constraint::Combination(c) => map_combination(c),
        Constraint::Study(s) => map_study(s),
        Constraint::Concept(c) => map_concept(c),
        Constraint::Value(v) => map_value(v),
        Constraint::TrialVisit(t) => Ok(map_trial_visits(t)),
        Constraint::PatientSet(p) => map_patient_set(p),
    }
}

fn map_combination(combination: &CombinationConstraint) -> MapResult<TransmartConstraint> {
    if combination.is_empty() {
        return Ok(TransmartConstraint::True);
    }
    let args = combination
        .children
        .iter()
        .map(|child| {
            let wire = to_wire(child)?;
            Ok(match child {
                Constraint::Concept(_) => wire.for_patients(),
                _ => wire,
            })
        })
        .collect::<MapResult<Vec<_>>>()?;

    Ok(match combination.operator {
        CombinationOperator::And => TransmartConstraint::And { args },
        CombinationOperator::Or => TransmartConstraint::Or { args },
    })
}

fn map_study(study: &StudyConstraint) -> MapResult<TransmartConstraint> {
    let mut names: Vec<TransmartConstraint> = study
        .studies
        .iter()
        .map(|s| TransmartConstraint::StudyName {
            study_id: s.study_id.clone(),
        })
        .collect();
    match names.len() {
        0 => Err(TranslateError::malformed("study constraint without studies")),
        1 => Ok(names.remove(0)),
        _ => Ok(TransmartConstraint::Or { args: names }),
    }
}

fn map_concept(constraint: &ConceptConstraint) -> MapResult<TransmartConstraint> {
    let concept = constraint
        .concept
        .as_ref()
        .ok_or_else(|| TranslateError::malformed("concept constraint without a concept"))?;
    let base = TransmartConstraint::Concept(ConceptRef {
        concept_code: concept.code.clone(),
        concept_path: Some(concept.path.clone()),
        name: Some(concept.name.clone()),
        value_type: Some(concept.concept_type.as_str().to_string()),
    });
    if !constraint.has_sub_constraints() {
        return Ok(base);
    }

    let mut args = vec![base];

    // categories are alternatives, every other value bound must hold
    let (categories, bounds): (Vec<&ValueConstraint>, Vec<&ValueConstraint>) = constraint
        .value_constraints
        .iter()
        .partition(|v| {
            v.operator == ValueOperator::Equal && matches!(v.value, Some(ConstraintValue::Text(_)))
        });
    for bound in bounds {
        args.push(map_value(bound)?);
    }
    let mut categories = categories
        .into_iter()
        .map(map_value)
        .collect::<MapResult<Vec<_>>>()?;
    match categories.len() {
        0 => {}
        1 => args.append(&mut categories),
        _ => args.push(TransmartConstraint::Or { args: categories }),
    }

    if constraint.apply_obs_date_constraint {
        args.push(map_time(&constraint.obs_date_constraint, FieldRef::observation_start())?);
    }
    if constraint.apply_val_date_constraint {
        args.push(map_time(&constraint.val_date_constraint, FieldRef::value_date())?);
    }
    if constraint.apply_trial_visit_constraint
        && !constraint.trial_visit_constraint.trial_visits.is_empty()
    {
        args.push(map_trial_visits(&constraint.trial_visit_constraint));
    }

    Ok(TransmartConstraint::And { args })
}

fn map_value(value: &ValueConstraint) -> MapResult<TransmartConstraint> {
    let operand = value
        .value
        .as_ref()
        .ok_or_else(|| TranslateError::malformed("value constraint without a value"))?;
    let (value_type, wire_value) = match operand {
        ConstraintValue::Number(n) => {
            let number = Number::from_str(&n.normalize().to_string())
                .map_err(|e| TranslateError::malformed(format!("numeric value {n}: {e}")))?;
            (WireValueType::Numeric, Value::Number(number))
        }
        ConstraintValue::Text(s) => (WireValueType::String, Value::String(s.clone())),
    };
    Ok(TransmartConstraint::Value(ValueComparison {
        value_type,
        operator: value.operator,
        value: wire_value,
    }))
}

fn map_time(time: &TimeConstraint, field: FieldRef) -> MapResult<TransmartConstraint> {
    let (Some(date1), true) = (time.date1, time.is_complete()) else {
        return Err(TranslateError::malformed(format!(
            "{} date constraint is missing a date",
            time.operator
        )));
    };
    let (operator, values) = match time.operator {
        DateOperator::After => (TimeOperator::After, vec![date1]),
        DateOperator::Before => (TimeOperator::Before, vec![date1]),
        DateOperator::Between | DateOperator::NotBetween => {
            (TimeOperator::Between, std::iter::once(date1).chain(time.date2).collect())
        }
    };
    let wire = TransmartConstraint::Time(TimeComparison {
        field,
        operator,
        values,
    });
    Ok(if time.is_negated() { wire.negated() } else { wire })
}

fn map_trial_visits(visits: &TrialVisitConstraint) -> TransmartConstraint {
    TransmartConstraint::Field(FieldComparison {
        field: FieldRef::trial_visit_id(),
        operator: FieldOperator::In,
        value: visits
            .trial_visits
            .iter()
            .map(|v| Value::String(v.id.clone()))
            .collect(),
    })
}

fn map_patient_set(set: &PatientSetConstraint) -> MapResult<TransmartConstraint> {
    if set.id.is_none() && set.subject_ids.is_empty() {
        return Err(TranslateError::malformed("patient set without id or subjects"));
    }
    Ok(TransmartConstraint::PatientSet(PatientSetRef {
        patient_set_id: set.id,
        subject_ids: set.subject_ids.clone(),
    }))
}

// ============================================================================
// Wire -> constraint
// ============================================================================

/// Read a TranSMART constraint back into the constraint model
///
/// An `or` whose arguments are all `study_name` reads back as a single
/// [`StudyConstraint`], the form [`to_wire`] writes for a study list. An
/// `or` group of single-study constraints therefore comes back as one study
/// list selecting the same subjects.
pub fn from_wire(wire: &TransmartConstraint) -> MapResult<Constraint> {
    match wire {
        TransmartConstraint::True => Ok(Constraint::True),
        TransmartConstraint::Subselection { dimension, constraint } => {
            if dimension != PATIENT_DIMENSION {
                return Err(unsupported(format!("subselection over '{dimension}'")));
            }
            from_wire(constraint)
        }
        TransmartConstraint::And { args } => {
            if let Some(concept) = read_concept_with_filters(args)? {
                return Ok(concept.into());
            }
            read_combination(CombinationOperator::And, args)
        }
        TransmartConstraint::Or { args } => {
            let study_ids: Option<Vec<&String>> = args
                .iter()
                .map(|a| match a {
                    TransmartConstraint::StudyName { study_id } => Some(study_id),
                    _ => None,
                })
                .collect();
            match study_ids {
                Some(ids) if !ids.is_empty() => {
                    Ok(StudyConstraint::new(ids.into_iter().map(Study::new)).into())
                }
                _ => read_combination(CombinationOperator::Or, args),
            }
        }
        TransmartConstraint::Concept(concept) => {
            Ok(ConceptConstraint::new(read_concept(concept)).into())
        }
        TransmartConstraint::StudyName { study_id } => {
            Ok(StudyConstraint::new([Study::new(study_id)]).into())
        }
        TransmartConstraint::Value(value) => Ok(read_value(value)?.into()),
        TransmartConstraint::Field(field) => Ok(read_trial_visits(field)?.into()),
        TransmartConstraint::PatientSet(set) => Ok(PatientSetConstraint {
            id: set.patient_set_id,
            subject_ids: set.subject_ids.clone(),
        }
        .into()),
        TransmartConstraint::Time(_) => {
            Err(TranslateError::malformed("time constraint outside of a concept"))
        }
        TransmartConstraint::Negation { arg } => {
            Err(unsupported(format!("negation of '{}'", arg.type_name())))
        }
    }
}

fn read_combination(
    operator: CombinationOperator,
    args: &[TransmartConstraint],
) -> MapResult<Constraint> {
    let children = args.iter().map(from_wire).collect::<MapResult<Vec<_>>>()?;
    let mut combination = CombinationConstraint::new(operator);
    combination.children = children;
    Ok(combination.into())
}

/// An `and` whose first argument is a concept and whose remaining arguments
/// all narrow that concept
fn read_concept_with_filters(args: &[TransmartConstraint]) -> MapResult<Option<ConceptConstraint>> {
    let Some((TransmartConstraint::Concept(concept), filters)) = args.split_first() else {
        return Ok(None);
    };
    if filters.is_empty() || !filters.iter().all(is_concept_filter) {
        return Ok(None);
    }

    let mut constraint = ConceptConstraint::new(read_concept(concept));
    for filter in filters {
        match filter {
            TransmartConstraint::Value(value) => {
                constraint.value_constraints.push(read_value(value)?)
            }
            TransmartConstraint::Or { args } => {
                for value in args {
                    if let TransmartConstraint::Value(value) = value {
                        constraint.value_constraints.push(read_value(value)?);
                    }
                }
            }
            TransmartConstraint::Field(field) => {
                constraint.trial_visit_constraint = read_trial_visits(field)?;
                constraint.apply_trial_visit_constraint = true;
            }
            TransmartConstraint::Time(time) => apply_time(&mut constraint, time, false)?,
            TransmartConstraint::Negation { arg } => {
                if let TransmartConstraint::Time(time) = arg.as_ref() {
                    apply_time(&mut constraint, time, true)?;
                }
            }
            _ => {}
        }
    }
    Ok(Some(constraint))
}

fn is_concept_filter(wire: &TransmartConstraint) -> bool {
    match wire {
        TransmartConstraint::Value(_) | TransmartConstraint::Time(_) => true,
        TransmartConstraint::Field(f) => f.field.dimension == TRIAL_VISIT_DIMENSION,
        TransmartConstraint::Or { args } => {
            !args.is_empty() && args.iter().all(|a| matches!(a, TransmartConstraint::Value(_)))
        }
        TransmartConstraint::Negation { arg } => {
            matches!(arg.as_ref(), TransmartConstraint::Time(_))
        }
        _ => false,
    }
}

fn read_concept(concept: &ConceptRef) -> Concept {
    let concept_type = concept
        .value_type
        .as_deref()
        .and_then(|t| ConceptType::from_str(t).ok())
        .unwrap_or_default();
    let label = concept.name.clone().unwrap_or_else(|| concept.concept_code.clone());
    let path = concept.concept_path.clone().unwrap_or_default();
    Concept::new(label, path, concept_type, concept.concept_code.clone())
}

fn read_value(value: &ValueComparison) -> MapResult<ValueConstraint> {
    let operand = match &value.value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .map(ConstraintValue::Number)
            .map_err(|e| TranslateError::malformed(format!("numeric value {n}: {e}")))?,
        Value::String(s) => ConstraintValue::Text(s.clone()),
        other => return Err(TranslateError::malformed(format!("unexpected value operand {other}"))),
    };
    Ok(ValueConstraint::new(value.operator, operand))
}

fn read_trial_visits(field: &FieldComparison) -> MapResult<TrialVisitConstraint> {
    if field.field.dimension != TRIAL_VISIT_DIMENSION {
        return Err(unsupported(format!("field constraint on '{}'", field.field.dimension)));
    }
    let visits = field
        .value
        .iter()
        .map(|id| {
            let id = match id {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            TrialVisit::new(id.clone(), id)
        })
        .collect();
    Ok(TrialVisitConstraint::new(visits))
}

fn apply_time(
    constraint: &mut ConceptConstraint,
    time: &TimeComparison,
    negated: bool,
) -> MapResult<()> {
    let operator = match (time.operator, negated) {
        (TimeOperator::Between, false) => DateOperator::Between,
        (TimeOperator::Between, true) => DateOperator::NotBetween,
        (TimeOperator::After, false) => DateOperator::After,
        (TimeOperator::Before, false) => DateOperator::Before,
        (op, true) => return Err(unsupported(format!("negated {op:?} time constraint"))),
    };
    let Some(&date1) = time.values.first() else {
        return Err(TranslateError::malformed("time constraint without dates"));
    };
    let date = TimeConstraint::new(operator, date1, time.values.get(1).copied());

    if time.field.dimension == START_TIME_DIMENSION {
        constraint.obs_date_constraint = date;
        constraint.apply_obs_date_constraint = true;
    } else {
        constraint.val_date_constraint = date;
        constraint.apply_val_date_constraint = true;
    }
    Ok(())
}

fn unsupported(what: String) -> TranslateError {
    TranslateError::unsupported(what, ApiType::Transmart)
}
