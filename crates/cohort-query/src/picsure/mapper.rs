use cohort_constraint::{
    CombinationConstraint, CombinationOperator, ConceptConstraint, Constraint, ConstraintValue,
    ValueOperator,
};

use super::model::{LogicalOperator, PicSureQuery, ValueComparator, WhereClause};
use crate::{ApiType, TranslateError};

type MapResult<T> = Result<T, TranslateError>;

/// PIC-SURE resource path of a tree path
pub fn to_pui(path: &str) -> String {
    path.replace('\\', "/")
}

/// Translate a constraint into a flat PIC-SURE query.
///
/// Accepts `True`, concepts with value constraints, and combinations of
/// those. A nested combination is accepted when it can be flattened into its
/// parent: a single child, or the parent's own operator.
pub fn to_query(constraint: &Constraint) -> MapResult<PicSureQuery> {
    let mut query = PicSureQuery::default();
    match constraint {
        Constraint::True => {}
        Constraint::Concept(concept) => {
            push_concept(concept, LogicalOperator::And, &mut query.where_clauses)?
        }
        Constraint::Combination(combination) => {
            push_combination(combination, None, &mut query.where_clauses)?
        }
        other => return Err(unsupported(other.class_name())),
    }
    if let Some(first) = query.where_clauses.first_mut() {
        first.logical_operator = LogicalOperator::And;
    }
    Ok(query)
}

fn push_combination(
    combination: &CombinationConstraint,
    outer: Option<CombinationOperator>,
    out: &mut Vec<WhereClause>,
) -> MapResult<()> {
    let operator = match outer {
        Some(outer) if combination.children.len() <= 1 => outer,
        Some(outer) if outer != combination.operator => {
            return Err(unsupported("nested combination with a different operator"));
        }
        _ => combination.operator,
    };

    for child in &combination.children {
        match child {
            Constraint::True => {}
            Constraint::Concept(concept) => push_concept(concept, logical(operator), out)?,
            Constraint::Combination(inner) => push_combination(inner, Some(operator), out)?,
            other => return Err(unsupported(other.class_name())),
        }
    }
    Ok(())
}

fn push_concept(
    constraint: &ConceptConstraint,
    operator: LogicalOperator,
    out: &mut Vec<WhereClause>,
) -> MapResult<()> {
    let concept = constraint
        .concept
        .as_ref()
        .ok_or_else(|| TranslateError::malformed("concept constraint without a concept"))?;
    if constraint.apply_obs_date_constraint || constraint.apply_val_date_constraint {
        return Err(unsupported("date constraints"));
    }
    if constraint.apply_trial_visit_constraint {
        return Err(unsupported("trial visit constraints"));
    }

    let pui = to_pui(&concept.path);
    if constraint.value_constraints.is_empty() {
        out.push(WhereClause::contains(pui, operator));
        return Ok(());
    }

    let categories = constraint
        .value_constraints
        .iter()
        .filter(|v| matches!(v.value, Some(ConstraintValue::Text(_))))
        .count();
    if categories > 1 {
        return Err(unsupported("multiple categories"));
    }
    // Clauses fold left to right, so a clause group only keeps its own AND
    // binding when it opens the query or is itself joined by AND.
    if constraint.value_constraints.len() > 1
        && operator == LogicalOperator::Or
        && !out.is_empty()
    {
        return Err(unsupported("multi-value concept inside an OR group"));
    }

    for (i, value) in constraint.value_constraints.iter().enumerate() {
        let operand = value
            .value
            .as_ref()
            .ok_or_else(|| TranslateError::malformed("value constraint without a value"))?;
        let joined_by = if i == 0 { operator } else { LogicalOperator::And };
        out.push(WhereClause::constrain_value(
            pui.clone(),
            joined_by,
            comparator(value.operator),
            operand.to_string(),
        ));
    }
    Ok(())
}

fn logical(operator: CombinationOperator) -> LogicalOperator {
    match operator {
        CombinationOperator::And => LogicalOperator::And,
        CombinationOperator::Or => LogicalOperator::Or,
    }
}

fn comparator(operator: ValueOperator) -> ValueComparator {
    match operator {
        ValueOperator::Equal => ValueComparator::Eq,
        ValueOperator::Greater => ValueComparator::Gt,
        ValueOperator::GreaterOrEqual => ValueComparator::Gte,
        ValueOperator::Less => ValueComparator::Lt,
        ValueOperator::LessOrEqual => ValueComparator::Lte,
    }
}

fn unsupported(what: &str) -> TranslateError {
    TranslateError::unsupported(what, ApiType::PicSure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_constraint::{Concept, ConceptType, StudyConstraint};
    use rust_decimal::Decimal;

    fn concept(code: &str) -> ConceptConstraint {
        ConceptConstraint::new(Concept::new(
            code,
            format!("\\demo\\{code}\\"),
            ConceptType::Numerical,
            code,
        ))
    }

    #[test]
    fn numeric_range_becomes_two_value_clauses() {
        let mut age = concept("age");
        age.set_numeric_range(Some(Decimal::from(18)), true, Some(Decimal::from(65)), false);
        let query = to_query(&age.into()).unwrap();

        let ops: Vec<_> = query
            .where_clauses
            .iter()
            .map(|c| c.fields["OPERATOR"].clone())
            .collect();
        assert_eq!(ops, vec![serde_json::json!("GTE"), serde_json::json!("LT")]);
        assert_eq!(query.where_clauses[0].field.pui, "/demo/age/");
        assert_eq!(query.where_clauses[1].fields["CONSTRAINT"], "65");
    }

    #[test]
    fn or_combination_joins_concepts_with_or() {
        let combination = CombinationConstraint::or(vec![concept("a").into(), concept("b").into()]);
        let query = to_query(&combination.into()).unwrap();
        let joins: Vec<_> = query.where_clauses.iter().map(|c| c.logical_operator).collect();
        assert_eq!(joins, vec![LogicalOperator::And, LogicalOperator::Or]);
    }

    #[test]
    fn or_combination_rejects_range_after_first_clause() {
        let mut age = concept("age");
        age.set_numeric_range(Some(Decimal::from(18)), true, Some(Decimal::from(65)), false);
        let combination = CombinationConstraint::or(vec![concept("a").into(), age.into()]);
        assert!(matches!(
            to_query(&combination.into()),
            Err(TranslateError::Unsupported { .. })
        ));
    }

    #[test]
    fn or_combination_accepts_leading_range() {
        let mut age = concept("age");
        age.set_numeric_range(Some(Decimal::from(18)), true, Some(Decimal::from(65)), false);
        let combination = CombinationConstraint::or(vec![age.into(), concept("a").into()]);
        let query = to_query(&combination.into()).unwrap();
        let joins: Vec<_> = query.where_clauses.iter().map(|c| c.logical_operator).collect();
        assert_eq!(
            joins,
            vec![LogicalOperator::And, LogicalOperator::And, LogicalOperator::Or]
        );
    }

    #[test]
    fn and_combination_keeps_range_after_other_clauses() {
        let mut age = concept("age");
        age.set_numeric_range(Some(Decimal::from(18)), true, Some(Decimal::from(65)), false);
        let combination = CombinationConstraint::and(vec![concept("a").into(), age.into()]);
        let query = to_query(&combination.into()).unwrap();
        assert_eq!(query.where_clauses.len(), 3);
        assert!(
            query
                .where_clauses
                .iter()
                .all(|c| c.logical_operator == LogicalOperator::And)
        );
    }

    #[test]
    fn single_child_group_is_flattened() {
        let inner = CombinationConstraint::and(vec![concept("b").into()]);
        let outer = CombinationConstraint::or(vec![concept("a").into(), inner.into()]);
        let query = to_query(&outer.into()).unwrap();
        assert_eq!(query.where_clauses[1].logical_operator, LogicalOperator::Or);
    }

    #[test]
    fn mixed_nesting_and_studies_are_rejected() {
        let inner = CombinationConstraint::and(vec![concept("b").into(), concept("c").into()]);
        let outer = CombinationConstraint::or(vec![concept("a").into(), inner.into()]);
        assert!(matches!(to_query(&outer.into()), Err(TranslateError::Unsupported { .. })));

        let study: Constraint = StudyConstraint::default().into();
        assert!(matches!(to_query(&study), Err(TranslateError::Unsupported { .. })));
    }

    #[test]
    fn true_is_an_empty_query() {
        assert!(to_query(&Constraint::True).unwrap().is_empty());
    }
}
