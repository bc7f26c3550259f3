//! Operators used by constraint expressions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ConstraintError;

/// Boolean operator joining the children of a combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombinationOperator {
    /// All children must hold
    #[default]
    And,
    /// At least one child must hold
    Or,
}

impl CombinationOperator {
    /// The other operator
    pub fn toggled(self) -> Self {
        match self {
            Self::And => Self::Or,
            Self::Or => Self::And,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl fmt::Display for CombinationOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CombinationOperator {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "and" => Ok(Self::And),
            "or" => Ok(Self::Or),
            _ => Err(ConstraintError::unknown_operator("combination", s)),
        }
    }
}

/// Comparison operator of a value constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueOperator {
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessOrEqual,
}

impl ValueOperator {
    /// Symbolic form, as used on the wire
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
        }
    }

    /// True for `>` and `>=`
    pub fn is_lower_bound(&self) -> bool {
        matches!(self, Self::Greater | Self::GreaterOrEqual)
    }

    /// True for `<` and `<=`
    pub fn is_upper_bound(&self) -> bool {
        matches!(self, Self::Less | Self::LessOrEqual)
    }
}

impl fmt::Display for ValueOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ValueOperator {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "=" => Ok(Self::Equal),
            ">" => Ok(Self::Greater),
            ">=" => Ok(Self::GreaterOrEqual),
            "<" => Ok(Self::Less),
            "<=" => Ok(Self::LessOrEqual),
            other => Err(ConstraintError::unknown_operator("value", other)),
        }
    }
}

/// Operator of a date range sub-constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DateOperator {
    /// Between `date1` and `date2`
    #[default]
    Between,
    /// On or after `date1`
    After,
    /// Before `date1`
    Before,
    /// Outside of `date1`..`date2`
    NotBetween,
}

impl DateOperator {
    /// Next operator in the editing cycle BETWEEN, AFTER, BEFORE, NOT_BETWEEN
    pub fn next(self) -> Self {
        match self {
            Self::Between => Self::After,
            Self::After => Self::Before,
            Self::Before => Self::NotBetween,
            Self::NotBetween => Self::Between,
        }
    }

    /// The negation flag is derived, never stored
    pub fn is_negated(&self) -> bool {
        matches!(self, Self::NotBetween)
    }

    /// Whether the operator reads the second date
    pub fn uses_both_dates(&self) -> bool {
        matches!(self, Self::Between | Self::NotBetween)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Between => "BETWEEN",
            Self::After => "AFTER",
            Self::Before => "BEFORE",
            Self::NotBetween => "NOT_BETWEEN",
        }
    }
}

impl fmt::Display for DateOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateOperator {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace(['-', ' '], "_").as_str() {
            "BETWEEN" => Ok(Self::Between),
            "AFTER" => Ok(Self::After),
            "BEFORE" => Ok(Self::Before),
            "NOT_BETWEEN" => Ok(Self::NotBetween),
            _ => Err(ConstraintError::unknown_operator("date", s)),
        }
    }
}
