//! Backend selection and capability table

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend variant, fixed for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiType {
    /// Full capability: every constraint variant and every operation
    #[default]
    Transmart,
    /// Reduced capability: subject counts and aggregates over flat queries
    #[serde(alias = "pic-sure")]
    PicSure,
}

/// Operation families a backend may offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Counts,
    Aggregates,
    TrialVisits,
    DataTable,
    CrossTable,
    Export,
    SavedQueries,
    Difference,
    PatientSets,
    ConstraintImport,
}

impl Capability {
    pub const ALL: [Capability; 10] = [
        Capability::Counts,
        Capability::Aggregates,
        Capability::TrialVisits,
        Capability::DataTable,
        Capability::CrossTable,
        Capability::Export,
        Capability::SavedQueries,
        Capability::Difference,
        Capability::PatientSets,
        Capability::ConstraintImport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Counts => "counts",
            Self::Aggregates => "aggregates",
            Self::TrialVisits => "trial visits",
            Self::DataTable => "data table",
            Self::CrossTable => "cross table",
            Self::Export => "export",
            Self::SavedQueries => "saved queries",
            Self::Difference => "query difference",
            Self::PatientSets => "patient sets",
            Self::ConstraintImport => "constraint import",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ApiType {
    /// The capability table
    pub fn supports(&self, capability: Capability) -> bool {
        match self {
            Self::Transmart => true,
            Self::PicSure => matches!(capability, Capability::Counts | Capability::Aggregates),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transmart => "transmart",
            Self::PicSure => "picsure",
        }
    }
}

impl fmt::Display for ApiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected api-type string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("api-type {0} is invalid")]
pub struct InvalidApiType(pub String);

impl FromStr for ApiType {
    type Err = InvalidApiType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TRANSMART" => Ok(Self::Transmart),
            "PICSURE" | "PIC-SURE" => Ok(Self::PicSure),
            _ => Err(InvalidApiType(s.to_string())),
        }
    }
}
