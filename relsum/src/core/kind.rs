//! Column kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SummaryError;

/// The kind of values an attribute holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    /// Exactly one value per tuple.
    Single,
    /// Any number of unordered values per tuple.
    Set,
    /// A path; every prefix of it counts as a value.
    Hierarchy,
}

impl AttributeKind {
    /// Returns the name used in textual relation headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKind::Single => "single",
            AttributeKind::Set => "set",
            AttributeKind::Hierarchy => "hierarchy",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeKind {
    type Err = SummaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "single" => Ok(AttributeKind::Single),
            "set" => Ok(AttributeKind::Set),
            "hierarchy" => Ok(AttributeKind::Hierarchy),
            other => Err(SummaryError::configuration(format!(
                "unknown attribute type '{other}', expected one of single, set, hierarchy"
            ))),
        }
    }
}
