//! Summary output types.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::kind::AttributeKind;

/// One (attribute, value) condition of an emitted formula.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SummaryTerm {
    pub kind: AttributeKind,
    pub attribute: String,
    pub value: String,
}

impl fmt::Display for SummaryTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute, self.value)
    }
}

/// The outcome of a summarization run.
///
/// `summary`, `covers` and `tuples` are parallel: entry `i` of each describes
/// the `i`-th emitted formula.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    /// Emitted formulas in the order they were chosen
    pub summary: Vec<Vec<SummaryTerm>>,
    /// Weight each formula collected when it was chosen
    pub covers: Vec<f64>,
    /// Sorted ids of the tuples each formula describes
    pub tuples: Vec<Vec<usize>>,
    /// Sum of `covers`
    pub total_cover: f64,
}

impl SummaryResult {
    /// Number of emitted formulas.
    pub fn len(&self) -> usize {
        self.summary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
    }

    pub(crate) fn push(&mut self, terms: Vec<SummaryTerm>, cover: f64, tuples: Vec<usize>) {
        self.summary.push(terms);
        self.covers.push(cover);
        self.tuples.push(tuples);
        self.total_cover += cover;
    }

    /// Iterates over (terms, cover) pairs.
    pub fn formulas(&self) -> impl Iterator<Item = (&[SummaryTerm], f64)> + '_ {
        self.summary
            .iter()
            .zip(&self.covers)
            .map(|(terms, &cover)| (terms.as_slice(), cover))
    }

    /// Distinct tuples described by at least one formula.
    pub fn described_tuples(&self) -> BTreeSet<usize> {
        self.tuples.iter().flatten().copied().collect()
    }
}

impl fmt::Display for SummaryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (terms, cover)) in self.formulas().enumerate() {
            let rendered: Vec<String> = terms.iter().map(ToString::to_string).collect();
            writeln!(f, "{}. {} (cover {cover})", i + 1, rendered.join(" AND "))?;
        }
        write!(f, "total cover {}", self.total_cover)
    }
}
