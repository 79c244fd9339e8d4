//! Cells and their per-tuple coverage records.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::assessor::sum_weights;

/// Stable handle of a [`Cell`] inside a [`RelationIndex`](crate::core::RelationIndex).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellId(pub(crate) usize);

impl CellId {
    /// Position of the cell in the index arena.
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a (cell, tuple) pair has been spent by a committed formula, and what
/// covering it is worth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cover {
    pub covered: bool,
    pub weight: f64,
}

impl Cover {
    /// An uncovered entry with the given weight.
    pub fn new(weight: f64) -> Self {
        Self {
            covered: false,
            weight,
        }
    }
}

/// One observed value of one attribute.
#[derive(Debug, Clone)]
pub struct Cell {
    attribute: usize,
    value: String,
    covers: HashMap<usize, Cover>,
    equal_weights: bool,
}

impl Cell {
    pub(crate) fn new(attribute: usize, value: impl Into<String>, equal_weights: bool) -> Self {
        Self {
            attribute,
            value: value.into(),
            covers: HashMap::new(),
            equal_weights,
        }
    }

    /// Builds a cell from explicit covers. Weights of 1 are assumed when
    /// `equal_weights` is set.
    pub fn with_covers(
        attribute: usize,
        value: impl Into<String>,
        covers: HashMap<usize, Cover>,
        equal_weights: bool,
    ) -> Self {
        Self {
            attribute,
            value: value.into(),
            covers,
            equal_weights,
        }
    }

    /// Ordinal of the owning attribute.
    pub fn attribute(&self) -> usize {
        self.attribute
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Coverage entries keyed by tuple id.
    pub fn covers(&self) -> &HashMap<usize, Cover> {
        &self.covers
    }

    pub fn equal_weights(&self) -> bool {
        self.equal_weights
    }

    /// Total weight of all entries, covered or not.
    pub fn total_weight(&self) -> f64 {
        sum_weights(self.equal_weights, self.covers.values())
    }

    /// Weight of the entries no formula has spent yet.
    pub fn uncovered_weight(&self) -> f64 {
        sum_weights(
            self.equal_weights,
            self.covers.values().filter(|cover| !cover.covered),
        )
    }

    pub(crate) fn insert(&mut self, tuple: usize, cover: Cover) {
        self.covers.insert(tuple, cover);
    }

    /// Marks `tuple` as covered. Returns true if the entry existed and was
    /// uncovered.
    pub(crate) fn cover(&mut self, tuple: usize) -> bool {
        match self.covers.get_mut(&tuple) {
            Some(cover) if !cover.covered => {
                cover.covered = true;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn reset(&mut self) {
        for cover in self.covers.values_mut() {
            cover.covered = false;
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attr {}: {} ({} tuples)",
            self.attribute,
            self.value,
            self.covers.len()
        )
    }
}
