//! Conjunctive formulas and their coverage algebra.
//!
//! A [`Formula`] is a conjunction of cells. It tracks, for every tuple that
//! satisfies all of its cells, how much weight the formula collects on that
//! tuple. Adding a cell can only drop tuples (AND semantics) while raising the
//! weight of the survivors by the new cell's uncovered entries.

use std::collections::{BTreeSet, HashMap};

use crate::core::cell::CellId;
use crate::core::index::RelationIndex;
use crate::core::kind::AttributeKind;
use crate::core::result::SummaryTerm;

/// A conjunction of cells under construction.
#[derive(Debug, Clone, Default)]
pub struct Formula {
    cells: Vec<CellId>,
    tuple_weight: HashMap<usize, f64>,
    cover: f64,
    used_single_attributes: BTreeSet<usize>,
}

impl Formula {
    /// Starts a formula from a single seed cell.
    ///
    /// Every tuple of the seed satisfies the formula; tuples already covered
    /// contribute nothing.
    pub fn new(index: &RelationIndex, seed: CellId) -> Self {
        let mut cover = 0.0;
        let tuple_weight = index
            .cell(seed)
            .covers()
            .iter()
            .map(|(&tuple, entry)| {
                let weight = if entry.covered { 0.0 } else { entry.weight };
                cover += weight;
                (tuple, weight)
            })
            .collect();

        let mut formula = Self {
            cells: Vec::new(),
            tuple_weight,
            cover,
            used_single_attributes: BTreeSet::new(),
        };
        formula.register(index, seed);
        formula
    }

    /// A formula without cells over explicit tuple weights.
    #[cfg(test)]
    pub(crate) fn from_tuple_weights(tuple_weight: HashMap<usize, f64>, cover: f64) -> Self {
        Self {
            cells: Vec::new(),
            tuple_weight,
            cover,
            used_single_attributes: BTreeSet::new(),
        }
    }

    fn register(&mut self, index: &RelationIndex, cell: CellId) {
        self.cells.push(cell);
        let attribute = index.cell(cell).attribute();
        if let Some(AttributeKind::Single) = index.attribute(attribute).map(|a| a.kind()) {
            self.used_single_attributes.insert(attribute);
        }
    }

    /// Conjoins `cell` to the formula.
    ///
    /// Tuples the cell does not exhibit are dropped along with their weight.
    /// Surviving tuples gain the cell's weight when its entry is uncovered.
    pub fn add_cell(&mut self, index: &RelationIndex, cell: CellId) {
        let covers = index.cell(cell).covers();
        let mut delta = 0.0;
        self.tuple_weight
            .retain(|tuple, weight| match covers.get(tuple) {
                None => {
                    delta -= *weight;
                    false
                }
                Some(entry) if !entry.covered => {
                    *weight += entry.weight;
                    delta += entry.weight;
                    true
                }
                Some(_) => true,
            });
        self.cover += delta;
        self.register(index, cell);
    }

    /// Spends the formula's weight: every (cell, tuple) pair of the formula is
    /// marked covered in the index.
    ///
    /// Returns the number of covers that flipped.
    pub fn cover_index(&self, index: &mut RelationIndex) -> usize {
        let mut flipped = 0;
        for &cell in &self.cells {
            let cell = index.cell_mut(cell);
            for &tuple in self.tuple_weight.keys() {
                if cell.cover(tuple) {
                    flipped += 1;
                }
            }
        }
        flipped
    }

    /// Cells of the formula in the order they were added.
    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    /// Weight collected on each satisfying tuple.
    pub fn tuple_weights(&self) -> &HashMap<usize, f64> {
        &self.tuple_weight
    }

    /// Total weight the formula collects.
    pub fn cover(&self) -> f64 {
        self.cover
    }

    /// Sorted ids of the tuples satisfying the formula.
    pub fn tuples(&self) -> Vec<usize> {
        let mut tuples: Vec<_> = self.tuple_weight.keys().copied().collect();
        tuples.sort_unstable();
        tuples
    }

    /// True when a cell of the single-valued attribute `attribute` is part of
    /// the formula. A second one could never match any tuple.
    pub fn uses_single_attribute(&self, attribute: usize) -> bool {
        self.used_single_attributes.contains(&attribute)
    }

    /// Renders the formula as (kind, attribute name, value) terms.
    pub fn terms(&self, index: &RelationIndex) -> Vec<SummaryTerm> {
        self.cells
            .iter()
            .filter_map(|&id| {
                let cell = index.cell(id);
                let attribute = index.attribute(cell.attribute())?;
                Some(SummaryTerm {
                    kind: attribute.kind(),
                    attribute: attribute.name().to_string(),
                    value: cell.value().to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assessor::WeightAssessor;

    /// x (set) holds "a" on tuples {0, 1} with tuple 0 covered and "b" on {1, 2}
    /// with tuple 2 covered.
    fn index() -> (RelationIndex, CellId, CellId) {
        let mut index = RelationIndex::new(&["set", "single"], &["x", "y"], 3).unwrap();
        let assessor = WeightAssessor::equal();
        index.add_value(0, "a", 0, &assessor).unwrap();
        index.add_value(0, "a b", 1, &assessor).unwrap();
        index.add_value(0, "b", 2, &assessor).unwrap();
        let a = index.find_cell(0, "a").unwrap();
        let b = index.find_cell(0, "b").unwrap();
        index.cell_mut(a).cover(0);
        index.cell_mut(b).cover(2);
        (index, a, b)
    }

    #[test]
    fn test_create() {
        let (index, a, _) = index();
        let formula = Formula::new(&index, a);

        assert_eq!(formula.tuple_weights()[&0], 0.0);
        assert_eq!(formula.tuple_weights()[&1], 1.0);
        assert_eq!(formula.cover(), 1.0);
        assert_eq!(formula.cells(), &[a]);
        assert!(!formula.uses_single_attribute(0));
    }

    #[test]
    fn test_add_cell_only_shrinks() {
        let (index, a, b) = index();
        let mut formula = Formula::new(&index, a);
        formula.add_cell(&index, b);

        assert!(!formula.tuple_weights().contains_key(&0));
        assert_eq!(formula.tuple_weights()[&1], 2.0);
        // tuple 2 is in b but was never part of the formula
        assert!(!formula.tuple_weights().contains_key(&2));
        assert_eq!(formula.cover(), 2.0);
        assert_eq!(formula.tuples(), vec![1]);
    }

    #[test]
    fn test_add_covered_entry_keeps_weight() {
        let mut index = RelationIndex::new(&["set"], &["x"], 2).unwrap();
        let assessor = WeightAssessor::equal();
        index.add_value(0, "a b", 0, &assessor).unwrap();
        index.add_value(0, "a b", 1, &assessor).unwrap();
        let a = index.find_cell(0, "a").unwrap();
        let b = index.find_cell(0, "b").unwrap();
        index.cell_mut(b).cover(1);

        let mut formula = Formula::new(&index, a);
        formula.add_cell(&index, b);
        assert_eq!(formula.tuple_weights()[&0], 2.0);
        assert_eq!(formula.tuple_weights()[&1], 1.0);
        assert_eq!(formula.cover(), 3.0);
    }

    #[test]
    fn test_single_attributes_are_tracked() {
        let mut index = RelationIndex::new(&["single", "set"], &["x", "y"], 1).unwrap();
        let assessor = WeightAssessor::equal();
        index.add_value(0, "a", 0, &assessor).unwrap();
        index.add_value(1, "c", 0, &assessor).unwrap();
        let a = index.find_cell(0, "a").unwrap();
        let c = index.find_cell(1, "c").unwrap();

        let mut formula = Formula::new(&index, c);
        assert!(!formula.uses_single_attribute(0));
        formula.add_cell(&index, a);
        assert!(formula.uses_single_attribute(0));
        assert!(!formula.uses_single_attribute(1));
    }

    #[test]
    fn test_cover_index_only_touches_formula_tuples() {
        let mut index = RelationIndex::new(&["set"], &["x"], 4).unwrap();
        let assessor = WeightAssessor::equal();
        index.add_value(0, "a b", 0, &assessor).unwrap();
        index.add_value(0, "a b", 1, &assessor).unwrap();
        index.add_value(0, "a", 2, &assessor).unwrap();
        index.add_value(0, "b", 3, &assessor).unwrap();
        let a = index.find_cell(0, "a").unwrap();
        let b = index.find_cell(0, "b").unwrap();

        let mut formula = Formula::new(&index, a);
        formula.add_cell(&index, b);
        assert_eq!(formula.cover(), 4.0);

        assert_eq!(formula.cover_index(&mut index), 4);
        for cell in [a, b] {
            assert!(index.cell(cell).covers()[&0].covered);
            assert!(index.cell(cell).covers()[&1].covered);
        }
        assert!(!index.cell(a).covers()[&2].covered);
        assert!(!index.cell(b).covers()[&3].covered);

        // committing twice changes nothing
        assert_eq!(formula.cover_index(&mut index), 0);
    }

    #[test]
    fn test_terms() {
        let mut index = RelationIndex::new(&["single", "hierarchy"], &["x", "loc"], 1).unwrap();
        let assessor = WeightAssessor::equal();
        index.add_value(0, "a", 0, &assessor).unwrap();
        index.add_value(1, "eu fr", 0, &assessor).unwrap();
        let a = index.find_cell(0, "a").unwrap();
        let fr = index.find_cell(1, "eu/fr").unwrap();

        let mut formula = Formula::new(&index, a);
        formula.add_cell(&index, fr);
        let terms = formula.terms(&index);
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[1].kind, AttributeKind::Hierarchy);
        assert_eq!(terms[1].attribute, "loc");
        assert_eq!(terms[1].value, "eu/fr");
    }
}
