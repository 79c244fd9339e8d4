//! Ranked cells and the lazy max-heap driving greedy selection.
//!
//! Every [`RankedCell`] caches a `potential` that is never below the cell's true
//! remaining value. [`CellHeap::update_best_cell`] only recomputes the top of
//! the heap, re-seats it, and stops as soon as no cached bound can beat the best
//! confirmed value. The heap is an indexed priority queue: it knows where each
//! cell sits, so consumed cells can be pulled out of the middle in O(log n).
//!
//! # Example
//!
//! ```rust
//! use relsum::core::{CellHeap, RelationIndex, WeightAssessor};
//! use relsum::logging::LogConfig;
//!
//! let mut index = RelationIndex::new(&["set"], &["tags"], 3).unwrap();
//! let assessor = WeightAssessor::equal();
//! index.add_value(0, "red blue", 0, &assessor).unwrap();
//! index.add_value(0, "red", 1, &assessor).unwrap();
//! index.add_value(0, "green", 2, &assessor).unwrap();
//!
//! let mut heap = CellHeap::for_index(&index);
//! let best = heap.update_best_cell(&index, &LogConfig::default()).unwrap();
//! assert_eq!(index.cell(best.cell()).value(), "red");
//! assert_eq!(best.potential, 2.0);
//! ```

use std::cmp::Ordering;

use crate::core::cell::CellId;
use crate::core::formula::Formula;
use crate::core::index::RelationIndex;
use crate::core::kind::AttributeKind;
use crate::log_heap;
use crate::logging::LogConfig;

/// Relative slack allowed when checking that recomputed values never exceed
/// their cached bounds. Sums over differently ordered maps may round apart, so
/// the slack scales with the largest magnitude that entered the sum.
const BOUND_TOLERANCE: f64 = 1e-9;

/// A cell together with cached bounds on what it can still contribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedCell {
    cell: CellId,
    /// Upper bound on the value of the cell in the heap's scope
    pub potential: f64,
    /// Upper bound on the weight the cell itself adds to a formula
    pub max_potential: f64,
    /// (attribute, value length) of hierarchy cells, for tie-breaking
    hierarchy: Option<(usize, usize)>,
}

impl RankedCell {
    /// A ranked cell with both bounds set to `potential`.
    pub fn new(cell: CellId, potential: f64) -> Self {
        Self {
            cell,
            potential,
            max_potential: potential,
            hierarchy: None,
        }
    }

    /// Ranks a cell of `index` by its total weight.
    pub fn for_cell(index: &RelationIndex, id: CellId) -> Self {
        let cell = index.cell(id);
        let hierarchy = index
            .attribute(cell.attribute())
            .filter(|attribute| attribute.kind() == AttributeKind::Hierarchy)
            .map(|attribute| (attribute.index(), cell.value().len()));
        Self {
            hierarchy,
            ..Self::new(id, cell.total_weight())
        }
    }

    pub fn cell(&self) -> CellId {
        self.cell
    }

    /// Heap order: higher potential first; on a tie between two levels of the
    /// same hierarchy, the more general (shorter) value first.
    pub fn outranks(&self, other: &RankedCell) -> bool {
        match self.potential.partial_cmp(&other.potential) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => match (self.hierarchy, other.hierarchy) {
                (Some((a, len_a)), Some((b, len_b))) => a == b && len_a < len_b,
                _ => false,
            },
            _ => false,
        }
    }

    /// Recomputes the weight of the cell's uncovered entries across the whole
    /// relation and caches it as the potential.
    ///
    /// # Panics
    ///
    /// Panics if the result exceeds the previously cached potential.
    pub fn recompute_coverage(&mut self, index: &RelationIndex) -> f64 {
        let potential = index.cell(self.cell).uncovered_weight();
        assert_bound("potential", self.cell, potential, self.potential, 0.0);
        self.potential = potential;
        potential
    }

    /// Recomputes what the cell is worth to `formula`.
    ///
    /// Intersects the formula's tuples with the cell's covers, walking whichever
    /// side is smaller. `max_potential` becomes the uncovered weight of the cell
    /// on the shared tuples; the potential becomes the change in the formula's
    /// cover if the cell were conjoined, which accounts for the tuples the
    /// formula would lose. Returns the new potential.
    ///
    /// # Panics
    ///
    /// Panics if either value exceeds its previously cached bound.
    pub fn recompute_formula_coverage(&mut self, formula: &Formula, index: &RelationIndex) -> f64 {
        let covers = index.cell(self.cell).covers();
        let tuple_weight = formula.tuple_weights();

        let mut max_potential = 0.0;
        let mut formula_cover = 0.0;
        let mut credit = |existing: f64, covered: bool, weight: f64| {
            formula_cover += existing;
            if !covered {
                formula_cover += weight;
                max_potential += weight;
            }
        };

        if tuple_weight.len() <= covers.len() {
            for (tuple, &existing) in tuple_weight {
                if let Some(cover) = covers.get(tuple) {
                    credit(existing, cover.covered, cover.weight);
                }
            }
        } else {
            for (tuple, cover) in covers {
                if let Some(&existing) = tuple_weight.get(tuple) {
                    credit(existing, cover.covered, cover.weight);
                }
            }
        }

        // a difference of two large sums keeps their rounding error, not its own
        let magnitude = formula_cover.abs().max(formula.cover().abs());
        let potential = formula_cover - formula.cover();
        assert_bound("formula potential", self.cell, potential, self.potential, magnitude);
        assert_bound("max potential", self.cell, max_potential, self.max_potential, 0.0);
        self.potential = potential;
        self.max_potential = max_potential;
        potential
    }
}

/// True when `candidate` beats the best confirmed cell, or has positive
/// potential if none is confirmed yet.
fn improves(candidate: &RankedCell, best: Option<&RankedCell>) -> bool {
    match best {
        Some(best) => candidate.cell != best.cell && candidate.outranks(best),
        None => candidate.potential > 0.0,
    }
}

fn assert_bound(what: &str, cell: CellId, recomputed: f64, cached: f64, magnitude: f64) {
    let slack = BOUND_TOLERANCE * cached.abs().max(magnitude).max(1.0);
    assert!(
        recomputed <= cached + slack,
        "{what} of cell {cell} grew from {cached} to {recomputed}"
    );
}

/// Indexed binary max-heap of ranked cells.
#[derive(Debug, Clone, Default)]
pub struct CellHeap {
    nodes: Vec<RankedCell>,
    /// Heap position of each cell, indexed by `CellId`
    positions: Vec<Option<usize>>,
}

impl CellHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a heap over arbitrary ranked cells.
    ///
    /// # Panics
    ///
    /// Panics if the same cell appears twice.
    pub fn from_cells(cells: Vec<RankedCell>) -> Self {
        let mut heap = Self {
            nodes: cells,
            positions: Vec::new(),
        };
        for i in 0..heap.nodes.len() {
            let id = heap.nodes[i].cell;
            assert!(heap.position(id).is_none(), "cell {id} pushed twice");
            heap.set_position(id, Some(i));
        }
        heap.heapify();
        heap
    }

    /// Ranks every cell of `index` by its total weight.
    pub fn for_index(index: &RelationIndex) -> Self {
        Self::from_cells(
            index
                .cell_ids()
                .map(|id| RankedCell::for_cell(index, id))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The best ranked cell by cached potential.
    pub fn peek(&self) -> Option<&RankedCell> {
        self.nodes.first()
    }

    /// The node at heap position `i`.
    pub fn get(&self, i: usize) -> Option<&RankedCell> {
        self.nodes.get(i)
    }

    /// Heap position of `cell`, if it is in the heap.
    pub fn position(&self, cell: CellId) -> Option<usize> {
        self.positions.get(cell.0).copied().flatten()
    }

    pub fn contains(&self, cell: CellId) -> bool {
        self.position(cell).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedCell> + '_ {
        self.nodes.iter()
    }

    /// # Panics
    ///
    /// Panics if the cell is already in the heap.
    pub fn push(&mut self, node: RankedCell) {
        assert!(!self.contains(node.cell), "cell {} pushed twice", node.cell);
        let i = self.nodes.len();
        self.nodes.push(node);
        self.set_position(node.cell, Some(i));
        self.sift_up(i);
    }

    pub fn pop(&mut self) -> Option<RankedCell> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(self.remove(0))
        }
    }

    /// Restores heap order after the node at position `i` changed potential.
    pub fn fix(&mut self, i: usize) {
        if !self.sift_down(i) {
            self.sift_up(i);
        }
    }

    /// Removes and returns the node at heap position `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds.
    pub fn remove(&mut self, i: usize) -> RankedCell {
        let last = self.nodes.len() - 1;
        if i != last {
            self.swap(i, last);
        }
        let node = self.nodes[last];
        self.nodes.truncate(last);
        self.set_position(node.cell, None);
        if i < self.nodes.len() {
            self.fix(i);
        }
        node
    }

    /// Removes `cell` wherever it sits in the heap.
    pub fn remove_cell(&mut self, cell: CellId) -> Option<RankedCell> {
        self.position(cell).map(|i| self.remove(i))
    }

    /// Re-establishes heap order over all nodes.
    pub fn heapify(&mut self) {
        let n = self.nodes.len();
        for i in (0..n / 2).rev() {
            self.sift_down(i);
        }
        debug_assert!(self.is_valid(0), "heap order broken");
    }

    /// Relaxes every potential to its `max_potential` bound and re-heapifies.
    ///
    /// Needed whenever a formula drops tuples: the formula-scoped potentials
    /// cached so far may then be too low, while `max_potential` still bounds
    /// them from above.
    pub fn reset_potentials(&mut self) {
        for node in &mut self.nodes {
            node.potential = node.max_potential;
        }
        self.heapify();
    }

    /// Seeds `max_potential` with the current potential of every node.
    pub(crate) fn seed_max_potentials(&mut self) {
        for node in &mut self.nodes {
            node.max_potential = node.potential;
        }
    }

    /// True when the subtree rooted at `i` satisfies the heap property.
    pub fn is_valid(&self, i: usize) -> bool {
        let n = self.nodes.len();
        for child in [2 * i + 1, 2 * i + 2] {
            if child < n
                && (self.nodes[child].outranks(&self.nodes[i]) || !self.is_valid(child))
            {
                return false;
            }
        }
        true
    }

    /// Finds the cell with the highest uncovered weight in the relation.
    ///
    /// Lazily recomputes the top until its cached bound can no longer beat the
    /// best confirmed value. The winner stays in the heap. Returns `None` when
    /// no cell has positive remaining weight.
    pub fn update_best_cell(&mut self, index: &RelationIndex, log: &LogConfig) -> Option<RankedCell> {
        let mut best: Option<RankedCell> = None;

        while let Some(top) = self.nodes.first() {
            if !improves(top, best.as_ref()) {
                break;
            }
            let cached = top.potential;
            let value = self.nodes[0].recompute_coverage(index);
            log_heap!(log, cell = %self.nodes[0].cell, cached, value, "Recomputed global potential");
            if improves(&self.nodes[0], best.as_ref()) {
                best = Some(self.nodes[0]);
            }
            self.fix(0);
        }

        debug_assert!(self.is_valid(0), "heap order broken");
        best
    }

    /// Finds the cell whose conjunction with `formula` raises its cover most.
    ///
    /// Cells that can never help this formula are evicted from the heap: those
    /// without uncovered weight on the formula's tuples and those of a single
    /// valued attribute the formula already constrains. Returns `None` when no
    /// cell improves the formula.
    pub fn update_best_formula_cell(
        &mut self,
        formula: &Formula,
        index: &RelationIndex,
        log: &LogConfig,
    ) -> Option<RankedCell> {
        let mut best: Option<RankedCell> = None;

        while let Some(top) = self.nodes.first() {
            if !improves(top, best.as_ref()) {
                break;
            }
            let cell = top.cell;
            let cached = top.potential;
            let attribute = index.cell(cell).attribute();
            let single = index
                .attribute(attribute)
                .map_or(false, |a| a.kind() == AttributeKind::Single);
            if single && formula.uses_single_attribute(attribute) {
                log_heap!(log, cell = %cell, "Evicted cell of a used single attribute");
                self.remove(0);
                continue;
            }

            let value = self.nodes[0].recompute_formula_coverage(formula, index);
            let max_potential = self.nodes[0].max_potential;
            log_heap!(log, cell = %cell, cached, value, max_potential, "Recomputed formula potential");
            if max_potential <= 0.0 {
                self.remove(0);
                continue;
            }
            if improves(&self.nodes[0], best.as_ref()) {
                best = Some(self.nodes[0]);
            }
            self.fix(0);
        }

        debug_assert!(self.is_valid(0), "heap order broken");
        best
    }

    fn set_position(&mut self, cell: CellId, position: Option<usize>) {
        if cell.0 >= self.positions.len() {
            self.positions.resize(cell.0 + 1, None);
        }
        self.positions[cell.0] = position;
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.nodes.swap(i, j);
        self.positions[self.nodes[i].cell.0] = Some(i);
        self.positions[self.nodes[j].cell.0] = Some(j);
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.nodes[i].outranks(&self.nodes[parent]) {
                break;
            }
            self.swap(i, parent);
            i = parent;
        }
    }

    /// Returns true if the node moved.
    fn sift_down(&mut self, start: usize) -> bool {
        let n = self.nodes.len();
        let mut i = start;
        loop {
            let left = 2 * i + 1;
            if left >= n {
                break;
            }
            let mut child = left;
            let right = left + 1;
            if right < n && self.nodes[right].outranks(&self.nodes[left]) {
                child = right;
            }
            if !self.nodes[child].outranks(&self.nodes[i]) {
                break;
            }
            self.swap(i, child);
            i = child;
        }
        i > start
    }
}
