//! The lazy greedy summarizer.
//!
//! Each round picks the cell with the most uncovered weight as the seed of a
//! new formula, grows the formula one cell at a time while that raises its
//! cover, then commits the formula's coverage back into the index so later
//! rounds do not count the same weight twice.
//!
//! # Example
//!
//! ```rust
//! use relsum::core::{RelationIndex, Summarizer, WeightAssessor};
//! use relsum::logging::LogConfig;
//!
//! let mut index = RelationIndex::new(&["single", "set"], &["venue", "tags"], 3).unwrap();
//! let assessor = WeightAssessor::equal();
//! for (tuple, (venue, tags)) in [("vldb", "db index"), ("vldb", "db"), ("icml", "ml")]
//!     .into_iter()
//!     .enumerate()
//! {
//!     index.add_value(0, venue, tuple, &assessor).unwrap();
//!     index.add_value(1, tags, tuple, &assessor).unwrap();
//! }
//!
//! let summarizer = Summarizer::builder()
//!     .size(2)
//!     .log_config(LogConfig::production())
//!     .build();
//! let result = summarizer.summarize(&mut index);
//!
//! assert_eq!(result.len(), 2);
//! assert_eq!(result.summary[0][0].value, "vldb");
//! assert_eq!(result.covers[0], 4.0);
//! ```

use std::time::Instant;

use tracing::{debug, info, instrument};

use crate::core::formula::Formula;
use crate::core::heap::{CellHeap, RankedCell};
use crate::core::index::RelationIndex;
use crate::core::result::SummaryResult;
use crate::logging::{truncate_field, LogConfig};
use crate::{log_formula, perf_debug};

/// Number of formulas emitted when no size is configured.
pub const DEFAULT_SUMMARY_SIZE: usize = 10;

/// Configuration for a summarization run.
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    /// Maximum number of formulas to emit
    pub size: usize,
    /// Logging detail for the greedy engine
    pub log: LogConfig,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SUMMARY_SIZE,
            log: LogConfig::default(),
        }
    }
}

/// Builder for [`Summarizer`].
#[derive(Debug, Clone, Default)]
pub struct SummarizerBuilder {
    config: SummarizerConfig,
}

impl SummarizerBuilder {
    /// Set the maximum number of formulas
    pub fn size(mut self, size: usize) -> Self {
        self.config.size = size;
        self
    }

    /// Set the logging configuration
    pub fn log_config(mut self, log: LogConfig) -> Self {
        self.config.log = log;
        self
    }

    /// Build the Summarizer
    pub fn build(self) -> Summarizer {
        Summarizer {
            config: self.config,
        }
    }
}

/// Greedy driver producing a [`SummaryResult`] from a [`RelationIndex`].
#[derive(Debug, Clone, Default)]
pub struct Summarizer {
    config: SummarizerConfig,
}

impl Summarizer {
    pub fn builder() -> SummarizerBuilder {
        SummarizerBuilder::default()
    }

    /// A summarizer emitting at most `size` formulas with default logging.
    pub fn new(size: usize) -> Self {
        Self::builder().size(size).build()
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    /// Summarizes `index` into at most `size` formulas.
    ///
    /// Commits coverage into the index as it goes; call
    /// [`RelationIndex::reset`] before summarizing the same index again. The
    /// result holds fewer formulas than requested when no cell has uncovered
    /// weight left.
    #[instrument(skip(self, index), fields(size = self.config.size))]
    pub fn summarize(&self, index: &mut RelationIndex) -> SummaryResult {
        let start_time = Instant::now();
        let size = self.config.size;
        let mut result = SummaryResult::default();
        let mut heap = CellHeap::for_index(index);

        info!(
            cells = heap.len(),
            tuples = index.num_tuples(),
            size,
            "Starting summarization"
        );

        while result.len() < size {
            let Some(seed) = heap.update_best_cell(index, &self.config.log) else {
                debug!(
                    formulas = result.len(),
                    "No cell has uncovered weight left"
                );
                break;
            };

            let formula = self.grow_formula(&heap, seed, index);

            let cover = formula.cover();
            let terms = formula.terms(index);
            let tuples = formula.tuples();
            let flipped = formula.cover_index(index);

            if self.config.log.log_metrics {
                debug!(
                    formula = result.len(),
                    cells = terms.len(),
                    tuples = tuples.len(),
                    cover,
                    flipped,
                    "Committed formula"
                );
            }

            // all of a lone seed's weight is spent now
            if formula.cells().len() == 1 {
                heap.remove_cell(seed.cell());
            }

            result.push(terms, cover, tuples);
        }

        info!(
            formulas = result.len(),
            total_cover = result.total_cover,
            time_ms = start_time.elapsed().as_millis() as u64,
            "Completed summarization"
        );

        result
    }

    /// Grows a formula from `seed` on a scratch copy of the global heap.
    fn grow_formula(&self, global: &CellHeap, seed: RankedCell, index: &RelationIndex) -> Formula {
        let log = &self.config.log;
        let mut scratch = global.clone();
        scratch.seed_max_potentials();

        let mut formula = Formula::new(index, seed.cell());
        scratch.remove_cell(seed.cell());
        perf_debug!(
            log,
            seed = %truncate_field(index.cell(seed.cell()).value(), log.max_field_length),
            potential = seed.potential,
            "Seeded formula"
        );

        while let Some(best) = scratch.update_best_formula_cell(&formula, index, log) {
            formula.add_cell(index, best.cell());
            scratch.remove_cell(best.cell());
            scratch.reset_potentials();
            log_formula!(
                log,
                value = %truncate_field(index.cell(best.cell()).value(), log.max_field_length),
                gain = best.potential,
                cover = formula.cover(),
                tuples = formula.tuple_weights().len(),
                "Extended formula"
            );
        }

        formula
    }
}

impl RelationIndex {
    /// Summarizes the relation into at most `size` formulas.
    ///
    /// Shorthand for `Summarizer::new(size).summarize(self)`.
    pub fn summarize(&mut self, size: usize) -> SummaryResult {
        Summarizer::new(size).summarize(self)
    }
}
