//! # relsum - Relation Summarization for Rust
//!
//! relsum computes a compact, human readable summary of a relation whose
//! columns may be single-valued, set-valued or hierarchical. A summary is an
//! ordered list of conjunctive formulas over column values, chosen greedily so
//! that together they account for as much weighted data as possible within a
//! fixed budget of formulas.
//!
//! ## Quick Start
//!
//! ```rust
//! use relsum::prelude::*;
//!
//! # fn example() -> relsum::error::Result<()> {
//! let text = "single,single,set\n\
//!             venue,year,keywords\n\
//!             vldb,2019,index btree\n\
//!             vldb,2020,index\n\
//!             icml,2020,learning\n";
//!
//! let mut relation = parse_relation(text, &WeightAssessor::equal())?;
//! let summary = relation.summarize(2);
//!
//! assert_eq!(summary.len(), 2);
//! println!("{}", TableFormatter::new().format(&summary)?);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Column kinds
//!
//! - **Single**: one value per tuple, e.g. a venue
//! - **Set**: whitespace separated elements, each its own value
//! - **Hierarchy**: whitespace separated path segments; every prefix
//!   (`eu`, `eu/fr`, `eu/fr/paris`) is a value, so a tuple counts at every
//!   level of generality
//!
//! ## Weighting
//!
//! [`core::WeightAssessor`] maps an (attribute, tuple rank) pair to a weight.
//! Tuples are assumed to be ordered by relevance:
//!
//! ```rust
//! use relsum::core::WeightAssessor;
//!
//! // the last tuple counts half as much as the first
//! let assessor = WeightAssessor::exponential(vec![1.0, 0.5, 0.5], 0.5).unwrap();
//! # let _ = assessor;
//! ```
//!
//! ## Architecture
//!
//! - **`core`**: the index, the weight model, formulas, the lazy heap and the
//!   greedy summarizer
//! - **`sources`**: the textual relation format
//! - **`formatters`**: table and JSON rendering of summaries
//! - **`logging`**: log gating and subscriber setup
//! - **`error`**: the crate error type

pub mod core;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod prelude;
pub mod sources;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;
