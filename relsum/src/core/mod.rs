//! Indexing and greedy selection engine.
//!
//! ## Overview
//!
//! - **[`RelationIndex`]**: attributes and the cells of every observed value
//! - **[`WeightAssessor`]**: how much covering one (attribute, tuple) pair is worth
//! - **[`Formula`]**: a conjunction of cells and the weight it collects
//! - **[`CellHeap`]**: lazy max-heap of cells keyed by cached potential
//! - **[`Summarizer`]**: the greedy driver producing a [`SummaryResult`]
//!
//! ## Data flow
//!
//! ```text
//! ingestion ──> RelationIndex ──> CellHeap ──> Formula ──┐
//!                    ^                                    │
//!                    └──────── cover_index ───────────────┘
//! ```

pub mod assessor;
pub mod cell;
pub mod formula;
pub mod heap;
pub mod index;
pub mod kind;
pub mod result;
pub mod summarizer;

pub use assessor::{WeightAssessor, WeightPolicy, DEFAULT_DECAY_END};
pub use cell::{Cell, CellId, Cover};
pub use formula::Formula;
pub use heap::{CellHeap, RankedCell};
pub use index::{Attribute, RelationIndex, HIERARCHY_SEPARATOR};
pub use kind::AttributeKind;
pub use result::{SummaryResult, SummaryTerm};
pub use summarizer::{Summarizer, SummarizerBuilder, SummarizerConfig, DEFAULT_SUMMARY_SIZE};
