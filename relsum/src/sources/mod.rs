//! Relation sources for relsum.
//!
//! Only the textual relation format is supported: see [`text`].

pub mod text;

pub use text::{load_relation, parse_relation};
