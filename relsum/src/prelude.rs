//! Prelude for commonly used types and traits in relsum.

pub use crate::core::{
    AttributeKind, RelationIndex, Summarizer, SummaryResult, SummaryTerm, WeightAssessor,
};
pub use crate::error::{ErrorContext, Result, SummaryError};
pub use crate::formatters::{JsonFormatter, SummaryFormatter, TableFormatter};
pub use crate::logging::LogConfig;
pub use crate::sources::text::{load_relation, parse_relation};
