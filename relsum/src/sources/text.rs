//! The textual relation format.
//!
//! ```text
//! single,single,set          <- line 1: attribute kinds
//! venue,year,keywords        <- line 2: attribute names
//! vldb,2019,index btree      <- one tuple per line
//! icml,,learning             <- an empty field is a null
//! ```
//!
//! Fields are comma separated and trimmed. Set fields hold whitespace
//! separated elements, hierarchy fields hold whitespace separated path
//! segments from the most general to the most specific. Tuple ids are
//! assigned in line order starting at 0, so the decaying weight policies
//! treat earlier lines as more relevant.

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::core::{RelationIndex, WeightAssessor};
use crate::error::{ErrorContext, Result, SummaryError};

const FIELD_SEPARATOR: char = ',';

/// Parses a relation from its textual form.
///
/// The number of tuples is the number of data lines; a trailing newline does
/// not add a tuple. When `assessor` has no tuple count configured, a copy
/// configured with that count is used.
///
/// # Errors
///
/// - [`SummaryError::Parse`] when a header line is missing, the headers
///   disagree, a kind is unknown or a tuple has the wrong number of fields
/// - [`SummaryError::Configuration`] when the assessor cannot weigh a tuple
///
/// # Example
///
/// ```rust
/// use relsum::core::WeightAssessor;
/// use relsum::sources::text::parse_relation;
///
/// let relation = parse_relation(
///     "single,hierarchy\nvenue,place\nvldb,eu fr\nicml,us\n",
///     &WeightAssessor::equal(),
/// )
/// .unwrap();
///
/// assert_eq!(relation.num_tuples(), 2);
/// assert!(relation.find_cell(1, "eu/fr").is_some());
/// ```
#[instrument(skip(text, assessor), fields(bytes = text.len()))]
pub fn parse_relation(text: &str, assessor: &WeightAssessor) -> Result<RelationIndex> {
    let mut lines = text.lines();
    let kinds: Vec<&str> = lines
        .next()
        .ok_or_else(|| SummaryError::parse(1, "missing attribute kinds"))?
        .split(FIELD_SEPARATOR)
        .collect();
    let names: Vec<&str> = lines
        .next()
        .ok_or_else(|| SummaryError::parse(2, "missing attribute names"))?
        .split(FIELD_SEPARATOR)
        .collect();
    if kinds.len() != names.len() {
        return Err(SummaryError::parse(
            2,
            format!(
                "expected {} attribute names but got {}",
                kinds.len(),
                names.len()
            ),
        ));
    }

    let tuples: Vec<&str> = lines.collect();
    let mut index = RelationIndex::new(kinds.as_slice(), names.as_slice(), tuples.len())
        .map_err(|e| match e {
            SummaryError::Configuration(message) => SummaryError::parse(1, message),
            other => other,
        })?;

    let configured;
    let assessor = match assessor.num_tuples() {
        Some(_) => assessor,
        None => {
            configured = assessor.clone().with_num_tuples(tuples.len());
            &configured
        }
    };

    let mut created = 0;
    for (tuple, line) in tuples.iter().enumerate() {
        let line_number = tuple + 3;
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        if fields.len() != kinds.len() {
            return Err(SummaryError::parse(
                line_number,
                format!("expected {} fields but got {}", kinds.len(), fields.len()),
            ));
        }
        for (attribute, field) in fields.iter().enumerate() {
            created += index
                .add_value(attribute, field, tuple, assessor)
                .with_context(|| format!("tuple on line {line_number}"))?;
        }
    }

    debug!(cells = created, "Indexed relation values");
    info!(
        attributes = index.attributes().len(),
        tuples = index.num_tuples(),
        values = index.num_values(),
        "Parsed relation"
    );

    Ok(index)
}

/// Reads and parses a relation file.
///
/// # Errors
///
/// [`SummaryError::Io`] when the file cannot be read, otherwise as
/// [`parse_relation`].
pub fn load_relation(path: impl AsRef<Path>, assessor: &WeightAssessor) -> Result<RelationIndex> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Loading relation");
    let text = std::fs::read_to_string(path)?;
    parse_relation(&text, assessor)
}
