//! Rendering of summaries.
//!
//! # Examples
//!
//! ```rust
//! use relsum::formatters::{JsonFormatter, SummaryFormatter, TableFormatter};
//! use relsum::sources::text::parse_relation;
//! use relsum::core::WeightAssessor;
//!
//! let mut relation =
//!     parse_relation("single,set\nvenue,tags\nvldb,db\nvldb,db\n", &WeightAssessor::equal())
//!         .unwrap();
//! let summary = relation.summarize(1);
//!
//! let table = TableFormatter::new().format(&summary).unwrap();
//! assert!(table.contains("vldb"));
//!
//! let json = JsonFormatter::new().with_pretty(false).format(&summary).unwrap();
//! assert!(json.starts_with('{'));
//! ```

use std::fmt::Write;

use crate::core::{AttributeKind, SummaryResult, SummaryTerm};
use crate::error::{Result, SummaryError};

/// Trait for rendering a [`SummaryResult`].
pub trait SummaryFormatter {
    /// Renders the summary into a string.
    fn format(&self, result: &SummaryResult) -> Result<String>;
}

/// Serializes summaries as JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a pretty-printing JSON formatter.
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryFormatter for JsonFormatter {
    fn format(&self, result: &SummaryResult) -> Result<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(result)
        } else {
            serde_json::to_string(result)
        };
        rendered.map_err(|e| {
            SummaryError::Serialization(format!("Failed to serialize summary to JSON: {e}"))
        })
    }
}

/// Renders summaries as a plain text table for debugging.
///
/// Each formula is a column and each attribute a row:
///
/// ```text
/// attribute | #1    | #2
/// ----------+-------+---
/// venue     | vldb  |
/// tags      | a, b  | c
/// cover     | 6     | 1
/// ```
///
/// Elements of one set attribute are joined with `, `. For a hierarchy
/// attribute only the most specific prefix is shown. Attributes appear in the
/// order they are first used.
#[derive(Debug, Clone)]
pub struct TableFormatter {
    separator: String,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            separator: " | ".to_string(),
        }
    }

    /// Sets the column separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    fn rows(result: &SummaryResult) -> Vec<Vec<String>> {
        let mut attributes: Vec<&str> = Vec::new();
        for term in result.summary.iter().flatten() {
            if !attributes.contains(&term.attribute.as_str()) {
                attributes.push(&term.attribute);
            }
        }

        let mut rows = Vec::with_capacity(attributes.len() + 2);
        let mut header = vec!["attribute".to_string()];
        header.extend((1..=result.len()).map(|i| format!("#{i}")));
        rows.push(header);

        for attribute in attributes {
            let mut row = vec![attribute.to_string()];
            row.extend(
                result
                    .summary
                    .iter()
                    .map(|terms| Self::render_cell(attribute, terms)),
            );
            rows.push(row);
        }

        let mut cover = vec!["cover".to_string()];
        cover.extend(result.covers.iter().map(|c| format!("{c}")));
        rows.push(cover);
        rows
    }

    fn render_cell(attribute: &str, terms: &[SummaryTerm]) -> String {
        let matching: Vec<&SummaryTerm> =
            terms.iter().filter(|t| t.attribute == attribute).collect();
        match matching.first().map(|t| t.kind) {
            None => String::new(),
            Some(AttributeKind::Hierarchy) => matching
                .iter()
                .map(|t| t.value.as_str())
                .max_by_key(|v| v.chars().count())
                .unwrap_or_default()
                .to_string(),
            Some(_) => matching
                .iter()
                .map(|t| t.value.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryFormatter for TableFormatter {
    fn format(&self, result: &SummaryResult) -> Result<String> {
        let rows = Self::rows(result);
        let columns = result.len() + 1;
        let widths: Vec<usize> = (0..columns)
            .map(|c| {
                rows.iter()
                    .map(|row| row[c].chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut output = String::new();
        for (r, row) in rows.iter().enumerate() {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect();
            writeln!(output, "{}", cells.join(&self.separator).trim_end())
                .map_err(|e| SummaryError::Serialization(e.to_string()))?;

            if r == 0 {
                let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
                let joint = self.separator.replace(|ch: char| ch != ' ', "+").replace(' ', "-");
                writeln!(output, "{}", rule.join(&joint))
                    .map_err(|e| SummaryError::Serialization(e.to_string()))?;
            }
        }
        Ok(output)
    }
}
