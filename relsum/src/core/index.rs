//! The inverted relation index.
//!
//! Every attribute maps each observed value to a [`Cell`] that records which
//! tuples exhibit the value. Cells are stored in one arena owned by the
//! [`RelationIndex`] and addressed by [`CellId`], so formulas and heaps can refer
//! to them without borrowing the index.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::core::assessor::WeightAssessor;
use crate::core::cell::{Cell, CellId, Cover};
use crate::core::kind::AttributeKind;
use crate::error::{Result, SummaryError};

/// Separator between the segments of a hierarchy prefix.
pub const HIERARCHY_SEPARATOR: &str = "/";

/// One column of the relation.
#[derive(Debug, Clone)]
pub struct Attribute {
    index: usize,
    kind: AttributeKind,
    name: String,
    values: HashMap<String, CellId>,
}

impl Attribute {
    pub(crate) fn new(index: usize, kind: AttributeKind, name: impl Into<String>) -> Self {
        Self {
            index,
            kind,
            name: name.into(),
            values: HashMap::new(),
        }
    }

    /// Stable ordinal of the attribute within its relation.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Observed values and the cells recording them.
    pub fn values(&self) -> &HashMap<String, CellId> {
        &self.values
    }

    /// Looks up the cell of an observed value.
    pub fn cell(&self, value: &str) -> Option<CellId> {
        self.values.get(value).copied()
    }
}

/// Inverted index over the values of a relation.
#[derive(Debug, Clone)]
pub struct RelationIndex {
    attributes: Vec<Attribute>,
    cells: Vec<Cell>,
    num_tuples: usize,
}

impl RelationIndex {
    /// Creates an empty index.
    ///
    /// Fails when the number of type names and attribute names differ or when a
    /// type name is not one of `single`, `set`, `hierarchy`.
    pub fn new<T, N>(type_names: &[T], attribute_names: &[N], num_tuples: usize) -> Result<Self>
    where
        T: AsRef<str>,
        N: AsRef<str>,
    {
        if type_names.len() != attribute_names.len() {
            return Err(SummaryError::configuration(format!(
                "mismatching number of names and types: {} != {}",
                attribute_names.len(),
                type_names.len()
            )));
        }

        let attributes = type_names
            .iter()
            .zip(attribute_names)
            .enumerate()
            .map(|(index, (kind, name))| {
                let kind: AttributeKind = kind.as_ref().parse()?;
                Ok(Attribute::new(index, kind, name.as_ref().trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            attributes = attributes.len(),
            num_tuples, "Created relation index"
        );

        Ok(Self {
            attributes,
            cells: Vec::new(),
            num_tuples,
        })
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    pub fn attribute_by_name(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }

    pub fn num_tuples(&self) -> usize {
        self.num_tuples
    }

    /// Number of distinct (attribute, value) cells.
    pub fn num_values(&self) -> usize {
        self.cells.len()
    }

    /// Returns the cell behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by another index.
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.0]
    }

    pub(crate) fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id.0]
    }

    /// Ids of all cells in insertion order.
    pub fn cell_ids(&self) -> impl Iterator<Item = CellId> + '_ {
        (0..self.cells.len()).map(CellId)
    }

    /// Looks up the cell of `value` in the attribute with ordinal `attribute`.
    pub fn find_cell(&self, attribute: usize, value: &str) -> Option<CellId> {
        self.attributes.get(attribute)?.cell(value)
    }

    /// Records that `tuple` exhibits `value` for `attribute`.
    ///
    /// Returns true when this created a new cell. An existing entry for the
    /// same tuple is overwritten with a fresh, uncovered cover.
    pub fn add_cell(
        &mut self,
        attribute: usize,
        value: &str,
        tuple: usize,
        assessor: &WeightAssessor,
    ) -> Result<bool> {
        let attr = self.attributes.get(attribute).ok_or_else(|| {
            SummaryError::configuration(format!(
                "attribute index {attribute} out of range ({} attributes)",
                self.attributes.len()
            ))
        })?;
        let cover = Cover::new(assessor.weight(attr, tuple)?);

        if let Some(id) = attr.cell(value) {
            self.cells[id.0].insert(tuple, cover);
            return Ok(false);
        }

        let id = CellId(self.cells.len());
        let mut cell = Cell::new(attribute, value, assessor.is_equal());
        cell.insert(tuple, cover);
        self.cells.push(cell);
        self.attributes[attribute]
            .values
            .insert(value.to_string(), id);
        Ok(true)
    }

    /// Ingests one raw field of a tuple following the attribute's kind.
    ///
    /// Single values are added as-is. Set values are split on whitespace into
    /// independent elements. Hierarchy values are split on whitespace into path
    /// segments and every cumulative prefix (`a`, `a/b`, `a/b/c`) is added, so
    /// the tuple counts towards each ancestor level. Blank fields are nulls.
    ///
    /// Returns the number of cells created.
    pub fn add_value(
        &mut self,
        attribute: usize,
        raw: &str,
        tuple: usize,
        assessor: &WeightAssessor,
    ) -> Result<usize> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(0);
        }
        let kind = self
            .attributes
            .get(attribute)
            .map(Attribute::kind)
            .ok_or_else(|| {
                SummaryError::configuration(format!("attribute index {attribute} out of range"))
            })?;

        let mut created = 0;
        match kind {
            AttributeKind::Single => {
                created += usize::from(self.add_cell(attribute, raw, tuple, assessor)?);
            }
            AttributeKind::Set => {
                for element in raw.split_whitespace() {
                    created += usize::from(self.add_cell(attribute, element, tuple, assessor)?);
                }
            }
            AttributeKind::Hierarchy => {
                let mut prefix = String::new();
                for segment in raw.split_whitespace() {
                    if !prefix.is_empty() {
                        prefix.push_str(HIERARCHY_SEPARATOR);
                    }
                    prefix.push_str(segment);
                    created += usize::from(self.add_cell(attribute, &prefix, tuple, assessor)?);
                }
            }
        }
        Ok(created)
    }

    /// Marks every cover as uncovered again so the index can be summarized
    /// anew.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.reset();
        }
    }
}

impl fmt::Display for RelationIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Relation Index ({} attributes, {} tuples, {} values):",
            self.attributes.len(),
            self.num_tuples,
            self.cells.len()
        )?;
        for attribute in &self.attributes {
            writeln!(f, "Attribute {} ({}):", attribute.name, attribute.kind)?;
            let mut values: Vec<_> = attribute.values.iter().collect();
            values.sort();
            for (value, id) in values {
                let mut tuples: Vec<_> = self.cells[id.0].covers().iter().collect();
                tuples.sort_by_key(|(tuple, _)| **tuple);
                let rendered: Vec<String> = tuples
                    .into_iter()
                    .map(|(tuple, cover)| {
                        format!("{tuple}: {}", if cover.covered { "y" } else { "n" })
                    })
                    .collect();
                writeln!(f, "Value {value} covers: [{}]", rendered.join(" "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> RelationIndex {
        RelationIndex::new(&["single", "set", "hierarchy"], &["x", "y", "z"], 4).unwrap()
    }

    #[test]
    fn test_new_index() {
        let index = index();
        assert_eq!(index.attributes().len(), 3);
        assert_eq!(index.attribute(2).unwrap().kind(), AttributeKind::Hierarchy);
        assert_eq!(index.attribute_by_name("y").unwrap().index(), 1);
        assert_eq!(index.num_tuples(), 4);
        assert_eq!(index.num_values(), 0);
    }

    #[test]
    fn test_new_index_mismatch() {
        let err = RelationIndex::new(&["single", "set"], &["x"], 0).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("1 != 2"));
    }

    #[test]
    fn test_new_index_unknown_type() {
        let err = RelationIndex::new(&["single", "tree"], &["x", "y"], 0).unwrap_err();
        assert!(err.to_string().contains("'tree'"));
    }

    #[test]
    fn test_add_cell_creates_once() {
        let mut index = index();
        let assessor = WeightAssessor::equal();
        assert!(index.add_cell(0, "a", 0, &assessor).unwrap());
        assert!(!index.add_cell(0, "a", 1, &assessor).unwrap());
        assert!(index.add_cell(0, "b", 2, &assessor).unwrap());

        let a = index.find_cell(0, "a").unwrap();
        assert_eq!(index.cell(a).covers().len(), 2);
        assert!(index.cell(a).equal_weights());
        assert_eq!(index.num_values(), 2);
    }

    #[test]
    fn test_add_cell_unknown_attribute() {
        let mut index = index();
        let err = index
            .add_cell(5, "a", 0, &WeightAssessor::equal())
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_add_cell_overwrites_cover() {
        let mut index = index();
        let assessor = WeightAssessor::equal();
        index.add_cell(0, "a", 0, &assessor).unwrap();
        let id = index.find_cell(0, "a").unwrap();
        index.cell_mut(id).cover(0);
        index.add_cell(0, "a", 0, &assessor).unwrap();
        assert!(!index.cell(id).covers()[&0].covered);
    }

    #[test]
    fn test_add_value_set_splits_elements() {
        let mut index = index();
        let assessor = WeightAssessor::equal();
        assert_eq!(index.add_value(1, "c  d", 0, &assessor).unwrap(), 2);
        assert!(index.find_cell(1, "c").is_some());
        assert!(index.find_cell(1, "d").is_some());
        assert!(index.find_cell(1, "c  d").is_none());
    }

    #[test]
    fn test_add_value_hierarchy_prefixes() {
        let mut index = index();
        let assessor = WeightAssessor::equal();
        assert_eq!(index.add_value(2, "a b c", 0, &assessor).unwrap(), 3);
        assert_eq!(index.add_value(2, "a b", 1, &assessor).unwrap(), 0);

        let a = index.find_cell(2, "a").unwrap();
        let ab = index.find_cell(2, "a/b").unwrap();
        let abc = index.find_cell(2, "a/b/c").unwrap();
        assert_eq!(index.cell(a).covers().len(), 2);
        assert_eq!(index.cell(ab).covers().len(), 2);
        assert_eq!(index.cell(abc).covers().len(), 1);
    }

    #[test]
    fn test_add_value_null() {
        let mut index = index();
        assert_eq!(
            index.add_value(0, "   ", 0, &WeightAssessor::equal()).unwrap(),
            0
        );
        assert_eq!(index.num_values(), 0);
    }

    #[test]
    fn test_weights_follow_assessor() {
        let mut index = index();
        let assessor = WeightAssessor::only_attribute(vec![0.5, 2.0, 1.0]).unwrap();
        index.add_value(1, "c d", 3, &assessor).unwrap();
        let c = index.find_cell(1, "c").unwrap();
        assert_eq!(index.cell(c).covers()[&3].weight, 2.0);
        assert!(!index.cell(c).equal_weights());
    }

    #[test]
    fn test_reset_uncovers_everything() {
        let mut index = index();
        let assessor = WeightAssessor::equal();
        for tuple in 0..4 {
            index.add_value(1, "c d", tuple, &assessor).unwrap();
        }
        let ids: Vec<_> = index.cell_ids().collect();
        for &id in &ids {
            for tuple in 0..4 {
                index.cell_mut(id).cover(tuple);
            }
            assert_eq!(index.cell(id).uncovered_weight(), 0.0);
        }

        index.reset();
        for id in ids {
            assert_eq!(
                index.cell(id).uncovered_weight(),
                index.cell(id).covers().len() as f64
            );
        }
    }

    #[test]
    fn test_display() {
        let mut index = index();
        index
            .add_value(0, "a", 1, &WeightAssessor::equal())
            .unwrap();
        let rendered = index.to_string();
        assert!(rendered.starts_with("Relation Index (3 attributes, 4 tuples, 1 values):"));
        assert!(rendered.contains("Value a covers: [1: n]"));
    }
}
