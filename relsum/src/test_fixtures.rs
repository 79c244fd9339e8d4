//! Relations for tests and benchmarks.
//!
//! Provides the small hand-written relations used across the test suite and a
//! seeded generator for random relations of arbitrary size.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::{AttributeKind, RelationIndex, WeightAssessor};
use crate::error::Result;
use crate::sources::text::parse_relation;

/// Six tuples over two single columns and a set column.
///
/// `x=a` appears in five tuples and is the best first seed under equal
/// weighting.
pub const REFERENCE_RELATION: &str =
    "single,single,set\nx,y,z\na,b,c d\na,b,c\na,b,c\nb,,d e f\na,b,c e\na,a,";

/// Publications with a hierarchical place column.
pub const PUBLICATIONS_RELATION: &str = "single,single,set,hierarchy
venue,year,keywords,place
vldb,2019,index btree,eu fr paris
vldb,2020,index,eu fr lyon
vldb,2020,index lsm,eu de berlin
icml,2020,learning,us ca
icml,2021,learning rl,us ca
sigmod,2021,index,eu fr paris
";

/// Parses [`REFERENCE_RELATION`] under equal weighting.
pub fn reference_relation() -> Result<RelationIndex> {
    parse_relation(REFERENCE_RELATION, &WeightAssessor::equal())
}

/// Parses [`PUBLICATIONS_RELATION`] with the given assessor.
pub fn publications_relation(assessor: &WeightAssessor) -> Result<RelationIndex> {
    parse_relation(PUBLICATIONS_RELATION, assessor)
}

/// Shape of a generated relation.
#[derive(Debug, Clone)]
pub struct RandomRelationConfig {
    pub kinds: Vec<AttributeKind>,
    pub num_tuples: usize,
    /// Distinct values per single column, elements per set column and
    /// branching factor per hierarchy level
    pub distinct_values: usize,
    pub max_set_size: usize,
    pub max_depth: usize,
    /// Probability that a field is empty
    pub null_probability: f64,
    pub seed: u64,
}

impl Default for RandomRelationConfig {
    fn default() -> Self {
        Self {
            kinds: vec![
                AttributeKind::Single,
                AttributeKind::Single,
                AttributeKind::Set,
                AttributeKind::Hierarchy,
            ],
            num_tuples: 100,
            distinct_values: 8,
            max_set_size: 3,
            max_depth: 3,
            null_probability: 0.1,
            seed: 42,
        }
    }
}

impl RandomRelationConfig {
    pub fn with_tuples(mut self, num_tuples: usize) -> Self {
        self.num_tuples = num_tuples;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_kinds(mut self, kinds: Vec<AttributeKind>) -> Self {
        self.kinds = kinds;
        self
    }

    pub fn with_distinct_values(mut self, distinct_values: usize) -> Self {
        self.distinct_values = distinct_values;
        self
    }
}

/// Generates a relation in the textual format.
///
/// The same configuration always produces the same text.
pub fn random_relation_text(config: &RandomRelationConfig) -> String {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let distinct = config.distinct_values.max(1);

    let kinds: Vec<&str> = config.kinds.iter().map(|k| k.as_str()).collect();
    let names: Vec<String> = (0..config.kinds.len()).map(|i| format!("a{i}")).collect();
    let mut text = format!("{}\n{}\n", kinds.join(","), names.join(","));

    for _ in 0..config.num_tuples {
        let fields: Vec<String> = config
            .kinds
            .iter()
            .map(|kind| {
                if rng.random_bool(config.null_probability) {
                    return String::new();
                }
                match kind {
                    AttributeKind::Single => format!("v{}", rng.random_range(0..distinct)),
                    AttributeKind::Set => {
                        let size = rng.random_range(1..=config.max_set_size.max(1));
                        let elements: BTreeSet<usize> =
                            (0..size).map(|_| rng.random_range(0..distinct)).collect();
                        elements
                            .iter()
                            .map(|e| format!("e{e}"))
                            .collect::<Vec<_>>()
                            .join(" ")
                    }
                    AttributeKind::Hierarchy => {
                        let depth = rng.random_range(1..=config.max_depth.max(1));
                        (0..depth)
                            .map(|level| format!("l{level}_{}", rng.random_range(0..distinct)))
                            .collect::<Vec<_>>()
                            .join(" ")
                    }
                }
            })
            .collect();
        text.push_str(&fields.join(","));
        text.push('\n');
    }
    text
}

/// Generates and parses a random relation.
pub fn random_relation(
    config: &RandomRelationConfig,
    assessor: &WeightAssessor,
) -> Result<RelationIndex> {
    parse_relation(&random_relation_text(config), assessor)
}
