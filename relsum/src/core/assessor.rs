//! Weight assessment for (attribute, tuple) pairs.
//!
//! A [`WeightAssessor`] decides how much covering one tuple through one
//! attribute is worth. Tuples are assumed to arrive ordered by relevance, so
//! the decaying policies use the tuple id as its rank.
//!
//! # Example
//!
//! ```rust
//! use relsum::core::{RelationIndex, WeightAssessor};
//!
//! let index = RelationIndex::new(&["single", "set"], &["venue", "authors"], 100).unwrap();
//! let assessor = WeightAssessor::exponential(vec![1.0, 0.5], 0.5)
//!     .unwrap()
//!     .with_num_tuples(100);
//!
//! let venue = index.attribute(0).unwrap();
//! assert_eq!(assessor.weight(venue, 0).unwrap(), 1.0);
//! assert!((assessor.weight(venue, 100).unwrap() - 0.5).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

use crate::core::cell::Cover;
use crate::core::index::Attribute;
use crate::error::{Result, SummaryError};

/// Decay reached by the last tuple when none is configured.
pub const DEFAULT_DECAY_END: f64 = 0.5;

/// How tuple weights are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightPolicy {
    /// Every (attribute, tuple) pair weighs 1.
    Equal,
    /// Attribute weight times an exponentially decaying tuple relevance.
    Exponential,
    /// Attribute weight times a linearly decaying tuple relevance.
    Linear,
    /// Attribute weight only.
    OnlyAttribute,
}

/// Maps an attribute and a tuple rank to a weight.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightAssessor {
    policy: WeightPolicy,
    weights: Vec<f64>,
    decay_end: f64,
    num_tuples: Option<usize>,
}

impl WeightAssessor {
    /// All weights are 1.
    pub fn equal() -> Self {
        Self {
            policy: WeightPolicy::Equal,
            weights: Vec::new(),
            decay_end: 1.0,
            num_tuples: None,
        }
    }

    /// `weights[i] * decay_end^(rank / num_tuples)`.
    pub fn exponential(weights: Vec<f64>, decay_end: f64) -> Result<Self> {
        Self::decaying(WeightPolicy::Exponential, weights, decay_end)
    }

    /// `weights[i] * (1 - decay_end * rank / num_tuples)`.
    pub fn linear(weights: Vec<f64>, decay_end: f64) -> Result<Self> {
        Self::decaying(WeightPolicy::Linear, weights, decay_end)
    }

    /// `weights[i]`, regardless of rank.
    pub fn only_attribute(weights: Vec<f64>) -> Result<Self> {
        check_weights(&weights)?;
        Ok(Self {
            policy: WeightPolicy::OnlyAttribute,
            weights,
            decay_end: 1.0,
            num_tuples: None,
        })
    }

    fn decaying(policy: WeightPolicy, weights: Vec<f64>, decay_end: f64) -> Result<Self> {
        if !(decay_end > 0.0 && decay_end <= 1.0) {
            return Err(SummaryError::configuration(format!(
                "decay_end must be in (0, 1], got {decay_end}"
            )));
        }
        check_weights(&weights)?;
        Ok(Self {
            policy,
            weights,
            decay_end,
            num_tuples: None,
        })
    }

    /// Sets the number of tuples the decaying policies scale ranks by.
    pub fn with_num_tuples(mut self, num_tuples: usize) -> Self {
        self.num_tuples = Some(num_tuples);
        self
    }

    /// Sets the number of tuples in place.
    pub fn set_num_tuples(&mut self, num_tuples: usize) {
        self.num_tuples = Some(num_tuples);
    }

    /// Returns the configured number of tuples, if any.
    pub fn num_tuples(&self) -> Option<usize> {
        self.num_tuples
    }

    /// Returns the weighting policy.
    pub fn policy(&self) -> WeightPolicy {
        self.policy
    }

    /// Returns the decay reached at the last tuple.
    pub fn decay_end(&self) -> f64 {
        self.decay_end
    }

    /// True when every weight is 1 and sums can be replaced by counts.
    pub fn is_equal(&self) -> bool {
        self.policy == WeightPolicy::Equal
    }

    /// Computes the weight of covering tuple `rank` through `attribute`.
    pub fn weight(&self, attribute: &Attribute, rank: usize) -> Result<f64> {
        match self.policy {
            WeightPolicy::Equal => Ok(1.0),
            WeightPolicy::Exponential => {
                let relevance = self.relative_rank(rank)?;
                Ok(self.attribute_weight(attribute)? * self.decay_end.powf(relevance))
            }
            WeightPolicy::Linear => {
                let relevance = self.relative_rank(rank)?;
                // ranks past num_tuples would go negative
                let relevance = (1.0 - self.decay_end * relevance).max(0.0);
                Ok(self.attribute_weight(attribute)? * relevance)
            }
            WeightPolicy::OnlyAttribute => self.attribute_weight(attribute),
        }
    }

    /// Sums the weights of a collection of covers.
    pub fn aggregate<'a, I>(&self, covers: I) -> f64
    where
        I: IntoIterator<Item = &'a Cover>,
    {
        sum_weights(self.is_equal(), covers)
    }

    fn relative_rank(&self, rank: usize) -> Result<f64> {
        match self.num_tuples {
            None => Err(SummaryError::configuration("num_tuples not configured")),
            Some(0) => Ok(0.0),
            Some(n) => Ok(rank as f64 / n as f64),
        }
    }

    fn attribute_weight(&self, attribute: &Attribute) -> Result<f64> {
        self.weights.get(attribute.index()).copied().ok_or_else(|| {
            SummaryError::configuration(format!(
                "no weight configured for attribute '{}' (index {})",
                attribute.name(),
                attribute.index()
            ))
        })
    }
}

impl Default for WeightAssessor {
    fn default() -> Self {
        Self::equal()
    }
}

/// Attribute weights must be finite and non-negative.
fn check_weights(weights: &[f64]) -> Result<()> {
    match weights
        .iter()
        .enumerate()
        .find(|(_, w)| !(w.is_finite() && **w >= 0.0))
    {
        Some((i, w)) => Err(SummaryError::configuration(format!(
            "weight of attribute {i} must be finite and non-negative, got {w}"
        ))),
        None => Ok(()),
    }
}

/// Sums cover weights, counting entries instead when all weights are 1.
pub(crate) fn sum_weights<'a, I>(equal_weights: bool, covers: I) -> f64
where
    I: IntoIterator<Item = &'a Cover>,
{
    if equal_weights {
        covers.into_iter().count() as f64
    } else {
        covers.into_iter().map(|cover| cover.weight).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kind::AttributeKind;

    fn attribute(index: usize) -> Attribute {
        Attribute::new(index, AttributeKind::Single, format!("a{index}"))
    }

    #[test]
    fn test_equal_weight() {
        let assessor = WeightAssessor::equal();
        assert_eq!(assessor.weight(&attribute(3), 17).unwrap(), 1.0);
        assert!(assessor.is_equal());
    }

    #[test]
    fn test_exponential_boundaries() {
        let assessor = WeightAssessor::exponential(vec![2.0, 0.8], 0.25)
            .unwrap()
            .with_num_tuples(40);
        let attr = attribute(1);

        assert_eq!(assessor.weight(&attr, 0).unwrap(), 0.8);
        assert!((assessor.weight(&attr, 40).unwrap() - 0.8 * 0.25).abs() < 1e-12);
        assert!((assessor.weight(&attr, 20).unwrap() - 0.8 * 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_linear_decay() {
        let assessor = WeightAssessor::linear(vec![1.0], 0.5)
            .unwrap()
            .with_num_tuples(10);
        let attr = attribute(0);

        assert_eq!(assessor.weight(&attr, 0).unwrap(), 1.0);
        assert!((assessor.weight(&attr, 5).unwrap() - 0.75).abs() < 1e-12);
        assert!((assessor.weight(&attr, 10).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_only_attribute_ignores_rank() {
        let assessor = WeightAssessor::only_attribute(vec![0.3, 0.7]).unwrap();
        assert_eq!(assessor.weight(&attribute(1), 0).unwrap(), 0.7);
        assert_eq!(assessor.weight(&attribute(1), 999).unwrap(), 0.7);
    }

    #[test]
    fn test_decaying_requires_num_tuples() {
        let assessor = WeightAssessor::exponential(vec![1.0], DEFAULT_DECAY_END).unwrap();
        let err = assessor.weight(&attribute(0), 1).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("num_tuples not configured"));

        let mut assessor = WeightAssessor::linear(vec![1.0], 1.0).unwrap();
        assert!(assessor.weight(&attribute(0), 1).is_err());
        assessor.set_num_tuples(4);
        assert_eq!(assessor.num_tuples(), Some(4));
        assert!((assessor.weight(&attribute(0), 1).unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_missing_attribute_weight() {
        let assessor = WeightAssessor::only_attribute(vec![1.0]).unwrap();
        let err = assessor.weight(&attribute(2), 0).unwrap_err();
        assert!(err.to_string().contains("index 2"));
    }

    #[test]
    fn test_decay_end_range() {
        assert!(WeightAssessor::exponential(vec![1.0], 0.0).is_err());
        assert!(WeightAssessor::exponential(vec![1.0], 1.5).is_err());
        assert!(WeightAssessor::linear(vec![1.0], f64::NAN).is_err());
        assert!(WeightAssessor::linear(vec![1.0], 1.0).is_ok());
    }

    #[test]
    fn test_rejects_invalid_attribute_weights() {
        for weights in [vec![1.0, -0.5], vec![f64::NAN], vec![f64::INFINITY, 1.0]] {
            let err = WeightAssessor::only_attribute(weights.clone()).unwrap_err();
            assert!(err.is_configuration());
            assert!(WeightAssessor::exponential(weights.clone(), 0.5).is_err());
            assert!(WeightAssessor::linear(weights, 0.5).is_err());
        }
        let err = WeightAssessor::linear(vec![2.0, -1.0], 0.5).unwrap_err();
        assert!(err.to_string().contains("attribute 1"));
        assert!(WeightAssessor::only_attribute(vec![0.0, 3.0]).is_ok());
    }

    #[test]
    fn test_linear_never_negative_past_num_tuples() {
        let assessor = WeightAssessor::linear(vec![1.0], 1.0)
            .unwrap()
            .with_num_tuples(4);
        assert_eq!(assessor.weight(&attribute(0), 4).unwrap(), 0.0);
        assert_eq!(assessor.weight(&attribute(0), 9).unwrap(), 0.0);
    }

    #[test]
    fn test_aggregate() {
        let covers = [
            Cover::new(0.5),
            Cover::new(0.25),
            Cover {
                covered: true,
                weight: 2.0,
            },
        ];
        assert_eq!(WeightAssessor::equal().aggregate(&covers), 3.0);
        assert_eq!(
            WeightAssessor::only_attribute(vec![1.0])
                .unwrap()
                .aggregate(&covers),
            2.75
        );
        assert_eq!(WeightAssessor::equal().aggregate(std::iter::empty::<&Cover>()), 0.0);
    }
}
