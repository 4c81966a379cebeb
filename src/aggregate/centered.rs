// Mean-centred aggregation.
//
// Frequent words sit close to the space mean, so summing raw vectors lets
// them dominate every participant's aggregate. Each word vector has the
// space mean subtracted before it is added; the mean is added back once at
// the end, and the result is divided by its component sum.

use super::traits::VectorAggregator;
use super::AggregateError;
use crate::space::SemanticSpace;

/// Aggregates words against a semantic space by mean-centred summation.
pub struct MeanCenteredAggregator<'a> {
    space: &'a SemanticSpace,
}

impl<'a> MeanCenteredAggregator<'a> {
    pub fn new(space: &'a SemanticSpace) -> Self {
        Self { space }
    }

    /// Sum of mean-centred word vectors plus the mean, before normalization.
    pub fn centered_sum(&self, words: &[String]) -> Result<Vec<f64>, AggregateError> {
        let mean = self.space.mean();
        let mut sum = vec![0.0_f64; mean.len()];

        for word in words {
            let vector = self
                .space
                .vector(word)
                .ok_or_else(|| AggregateError::UnknownWord(word.clone()))?;
            for ((s, &v), &m) in sum.iter_mut().zip(vector).zip(mean) {
                *s += v - m;
            }
        }

        for (s, &m) in sum.iter_mut().zip(mean) {
            *s += m;
        }

        Ok(sum)
    }
}

impl VectorAggregator for MeanCenteredAggregator<'_> {
    fn aggregate(&self, words: &[String]) -> Result<Vec<f64>, AggregateError> {
        let sum = self.centered_sum(words)?;
        if sum.iter().sum::<f64>() == 0.0 {
            return Err(AggregateError::ZeroSum);
        }
        Ok(normalize_by_sum(sum))
    }
}

/// Divide every component by the sum of all components.
///
/// No guard: a zero sum yields NaN/inf components. Callers that need a
/// defined result check the sum first.
pub fn normalize_by_sum(mut vector: Vec<f64>) -> Vec<f64> {
    let total: f64 = vector.iter().sum();
    for v in &mut vector {
        *v /= total;
    }
    vector
}
