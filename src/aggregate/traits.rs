// Aggregator trait: the seam between word extraction and vector output.
//
// The pipeline driver only needs "words in, one vector out". The default
// implementation is the mean-centred sum in `centered.rs`.

use super::AggregateError;

/// Turns an ordered list of words into a single vector.
pub trait VectorAggregator {
    /// Aggregate a participant's words for one topic group.
    fn aggregate(&self, words: &[String]) -> Result<Vec<f64>, AggregateError>;
}
