// Aggregation: collapse a participant's word list into one vector.

pub mod centered;
pub mod traits;

use thiserror::Error;

/// Errors raised while aggregating a word list.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregateError {
    #[error("word {0:?} has no vector in the semantic space")]
    UnknownWord(String),

    #[error("aggregated vector components sum to zero, cannot normalize")]
    ZeroSum,
}
