// Semantic space: the word -> vector table every other stage looks up into.
//
// The space is loaded once and never mutated. Alongside the vectors it holds
// the space mean (subtracted from each word during aggregation) and the
// dimension labels used as output column names.

pub mod loader;

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

pub use loader::SpaceOptions;

/// Errors raised while building a semantic space.
#[derive(Error, Debug)]
pub enum SpaceError {
    #[error("failed to read semantic space {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed semantic space file: {0}")]
    Csv(#[from] csv::Error),

    #[error("column {0:?} not found in semantic space header")]
    MissingColumn(String),

    #[error("semantic space has no dimension columns left after dropping {skipped} leading column(s)")]
    NoDimensions { skipped: usize },

    #[error("invalid number {value:?} for column {column:?} on line {line}")]
    InvalidNumber {
        line: u64,
        column: String,
        value: String,
    },

    #[error("negative frequency weight {weight} for word {word:?}")]
    NegativeWeight { word: String, weight: f64 },

    #[error("got {found} frequency weights for {expected} rows")]
    WeightCount { expected: usize, found: usize },

    #[error("vector for {word:?} has {found} dimensions, expected {expected}")]
    RowDimensions {
        word: String,
        expected: usize,
        found: usize,
    },

    #[error("semantic space has {found} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("semantic space contains no complete rows")]
    Empty,

    #[error("frequency weights sum to zero, cannot compute a weighted mean")]
    ZeroTotalWeight,
}

/// How the space mean was computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeanWeighting {
    /// Plain arithmetic mean over all loaded rows.
    Uniform,
    /// Weighted by a per-word frequency column.
    Frequency,
}

/// An immutable word -> vector mapping with a precomputed mean vector.
#[derive(Debug, Clone)]
pub struct SemanticSpace {
    columns: Vec<String>,
    vectors: Vec<Vec<f64>>,
    /// Word -> row in `vectors`. Duplicate words resolve to their first row.
    index: HashMap<String, usize>,
    mean: Vec<f64>,
    weighting: MeanWeighting,
    duplicates: usize,
    /// Rows with no usable word. They count toward the mean only.
    unindexed: usize,
    /// Words that were not valid UTF-8 and were decoded lossily.
    undecodable: usize,
}

impl SemanticSpace {
    /// Build a space from `(word, vector)` rows.
    ///
    /// With `weights` the mean is frequency-weighted, otherwise every row
    /// counts once. All rows, duplicates included, contribute to the mean.
    pub fn from_rows(
        columns: Vec<String>,
        rows: Vec<(String, Vec<f64>)>,
        weights: Option<Vec<f64>>,
    ) -> Result<Self, SpaceError> {
        let rows = rows.into_iter().map(|(word, v)| (Some(word), v)).collect();
        Self::from_entries(columns, rows, weights)
    }

    /// Like [`SemanticSpace::from_rows`], but a row may have no word.
    ///
    /// Wordless rows still contribute to the mean and the row count but can
    /// never be looked up.
    pub fn from_entries(
        columns: Vec<String>,
        rows: Vec<(Option<String>, Vec<f64>)>,
        weights: Option<Vec<f64>>,
    ) -> Result<Self, SpaceError> {
        if columns.is_empty() {
            return Err(SpaceError::NoDimensions { skipped: 0 });
        }
        if rows.is_empty() {
            return Err(SpaceError::Empty);
        }

        if let Some(weights) = &weights {
            if weights.len() != rows.len() {
                return Err(SpaceError::WeightCount {
                    expected: rows.len(),
                    found: weights.len(),
                });
            }
        }

        let dims = columns.len();
        let mut index = HashMap::with_capacity(rows.len());
        let mut vectors = Vec::with_capacity(rows.len());
        let mut duplicates = 0;
        let mut unindexed = 0;

        for (row, (word, vector)) in rows.into_iter().enumerate() {
            if vector.len() != dims {
                return Err(SpaceError::RowDimensions {
                    word: word.unwrap_or_default(),
                    expected: dims,
                    found: vector.len(),
                });
            }
            if let Some(&weight) = weights.as_ref().and_then(|w| w.get(row)) {
                if weight < 0.0 {
                    return Err(SpaceError::NegativeWeight {
                        word: word.unwrap_or_default(),
                        weight,
                    });
                }
            }
            match word {
                Some(word) if index.contains_key(&word) => duplicates += 1,
                Some(word) => {
                    index.insert(word, row);
                }
                None => unindexed += 1,
            }
            vectors.push(vector);
        }

        let (mean, weighting) = match weights {
            Some(weights) => (weighted_mean(&vectors, &weights)?, MeanWeighting::Frequency),
            None => (uniform_mean(&vectors, dims), MeanWeighting::Uniform),
        };

        Ok(Self {
            columns,
            vectors,
            index,
            mean,
            weighting,
            duplicates,
            unindexed,
            undecodable: 0,
        })
    }

    /// True if the word has a vector in the space.
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// The vector for a word, if it is in the space.
    pub fn vector(&self, word: &str) -> Option<&[f64]> {
        self.index.get(word).map(|&row| self.vectors[row].as_slice())
    }

    /// The space mean vector.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Dimension labels, in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn dimensions(&self) -> usize {
        self.columns.len()
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of rows that contributed to the mean.
    pub fn row_count(&self) -> usize {
        self.vectors.len()
    }

    /// Rows whose word was already present earlier in the file.
    pub fn duplicate_count(&self) -> usize {
        self.duplicates
    }

    /// Rows without a word: in the mean, not in the index.
    pub fn unindexed_count(&self) -> usize {
        self.unindexed
    }

    /// Words whose bytes were not valid UTF-8.
    pub fn undecodable_count(&self) -> usize {
        self.undecodable
    }

    pub fn weighting(&self) -> MeanWeighting {
        self.weighting
    }
}

fn uniform_mean(vectors: &[Vec<f64>], dims: usize) -> Vec<f64> {
    let n = vectors.len() as f64;
    let mut mean = vec![0.0_f64; dims];

    for vector in vectors {
        for (m, &v) in mean.iter_mut().zip(vector) {
            *m += v;
        }
    }

    for m in &mut mean {
        *m /= n;
    }

    mean
}

fn weighted_mean(vectors: &[Vec<f64>], weights: &[f64]) -> Result<Vec<f64>, SpaceError> {
    let total: f64 = weights.iter().sum();
    if total == 0.0 {
        return Err(SpaceError::ZeroTotalWeight);
    }

    let dims = vectors.first().map(Vec::len).unwrap_or(0);
    let mut mean = vec![0.0_f64; dims];
    for (vector, &weight) in vectors.iter().zip(weights) {
        for (m, &v) in mean.iter_mut().zip(vector) {
            *m += v * weight;
        }
    }
    for m in &mut mean {
        *m /= total;
    }

    Ok(mean)
}
