// Reads a semantic space from a delimited file.
//
// Expected layout: a header row, a key column of words (default `words`),
// one or more leading index columns to drop, then the dimension columns.
// Rows with any missing value are discarded entirely.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, warn};

use super::{SemanticSpace, SpaceError};
use crate::tabular::{decode_field, decode_field_checked, decode_header, is_missing};

/// Dimensionality of the semantic space the pipeline was built around.
pub const DEFAULT_DIMENSIONS: usize = 512;

/// How to interpret the columns of a space file.
#[derive(Debug, Clone)]
pub struct SpaceOptions {
    pub delimiter: u8,
    /// Column holding the lookup words.
    pub word_column: String,
    /// Non-word columns to drop from the front before the dimensions start.
    pub skip_columns: usize,
    /// Optional per-word frequency column used to weight the space mean.
    pub frequency_column: Option<String>,
    /// Reject spaces whose dimensionality differs from this.
    pub expected_dimensions: Option<usize>,
}

impl Default for SpaceOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            word_column: "words".to_string(),
            skip_columns: 1,
            frequency_column: None,
            expected_dimensions: Some(DEFAULT_DIMENSIONS),
        }
    }
}

/// Column positions resolved from the header.
struct Layout {
    word: usize,
    frequency: Option<usize>,
    dimensions: Vec<usize>,
    labels: Vec<String>,
}

impl Layout {
    fn resolve(header: &[String], options: &SpaceOptions) -> Result<Self, SpaceError> {
        let word = header
            .iter()
            .position(|h| h == &options.word_column)
            .ok_or_else(|| SpaceError::MissingColumn(options.word_column.clone()))?;

        let others: Vec<usize> = (0..header.len()).filter(|&i| i != word).collect();

        // The frequency column is found among all non-word columns, so it
        // may itself be one of the skipped leading columns.
        let frequency = match &options.frequency_column {
            Some(name) => Some(
                others
                    .iter()
                    .copied()
                    .find(|&i| &header[i] == name)
                    .ok_or_else(|| SpaceError::MissingColumn(name.clone()))?,
            ),
            None => None,
        };

        let rest: Vec<usize> = others
            .into_iter()
            .skip(options.skip_columns)
            .filter(|&i| Some(i) != frequency)
            .collect();

        if rest.is_empty() {
            return Err(SpaceError::NoDimensions {
                skipped: options.skip_columns,
            });
        }

        let labels = rest.iter().map(|&i| header[i].clone()).collect();

        Ok(Self {
            word,
            frequency,
            dimensions: rest,
            labels,
        })
    }
}

impl SemanticSpace {
    /// Load a semantic space from a file on disk.
    pub fn load(path: &Path, options: &SpaceOptions) -> Result<Self, SpaceError> {
        let file = File::open(path).map_err(|source| SpaceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let space = Self::from_reader(file, options)?;

        info!(
            path = %path.display(),
            words = space.len(),
            dimensions = space.dimensions(),
            weighting = ?space.weighting(),
            "Loaded semantic space"
        );

        Ok(space)
    }

    /// Parse a semantic space from any reader.
    pub fn from_reader<R: Read>(reader: R, options: &SpaceOptions) -> Result<Self, SpaceError> {
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(true)
            .from_reader(reader);

        let header: Vec<String> = csv.byte_headers()?.iter().map(decode_header).collect();
        let layout = Layout::resolve(&header, options)?;

        if let Some(expected) = options.expected_dimensions {
            if layout.labels.len() != expected {
                return Err(SpaceError::DimensionMismatch {
                    expected,
                    found: layout.labels.len(),
                });
            }
        }

        let mut rows = Vec::new();
        let mut weights = layout.frequency.map(|_| Vec::new());
        let mut incomplete = 0usize;
        let mut undecodable = 0usize;

        for record in csv.byte_records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let (word, replaced) = decode_field_checked(record.get(layout.word).unwrap_or_default());
            if replaced {
                undecodable += 1;
            }
            // A missing word still has a vector; it counts toward the mean
            let word = (!is_missing(&word)).then_some(word);

            let Some(vector) = parse_values(&record, &layout.dimensions, &header, line)? else {
                incomplete += 1;
                continue;
            };

            if let (Some(col), Some(weights)) = (layout.frequency, weights.as_mut()) {
                match parse_value(&record, col, &header, line)? {
                    Some(weight) => weights.push(weight),
                    None => {
                        incomplete += 1;
                        continue;
                    }
                }
            }

            rows.push((word, vector));
        }

        if incomplete > 0 {
            debug!(rows = incomplete, "Dropped incomplete semantic space rows");
        }

        let mut space = SemanticSpace::from_entries(layout.labels, rows, weights)?;
        space.undecodable = undecodable;

        if space.unindexed_count() > 0 {
            debug!(
                rows = space.unindexed_count(),
                "Semantic space rows without a word kept for the mean only"
            );
        }

        if undecodable > 0 {
            warn!(
                words = undecodable,
                "Semantic space words are not valid UTF-8; replaced bytes may make distinct words collide"
            );
        }

        if space.duplicate_count() > 0 {
            warn!(
                duplicates = space.duplicate_count(),
                "Semantic space repeats some words; lookups use the first occurrence"
            );
        }

        Ok(space)
    }
}

/// Parse every dimension of a row. `None` if any value is missing.
fn parse_values(
    record: &csv::ByteRecord,
    columns: &[usize],
    header: &[String],
    line: u64,
) -> Result<Option<Vec<f64>>, SpaceError> {
    let mut values = Vec::with_capacity(columns.len());
    for &col in columns {
        match parse_value(record, col, header, line)? {
            Some(v) => values.push(v),
            None => return Ok(None),
        }
    }
    Ok(Some(values))
}

fn parse_value(
    record: &csv::ByteRecord,
    col: usize,
    header: &[String],
    line: u64,
) -> Result<Option<f64>, SpaceError> {
    let raw = decode_field(record.get(col).unwrap_or_default());
    let trimmed = raw.trim();
    if is_missing(trimmed) {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| SpaceError::InvalidNumber {
            line,
            column: header[col].clone(),
            value: raw,
        })
}
