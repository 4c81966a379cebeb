// Participant responses: the tabular input and per-row word extraction.

pub mod extract;
pub mod table;

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading responses or resolving topic group columns.
#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("failed to read responses {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed responses file: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line} has {found} fields, header has {expected}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("column {column:?} for topic group {group:?} not found in responses header")]
    MissingColumn { group: String, column: String },

    #[error("row {row} out of range ({rows} rows)")]
    RowOutOfRange { row: usize, rows: usize },
}
