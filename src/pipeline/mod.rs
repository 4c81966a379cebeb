// Pipeline driver: every participant row -> two aligned output tables.

pub mod coverage;
pub mod driver;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::aggregate::AggregateError;
use crate::responses::ResponseError;

/// What to do when one topic group of a row fails to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignmentPolicy {
    /// Drop the whole row from both tables. Tables stay aligned.
    #[default]
    DropRow,
    /// Stop at the first failure.
    Abort,
    /// Drop the row only from the failing group's table. Tables may end up
    /// with different participants; the run reports the misalignment.
    PerGroup,
}

impl FromStr for AlignmentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drop-row" => Ok(Self::DropRow),
            "abort" => Ok(Self::Abort),
            "per-group" => Ok(Self::PerGroup),
            other => Err(format!(
                "unknown alignment policy {other:?} (expected drop-row, abort or per-group)"
            )),
        }
    }
}

impl fmt::Display for AlignmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DropRow => "drop-row",
            Self::Abort => "abort",
            Self::PerGroup => "per-group",
        })
    }
}

/// Errors that stop a pipeline run or flag its output.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error("row {row} ({group}): {source}")]
    RowFailed {
        row: usize,
        group: String,
        #[source]
        source: AggregateError,
    },

    #[error(
        "tables {left:?} ({left_rows} rows) and {right:?} ({right_rows} rows) \
         diverge at output row {position}"
    )]
    Misaligned {
        left: String,
        right: String,
        left_rows: usize,
        right_rows: usize,
        position: usize,
    },
}
