// Participant x dimension output table.
//
// One table per topic group. Every row carries the index of the response
// row it came from, so a dropped participant never silently shifts the rows
// below it.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

/// Header of the column that holds the source row index.
pub const PARTICIPANT_COLUMN: &str = "participant";

/// Aggregated vectors for one topic group, one row per participant.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSpaceTable {
    group: String,
    columns: Vec<String>,
    participants: Vec<usize>,
    rows: Vec<Vec<f64>>,
}

impl ResponseSpaceTable {
    /// An empty table whose columns are the semantic space's dimension labels.
    pub fn new(group: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            group: group.into(),
            columns,
            participants: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Append one participant's vector.
    pub fn push(&mut self, participant: usize, vector: Vec<f64>) {
        debug_assert_eq!(vector.len(), self.columns.len());
        self.participants.push(participant);
        self.rows.push(vector);
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Source row index of every output row, in output order.
    pub fn participants(&self) -> &[usize] {
        &self.participants
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// The vector stored for a source row, if that participant made it in.
    pub fn vector_for(&self, participant: usize) -> Option<&[f64]> {
        self.participants
            .iter()
            .position(|&p| p == participant)
            .map(|i| self.rows[i].as_slice())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the table as CSV: `participant` then one column per dimension.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        let header = std::iter::once(PARTICIPANT_COLUMN).chain(self.columns.iter().map(String::as_str));
        writer.write_record(header)?;

        for (participant, row) in self.participants.iter().zip(&self.rows) {
            let record = std::iter::once(participant.to_string())
                .chain(row.iter().map(|v| v.to_string()));
            writer.write_record(record)?;
        }

        writer
            .flush()
            .with_context(|| format!("Failed to write {}", path.display()))?;

        debug!(
            group = %self.group,
            rows = self.len(),
            path = %path.display(),
            "Wrote response space table"
        );

        Ok(())
    }
}
