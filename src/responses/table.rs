// In-memory response table.
//
// Cells are typed the way pandas would type them on read: NA markers become
// `Missing`, and a column whose every present value is numeric becomes a
// numeric column. Only `Text` cells are ever cleaned.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{info, warn};

use super::ResponseError;
use crate::tabular::{decode_field_checked, decode_header, is_missing};

/// One cell of the response table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Missing,
}

impl Cell {
    /// The cell's text, if it is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// How to read a responses file.
#[derive(Debug, Clone)]
pub struct ResponseOptions {
    pub delimiter: u8,
    /// Leading columns to drop (the exported index column).
    pub skip_columns: usize,
}

impl Default for ResponseOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            skip_columns: 1,
        }
    }
}

/// All participant rows, read-only once loaded.
#[derive(Debug, Clone)]
pub struct ResponseTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// A borrowed view of one participant's row.
#[derive(Debug, Clone, Copy)]
pub struct ResponseRecord<'a> {
    index: usize,
    columns: &'a [String],
    cells: &'a [Cell],
}

impl<'a> ResponseRecord<'a> {
    /// Position of this row in the table (0-based).
    pub fn index(&self) -> usize {
        self.index
    }

    /// The cell under a column name. `None` if the column doesn't exist.
    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.cells.get(i))
    }
}

impl ResponseTable {
    /// Build a table from already-typed cells. Short rows are padded with
    /// `Missing`.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Missing);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Load a responses file from disk.
    pub fn load(path: &Path, options: &ResponseOptions) -> Result<Self, ResponseError> {
        let file = File::open(path).map_err(|source| ResponseError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let table = Self::from_reader(file, options)?;

        info!(
            path = %path.display(),
            participants = table.len(),
            columns = table.columns.len(),
            "Loaded responses"
        );

        Ok(table)
    }

    /// Parse responses from any reader.
    pub fn from_reader<R: Read>(reader: R, options: &ResponseOptions) -> Result<Self, ResponseError> {
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header: Vec<String> = csv.byte_headers()?.iter().map(decode_header).collect();
        let width = header.len();

        // First pass: raw strings, `None` for NA markers.
        let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
        let mut undecodable = 0usize;
        for record in csv.byte_records() {
            let record = record?;
            if record.len() > width {
                return Err(ResponseError::RaggedRow {
                    line: record.position().map(|p| p.line()).unwrap_or(0),
                    expected: width,
                    found: record.len(),
                });
            }

            let mut row: Vec<Option<String>> = record
                .iter()
                .map(|field| {
                    let (value, replaced) = decode_field_checked(field);
                    if replaced {
                        undecodable += 1;
                    }
                    (!is_missing(&value)).then_some(value)
                })
                .collect();
            row.resize(width, None);
            raw_rows.push(row);
        }

        if undecodable > 0 {
            warn!(
                cells = undecodable,
                "Response cells are not valid UTF-8; invalid bytes were replaced"
            );
        }

        // Second pass: a column is numeric if every present value parses.
        let numeric: Vec<bool> = (0..width)
            .map(|col| {
                raw_rows
                    .iter()
                    .filter_map(|row| row[col].as_deref())
                    .all(|v| v.trim().parse::<f64>().is_ok())
            })
            .collect();

        let skip = options.skip_columns.min(width);
        let columns = header[skip..].to_vec();
        let rows = raw_rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .enumerate()
                    .skip(skip)
                    .map(|(col, value)| match value {
                        None => Cell::Missing,
                        Some(v) if numeric[col] => v
                            .trim()
                            .parse::<f64>()
                            .map(Cell::Number)
                            .unwrap_or(Cell::Missing),
                        Some(v) => Cell::Text(v),
                    })
                    .collect()
            })
            .collect();

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Number of participant rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Borrow one row by position.
    pub fn record(&self, index: usize) -> Result<ResponseRecord<'_>, ResponseError> {
        let cells = self.rows.get(index).ok_or(ResponseError::RowOutOfRange {
            row: index,
            rows: self.rows.len(),
        })?;
        Ok(ResponseRecord {
            index,
            columns: &self.columns,
            cells,
        })
    }

    /// Iterate all rows in order.
    pub fn records(&self) -> impl Iterator<Item = ResponseRecord<'_>> {
        self.rows
            .iter()
            .enumerate()
            .map(move |(index, cells)| ResponseRecord {
                index,
                columns: &self.columns,
                cells,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(data: &str) -> ResponseTable {
        ResponseTable::from_reader(data.as_bytes(), &ResponseOptions::default()).unwrap()
    }

    #[test]
    fn test_first_column_dropped() {
        let table = load(";Deptext;age\n0;I feel low;34\n1;;51\n");
        assert_eq!(table.columns(), &["Deptext".to_string(), "age".to_string()]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_cell_typing() {
        let table = load(";Deptext;age\n0;I feel low;34\n1;NA;\n");
        let first = table.record(0).unwrap();
        let second = table.record(1).unwrap();

        assert_eq!(first.get("Deptext"), Some(&Cell::Text("I feel low".to_string())));
        assert_eq!(first.get("age"), Some(&Cell::Number(34.0)));
        assert_eq!(second.get("Deptext"), Some(&Cell::Missing));
        assert_eq!(second.get("age"), Some(&Cell::Missing));
    }

    #[test]
    fn test_numeric_looking_text_in_text_column_stays_text() {
        let table = load(";Deptext\n0;42\n1;sad\n");
        assert_eq!(
            table.record(0).unwrap().get("Deptext"),
            Some(&Cell::Text("42".to_string()))
        );
    }

    #[test]
    fn test_all_numeric_column_is_not_text() {
        let table = load(";Deptext\n0;1\n1;2.5\n");
        let cell = table.record(1).unwrap().get("Deptext").unwrap();
        assert!(cell.as_text().is_none());
    }

    #[test]
    fn test_short_rows_padded_with_missing() {
        let table = load(";Deptext;Wortext\n0;sad\n");
        assert_eq!(table.record(0).unwrap().get("Wortext"), Some(&Cell::Missing));
    }

    #[test]
    fn test_long_rows_rejected() {
        let err = ResponseTable::from_reader(
            ";Deptext\n0;sad;extra\n".as_bytes(),
            &ResponseOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ResponseError::RaggedRow {
                expected: 2,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_record_out_of_range() {
        let table = load(";Deptext\n0;sad\n");
        assert!(matches!(
            table.record(3),
            Err(ResponseError::RowOutOfRange { row: 3, rows: 1 })
        ));
    }

    #[test]
    fn test_unknown_column_is_none() {
        let table = load(";Deptext\n0;sad\n");
        assert!(table.record(0).unwrap().get("nope").is_none());
    }
}
