// Row extraction: one participant row -> cleaned words per topic group.
//
// Each topic group names a fixed, ordered list of text columns. Words are
// unioned across the group's columns in column order, each word kept once
// at its first position.

use std::collections::HashSet;

use serde::Serialize;

use super::table::{ResponseRecord, ResponseTable};
use super::ResponseError;
use crate::space::SemanticSpace;
use crate::text::cleaner::clean_text;

/// A named set of response columns aggregated together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicGroup {
    pub name: String,
    pub columns: Vec<String>,
}

impl TopicGroup {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Depression-related free-text columns.
    pub fn depression() -> Self {
        Self::new(
            "depression",
            ["Deptext", "dep_all_phraces", "dep_all_words", "dep_all_selected1"]
                .map(String::from)
                .to_vec(),
        )
    }

    /// Anxiety (worry) related free-text columns.
    pub fn anxiety() -> Self {
        Self::new(
            "anxiety",
            ["Wortext", "wor_all_phraces", "wor_all_words", "wor_all_selected1"]
                .map(String::from)
                .to_vec(),
        )
    }
}

/// The two topic groups every participant is aggregated over.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicGroups {
    pub depression: TopicGroup,
    pub anxiety: TopicGroup,
}

impl Default for TopicGroups {
    fn default() -> Self {
        Self {
            depression: TopicGroup::depression(),
            anxiety: TopicGroup::anxiety(),
        }
    }
}

impl TopicGroups {
    /// Check that every configured column exists in the table.
    pub fn validate(&self, table: &ResponseTable) -> Result<(), ResponseError> {
        for group in [&self.depression, &self.anxiety] {
            for column in &group.columns {
                if !table.has_column(column) {
                    return Err(ResponseError::MissingColumn {
                        group: group.name.clone(),
                        column: column.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Words extracted for one participant and one topic group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupWords {
    /// Distinct in-vocabulary words, ordered by first appearance across columns.
    pub words: Vec<String>,
    /// Distinct out-of-vocabulary tokens, same ordering.
    pub out_of_vocabulary: Vec<String>,
    /// Columns that held text.
    pub text_cells: usize,
}

/// Both topic groups' words for one participant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowWords {
    pub depression: GroupWords,
    pub anxiety: GroupWords,
}

/// Extract and clean one topic group's columns from a record.
///
/// Non-text cells (missing or numeric) and absent columns are skipped.
pub fn extract_group(
    record: &ResponseRecord<'_>,
    group: &TopicGroup,
    space: &SemanticSpace,
) -> GroupWords {
    let mut out = GroupWords::default();
    let mut seen_words = HashSet::new();
    let mut seen_oov = HashSet::new();

    for column in &group.columns {
        let Some(text) = record.get(column).and_then(|cell| cell.as_text()) else {
            continue;
        };
        out.text_cells += 1;

        let cleaned = clean_text(text, space);
        for word in cleaned.words {
            if seen_words.insert(word.clone()) {
                out.words.push(word);
            }
        }
        for token in cleaned.out_of_vocabulary {
            if seen_oov.insert(token.clone()) {
                out.out_of_vocabulary.push(token);
            }
        }
    }

    out
}

/// Extract both topic groups for the participant at `row`.
pub fn extract_words(
    table: &ResponseTable,
    row: usize,
    groups: &TopicGroups,
    space: &SemanticSpace,
) -> Result<RowWords, ResponseError> {
    let record = table.record(row)?;
    Ok(extract_record(&record, groups, space))
}

/// Extract both topic groups from an already-borrowed record.
pub fn extract_record(
    record: &ResponseRecord<'_>,
    groups: &TopicGroups,
    space: &SemanticSpace,
) -> RowWords {
    RowWords {
        depression: extract_group(record, &groups.depression, space),
        anxiety: extract_group(record, &groups.anxiety, space),
    }
}
