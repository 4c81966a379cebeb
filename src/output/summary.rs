// Run summary: a JSON record of what a `build` run read, wrote and dropped.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::pipeline::coverage::{GroupCoverage, OovToken};
use crate::pipeline::driver::{PipelineOutput, RowFailure};
use crate::pipeline::AlignmentPolicy;
use crate::space::{MeanWeighting, SemanticSpace};

/// How many out-of-vocabulary tokens to list per group.
const TOP_OOV: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: String,
    pub responses_path: String,
    pub space_path: String,
    pub space_words: usize,
    pub dimensions: usize,
    pub mean_weighting: MeanWeighting,
    pub policy: AlignmentPolicy,
    pub participants: usize,
    pub groups: Vec<GroupSummary>,
    pub failures: Vec<RowFailure>,
    pub aligned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub misalignment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub name: String,
    pub rows_written: usize,
    pub participants_with_text: usize,
    pub empty_word_lists: usize,
    pub words: usize,
    pub out_of_vocabulary: usize,
    pub vocabulary_rate: f64,
    pub top_out_of_vocabulary: Vec<OovToken>,
}

impl GroupSummary {
    fn new(name: &str, rows_written: usize, coverage: &GroupCoverage) -> Self {
        Self {
            name: name.to_string(),
            rows_written,
            participants_with_text: coverage.participants_with_text,
            empty_word_lists: coverage.empty_word_lists,
            words: coverage.words,
            out_of_vocabulary: coverage.out_of_vocabulary,
            vocabulary_rate: coverage.vocabulary_rate(),
            top_out_of_vocabulary: coverage.top_out_of_vocabulary(TOP_OOV),
        }
    }
}

impl RunSummary {
    pub fn new(
        output: &PipelineOutput,
        space: &SemanticSpace,
        policy: AlignmentPolicy,
        responses_path: &Path,
        space_path: &Path,
    ) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            responses_path: responses_path.display().to_string(),
            space_path: space_path.display().to_string(),
            space_words: space.len(),
            dimensions: space.dimensions(),
            mean_weighting: space.weighting(),
            policy,
            participants: output.participants,
            groups: vec![
                GroupSummary::new(
                    output.depression.group(),
                    output.depression.len(),
                    &output.depression_coverage,
                ),
                GroupSummary::new(
                    output.anxiety.group(),
                    output.anxiety.len(),
                    &output.anxiety_coverage,
                ),
            ],
            failures: output.failures.clone(),
            aligned: output.is_aligned(),
            misalignment: output.misalignment.clone(),
        }
    }

    /// Write the summary as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write run summary to {}", path.display()))
    }
}
