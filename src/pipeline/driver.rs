// Pipeline driver.
//
// Walks the response rows in order. For each participant it extracts both
// topic groups' words, aggregates each group into a vector, and appends the
// vectors to that group's output table. Failures are collected per row and
// group; the alignment policy decides what they do to the tables.

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};

use super::coverage::GroupCoverage;
use super::{AlignmentPolicy, PipelineError};
use crate::aggregate::traits::VectorAggregator;
use crate::output::table::ResponseSpaceTable;
use crate::responses::extract::{extract_record, TopicGroups};
use crate::responses::table::ResponseTable;
use crate::space::SemanticSpace;

/// Everything the pipeline reads. Built once, shared by reference.
#[derive(Debug, Clone, Copy)]
pub struct PipelineContext<'a> {
    pub space: &'a SemanticSpace,
    pub responses: &'a ResponseTable,
    pub groups: &'a TopicGroups,
}

/// Knobs for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub policy: AlignmentPolicy,
    pub show_progress: bool,
}

/// A participant/topic group pair that could not be aggregated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowFailure {
    pub row: usize,
    pub group: String,
    pub reason: String,
}

/// The result of a pipeline run.
#[derive(Debug)]
pub struct PipelineOutput {
    pub depression: ResponseSpaceTable,
    pub anxiety: ResponseSpaceTable,
    pub depression_coverage: GroupCoverage,
    pub anxiety_coverage: GroupCoverage,
    pub failures: Vec<RowFailure>,
    /// Response rows processed.
    pub participants: usize,
    /// `None` if both tables hold the same participants in the same order.
    pub misalignment: Option<String>,
}

impl PipelineOutput {
    pub fn is_aligned(&self) -> bool {
        self.misalignment.is_none()
    }
}

/// Run the pipeline over every response row.
pub fn run(
    ctx: &PipelineContext<'_>,
    aggregator: &dyn VectorAggregator,
    options: &RunOptions,
) -> Result<PipelineOutput, PipelineError> {
    ctx.groups.validate(ctx.responses)?;

    let columns = ctx.space.columns().to_vec();
    let mut depression = ResponseSpaceTable::new(&ctx.groups.depression.name, columns.clone());
    let mut anxiety = ResponseSpaceTable::new(&ctx.groups.anxiety.name, columns);
    let mut depression_coverage = GroupCoverage::default();
    let mut anxiety_coverage = GroupCoverage::default();
    let mut failures = Vec::new();

    let pb = if options.show_progress {
        let pb = ProgressBar::new(ctx.responses.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  Participants [{bar:30}] {pos}/{len} ({eta})")
                .unwrap(),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    for record in ctx.responses.records() {
        let row = record.index();
        let words = extract_record(&record, ctx.groups, ctx.space);
        depression_coverage.record(&words.depression);
        anxiety_coverage.record(&words.anxiety);

        let results = [
            (&ctx.groups.depression.name, aggregator.aggregate(&words.depression.words)),
            (&ctx.groups.anxiety.name, aggregator.aggregate(&words.anxiety.words)),
        ];

        for (group, result) in &results {
            if let Err(e) = result {
                warn!(row, group = %group, error = %e, "Failed to aggregate participant words");
                if options.policy == AlignmentPolicy::Abort {
                    pb.finish_and_clear();
                    return Err(PipelineError::RowFailed {
                        row,
                        group: group.to_string(),
                        source: e.clone(),
                    });
                }
                failures.push(RowFailure {
                    row,
                    group: group.to_string(),
                    reason: e.to_string(),
                });
            }
        }

        let [(_, dep), (_, anx)] = results;
        match (dep, anx, options.policy) {
            (Ok(dep), Ok(anx), _) => {
                depression.push(row, dep);
                anxiety.push(row, anx);
            }
            (Ok(dep), Err(_), AlignmentPolicy::PerGroup) => depression.push(row, dep),
            (Err(_), Ok(anx), AlignmentPolicy::PerGroup) => anxiety.push(row, anx),
            _ => {}
        }

        pb.inc(1);
    }
    pb.finish_and_clear();

    let misalignment = match check_alignment(&depression, &anxiety) {
        Ok(()) => None,
        Err(e) => {
            warn!(error = %e, "Output tables are not row-aligned");
            Some(e.to_string())
        }
    };

    info!(
        participants = ctx.responses.len(),
        depression_rows = depression.len(),
        anxiety_rows = anxiety.len(),
        failures = failures.len(),
        "Pipeline run complete"
    );

    Ok(PipelineOutput {
        depression,
        anxiety,
        depression_coverage,
        anxiety_coverage,
        failures,
        participants: ctx.responses.len(),
        misalignment,
    })
}

/// Check that two output tables hold the same participants in the same order.
pub fn check_alignment(
    left: &ResponseSpaceTable,
    right: &ResponseSpaceTable,
) -> Result<(), PipelineError> {
    let (a, b) = (left.participants(), right.participants());
    let position = a.iter().zip(b).position(|(x, y)| x != y);

    match position {
        None if a.len() == b.len() => Ok(()),
        position => Err(PipelineError::Misaligned {
            left: left.group().to_string(),
            right: right.group().to_string(),
            left_rows: a.len(),
            right_rows: b.len(),
            position: position.unwrap_or(a.len().min(b.len())),
        }),
    }
}
