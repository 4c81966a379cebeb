// Composition tests: the full pipeline from files to output tables.
//
// These tests exercise the data flow between modules:
//   SemanticSpace + ResponseTable -> extract -> aggregate -> ResponseSpaceTable
// including how aggregation failures affect row alignment between the two
// topic group tables.

use std::cell::Cell as StdCell;

use respace::aggregate::centered::MeanCenteredAggregator;
use respace::aggregate::traits::VectorAggregator;
use respace::aggregate::AggregateError;
use respace::output::summary::RunSummary;
use respace::pipeline::driver::{check_alignment, run, PipelineContext, RunOptions};
use respace::pipeline::{AlignmentPolicy, PipelineError};
use respace::responses::extract::{TopicGroup, TopicGroups};
use respace::responses::table::{ResponseOptions, ResponseTable};
use respace::space::{SemanticSpace, SpaceOptions};

const SPACE_CSV: &str = ",words,V1,V2,V3,V4\n\
0,sad,1.0,0.0,0.0,0.0\n\
1,happy,0.0,1.0,0.0,0.0\n\
2,worried,0.0,0.0,1.0,0.0\n\
3,calm,0.0,0.0,0.0,1.0\n\
4,flat,1.0,-1.0,0.0,0.0\n";

fn space() -> SemanticSpace {
    let options = SpaceOptions {
        expected_dimensions: Some(4),
        ..SpaceOptions::default()
    };
    SemanticSpace::from_reader(SPACE_CSV.as_bytes(), &options).unwrap()
}

fn groups() -> TopicGroups {
    TopicGroups {
        depression: TopicGroup::new("depression", vec!["Deptext".into(), "dep_all_words".into()]),
        anxiety: TopicGroup::new("anxiety", vec!["Wortext".into(), "wor_all_words".into()]),
    }
}

/// Eight participants; row 5's depression answer is the zero-sum word "flat".
fn responses() -> ResponseTable {
    let data = "idx;Deptext;dep_all_words;Wortext;wor_all_words\n\
                0;Sad, sad! happy;;worried;calm\n\
                1;;;;\n\
                2;happy;sad;calm;\n\
                3;I feel sad;sad;worried sick;worried\n\
                4;calm;;worried;\n\
                5;flat;;calm and worried;\n\
                6;happy happy;;;calm\n\
                7;sad;happy;worried;calm\n";
    ResponseTable::from_reader(data.as_bytes(), &ResponseOptions::default()).unwrap()
}

fn options(policy: AlignmentPolicy) -> RunOptions {
    RunOptions {
        policy,
        show_progress: false,
    }
}

fn assert_sums_to_one(v: &[f64]) {
    let sum: f64 = v.iter().sum();
    assert!((sum - 1.0).abs() < 1e-9, "vector sums to {sum}");
}

// ============================================================
// End-to-end scenarios
// ============================================================

#[test]
fn sad_happy_row_aggregates_to_normalized_mean_of_pair() {
    let space = space();
    let responses = responses();
    let groups = groups();
    let ctx = PipelineContext {
        space: &space,
        responses: &responses,
        groups: &groups,
    };
    let aggregator = MeanCenteredAggregator::new(&space);

    let output = run(&ctx, &aggregator, &options(AlignmentPolicy::DropRow)).unwrap();

    // Row 0: "Sad, sad! happy" -> [sad, happy]; centred sum + mean, normalized
    let v = output.depression.vector_for(0).unwrap();
    let raw = aggregator
        .centered_sum(&["sad".to_string(), "happy".to_string()])
        .unwrap();
    let total: f64 = raw.iter().sum();
    for (x, r) in v.iter().zip(&raw) {
        assert!((x - r / total).abs() < 1e-12);
    }
    assert_sums_to_one(v);
}

#[test]
fn all_missing_row_falls_back_to_space_mean() {
    let space = space();
    let responses = responses();
    let groups = groups();
    let ctx = PipelineContext {
        space: &space,
        responses: &responses,
        groups: &groups,
    };
    let aggregator = MeanCenteredAggregator::new(&space);

    let output = run(&ctx, &aggregator, &options(AlignmentPolicy::DropRow)).unwrap();

    let mean_sum: f64 = space.mean().iter().sum();
    for table in [&output.depression, &output.anxiety] {
        let v = table.vector_for(1).unwrap();
        for (x, m) in v.iter().zip(space.mean()) {
            assert!((x - m / mean_sum).abs() < 1e-12);
        }
    }
    assert_eq!(output.depression_coverage.empty_word_lists, 1);
}

#[test]
fn output_tables_use_space_columns_and_sum_to_one() {
    let space = space();
    let responses = responses();
    let groups = groups();
    let ctx = PipelineContext {
        space: &space,
        responses: &responses,
        groups: &groups,
    };
    let aggregator = MeanCenteredAggregator::new(&space);

    let output = run(&ctx, &aggregator, &options(AlignmentPolicy::DropRow)).unwrap();

    for table in [&output.depression, &output.anxiety] {
        assert_eq!(table.columns(), space.columns());
        for row in table.rows() {
            assert_sums_to_one(row);
        }
    }
}

// ============================================================
// Row alignment under partial failure
// ============================================================

#[test]
fn per_group_policy_desynchronizes_tables_and_is_flagged() {
    let space = space();
    let responses = responses();
    let groups = groups();
    let ctx = PipelineContext {
        space: &space,
        responses: &responses,
        groups: &groups,
    };
    let aggregator = MeanCenteredAggregator::new(&space);

    let output = run(&ctx, &aggregator, &options(AlignmentPolicy::PerGroup)).unwrap();

    // Row 5 failed for depression only
    assert_eq!(output.failures.len(), 1);
    assert_eq!(output.failures[0].row, 5);
    assert_eq!(output.failures[0].group, "depression");

    assert_eq!(output.depression.len(), 7);
    assert_eq!(output.anxiety.len(), 8);
    assert!(output.depression.vector_for(5).is_none());
    assert!(output.anxiety.vector_for(5).is_some());

    // Positional pairing would put row 6's depression next to row 5's anxiety
    assert_eq!(output.depression.participants()[5], 6);
    assert_eq!(output.anxiety.participants()[5], 5);

    assert!(!output.is_aligned());
    assert!(matches!(
        check_alignment(&output.depression, &output.anxiety),
        Err(PipelineError::Misaligned {
            position: 5,
            left_rows: 7,
            right_rows: 8,
            ..
        })
    ));
}

#[test]
fn drop_row_policy_keeps_tables_aligned() {
    let space = space();
    let responses = responses();
    let groups = groups();
    let ctx = PipelineContext {
        space: &space,
        responses: &responses,
        groups: &groups,
    };
    let aggregator = MeanCenteredAggregator::new(&space);

    let output = run(&ctx, &aggregator, &options(AlignmentPolicy::DropRow)).unwrap();

    assert_eq!(output.failures.len(), 1);
    assert_eq!(output.depression.len(), 7);
    assert_eq!(output.anxiety.len(), 7);
    assert_eq!(output.depression.participants(), &[0, 1, 2, 3, 4, 6, 7]);
    assert_eq!(output.depression.participants(), output.anxiety.participants());
    assert!(output.is_aligned());
}

#[test]
fn abort_policy_stops_at_first_failure() {
    let space = space();
    let responses = responses();
    let groups = groups();
    let ctx = PipelineContext {
        space: &space,
        responses: &responses,
        groups: &groups,
    };
    let aggregator = MeanCenteredAggregator::new(&space);

    let err = run(&ctx, &aggregator, &options(AlignmentPolicy::Abort)).unwrap_err();
    match err {
        PipelineError::RowFailed { row, group, source } => {
            assert_eq!(row, 5);
            assert_eq!(group, "depression");
            assert_eq!(source, AggregateError::ZeroSum);
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Fails on one chosen call, counting calls in row-major, group order.
struct FailOnCall {
    fail_at: usize,
    calls: StdCell<usize>,
    dims: usize,
}

impl VectorAggregator for FailOnCall {
    fn aggregate(&self, _words: &[String]) -> Result<Vec<f64>, AggregateError> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        if call == self.fail_at {
            Err(AggregateError::UnknownWord("injected".to_string()))
        } else {
            Ok(vec![1.0 / self.dims as f64; self.dims])
        }
    }
}

#[test]
fn injected_anxiety_failure_drops_only_anxiety_row_under_per_group() {
    let space = space();
    let responses = responses();
    let groups = groups();
    let ctx = PipelineContext {
        space: &space,
        responses: &responses,
        groups: &groups,
    };
    // Call 2 * 3 + 1 is row 3, anxiety
    let aggregator = FailOnCall {
        fail_at: 7,
        calls: StdCell::new(0),
        dims: space.dimensions(),
    };

    let output = run(&ctx, &aggregator, &options(AlignmentPolicy::PerGroup)).unwrap();

    assert_eq!(output.failures[0].row, 3);
    assert_eq!(output.failures[0].group, "anxiety");
    assert!(output.depression.vector_for(3).is_some());
    assert!(output.anxiety.vector_for(3).is_none());
    assert!(!output.is_aligned());
}

#[test]
fn missing_group_column_fails_before_processing() {
    let space = space();
    let responses = responses();
    let groups = TopicGroups {
        depression: TopicGroup::new("depression", vec!["Deptext".into(), "nope".into()]),
        anxiety: TopicGroup::new("anxiety", vec!["Wortext".into()]),
    };
    let ctx = PipelineContext {
        space: &space,
        responses: &responses,
        groups: &groups,
    };
    let aggregator = MeanCenteredAggregator::new(&space);

    let err = run(&ctx, &aggregator, &options(AlignmentPolicy::DropRow)).unwrap_err();
    assert!(matches!(err, PipelineError::Response(_)));
}

// ============================================================
// Files out
// ============================================================

#[test]
fn tables_and_summary_written_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let space = space();
    let responses = responses();
    let groups = groups();
    let ctx = PipelineContext {
        space: &space,
        responses: &responses,
        groups: &groups,
    };
    let aggregator = MeanCenteredAggregator::new(&space);
    let output = run(&ctx, &aggregator, &options(AlignmentPolicy::PerGroup)).unwrap();

    let table_path = dir.path().join("depression_space.csv");
    output.depression.write_csv(&table_path).unwrap();
    let written = std::fs::read_to_string(&table_path).unwrap();
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("participant,V1,V2,V3,V4"));
    assert_eq!(lines.count(), 7);

    let summary = RunSummary::new(
        &output,
        &space,
        AlignmentPolicy::PerGroup,
        std::path::Path::new("responses.csv"),
        std::path::Path::new("space.csv"),
    );
    let summary_path = dir.path().join("run_summary.json");
    summary.write(&summary_path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(json["participants"], 8);
    assert_eq!(json["policy"], "per-group");
    assert_eq!(json["aligned"], false);
    assert_eq!(json["groups"][0]["rows_written"], 7);
    assert_eq!(json["groups"][1]["rows_written"], 8);
    assert_eq!(json["failures"][0]["row"], 5);
    assert_eq!(json["mean_weighting"], "uniform");
}
