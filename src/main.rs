use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use respace::aggregate::centered::MeanCenteredAggregator;
use respace::config::{split_columns, Config};
use respace::output::summary::RunSummary;
use respace::output::terminal;
use respace::pipeline::driver::{self, PipelineContext, RunOptions};
use respace::pipeline::AlignmentPolicy;
use respace::responses::extract::{extract_words, TopicGroup};
use respace::responses::table::ResponseTable;
use respace::space::SemanticSpace;
use respace::text::cleaner::clean_text;

/// Respace: semantic vector representations of free-text survey responses.
///
/// Cleans each participant's free-text answers, looks every word up in a
/// precomputed semantic space, and aggregates the words into one
/// mean-centred vector per participant and topic group.
#[derive(Parser)]
#[command(name = "respace", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the per-participant response space tables
    Build {
        #[command(flatten)]
        inputs: InputArgs,

        /// Directory for the output tables and run summary
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// What to do when a topic group fails: drop-row, abort or per-group
        #[arg(long)]
        alignment: Option<AlignmentPolicy>,

        /// Comma-separated depression columns (overrides RESPACE_DEP_COLUMNS)
        #[arg(long)]
        dep_columns: Option<String>,

        /// Comma-separated anxiety columns (overrides RESPACE_ANX_COLUMNS)
        #[arg(long)]
        anx_columns: Option<String>,
    },

    /// Show how a piece of text is cleaned against the space
    Clean {
        /// The text to clean
        text: String,

        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Show the words extracted for one participant row
    Inspect {
        /// Row number in the responses file (0-based)
        row: usize,

        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Show semantic space statistics
    Space {
        #[command(flatten)]
        inputs: InputArgs,
    },
}

/// Input overrides shared by every subcommand.
#[derive(Args)]
struct InputArgs {
    /// Responses file (overrides RESPACE_RESPONSES)
    #[arg(long)]
    responses: Option<PathBuf>,

    /// Semantic space file (overrides RESPACE_SPACE)
    #[arg(long)]
    space: Option<PathBuf>,

    /// Frequency column to weight the space mean by
    #[arg(long)]
    frequency_column: Option<String>,

    /// Expected space dimensions (0 accepts any)
    #[arg(long)]
    dimensions: Option<usize>,
}

impl InputArgs {
    fn apply(self, config: &mut Config) {
        if let Some(path) = self.responses {
            config.responses_path = path;
        }
        if let Some(path) = self.space {
            config.space_path = path;
        }
        if let Some(column) = self.frequency_column {
            config.frequency_column = Some(column);
        }
        if let Some(dims) = self.dimensions {
            config.dimensions = (dims > 0).then_some(dims);
        }
    }
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("respace=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;

    match cli.command {
        Commands::Build {
            inputs,
            output_dir,
            alignment,
            dep_columns,
            anx_columns,
        } => {
            inputs.apply(&mut config);
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(policy) = alignment {
                config.policy = policy;
            }
            if let Some(raw) = dep_columns {
                config.groups.depression =
                    TopicGroup::new(config.groups.depression.name, split_columns(&raw));
            }
            if let Some(raw) = anx_columns {
                config.groups.anxiety =
                    TopicGroup::new(config.groups.anxiety.name, split_columns(&raw));
            }
            config.require_inputs()?;

            let space = load_space(&config)?;
            let responses = load_responses(&config)?;

            println!(
                "Aggregating {} participants over {} words...",
                responses.len(),
                space.len()
            );

            let ctx = PipelineContext {
                space: &space,
                responses: &responses,
                groups: &config.groups,
            };
            let aggregator = MeanCenteredAggregator::new(&space);
            let options = RunOptions {
                policy: config.policy,
                show_progress: true,
            };
            let output = driver::run(&ctx, &aggregator, &options)?;

            std::fs::create_dir_all(&config.output_dir).with_context(|| {
                format!("Failed to create {}", config.output_dir.display())
            })?;

            for table in [&output.depression, &output.anxiety] {
                let path = config
                    .output_dir
                    .join(format!("{}_space.csv", table.group()));
                table.write_csv(&path)?;
                info!(group = table.group(), path = %path.display(), "Wrote output table");
            }

            let summary = RunSummary::new(
                &output,
                &space,
                config.policy,
                &config.responses_path,
                &config.space_path,
            );
            let summary_path = config.output_dir.join("run_summary.json");
            summary.write(&summary_path)?;

            terminal::display_summary(&summary);
            println!(
                "\n{} {}",
                "Tables written to".bold(),
                config.output_dir.display()
            );
        }

        Commands::Clean { text, inputs } => {
            inputs.apply(&mut config);
            config.require_space()?;
            let space = load_space(&config)?;

            let cleaned = clean_text(&text, &space);
            terminal::display_cleaned(&text, &cleaned);
        }

        Commands::Inspect { row, inputs } => {
            inputs.apply(&mut config);
            config.require_inputs()?;
            let space = load_space(&config)?;
            let responses = load_responses(&config)?;
            config.groups.validate(&responses)?;

            let words = extract_words(&responses, row, &config.groups, &space)?;
            terminal::display_row_words(
                row,
                &words,
                &config.groups.depression.name,
                &config.groups.anxiety.name,
            );
        }

        Commands::Space { inputs } => {
            inputs.apply(&mut config);
            config.require_space()?;
            let space = load_space(&config)?;
            terminal::display_space(&space);
        }
    }

    Ok(())
}

fn load_space(config: &Config) -> Result<SemanticSpace> {
    println!("Loading semantic space from {}...", config.space_path.display());
    SemanticSpace::load(&config.space_path, &config.space_options())
        .with_context(|| format!("Failed to load {}", config.space_path.display()))
}

fn load_responses(config: &Config) -> Result<ResponseTable> {
    ResponseTable::load(&config.responses_path, &config.response_options())
        .with_context(|| format!("Failed to load {}", config.responses_path.display()))
}
