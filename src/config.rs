use std::env;
use std::path::PathBuf;

use anyhow::Result;

use crate::pipeline::AlignmentPolicy;
use crate::responses::extract::{TopicGroup, TopicGroups};
use crate::responses::table::ResponseOptions;
use crate::space::loader::DEFAULT_DIMENSIONS;
use crate::space::SpaceOptions;
use crate::tabular::parse_delimiter;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every value
/// has a default; CLI flags override individual fields after loading.
#[derive(Debug, Clone)]
pub struct Config {
    /// Participant responses (semicolon-delimited by default).
    pub responses_path: PathBuf,
    /// Semantic space table.
    pub space_path: PathBuf,
    /// Where `build` writes its tables and summary.
    pub output_dir: PathBuf,
    pub response_delimiter: u8,
    pub space_delimiter: u8,
    pub word_column: String,
    /// Optional frequency column for a weighted space mean.
    pub frequency_column: Option<String>,
    /// Expected space dimensionality. `None` accepts any.
    pub dimensions: Option<usize>,
    pub groups: TopicGroups,
    pub policy: AlignmentPolicy,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let response_delimiter = delimiter_var("RESPACE_RESPONSE_DELIMITER", b';')?;
        let space_delimiter = delimiter_var("RESPACE_SPACE_DELIMITER", b',')?;

        let dimensions = match env::var("RESPACE_DIMENSIONS") {
            Ok(raw) => {
                let n: usize = raw
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("RESPACE_DIMENSIONS must be a number, got {raw:?}"))?;
                // 0 disables the check
                (n > 0).then_some(n)
            }
            Err(_) => Some(DEFAULT_DIMENSIONS),
        };

        let policy = match env::var("RESPACE_ALIGNMENT") {
            Ok(raw) => raw.parse().map_err(|e: String| anyhow::anyhow!(e))?,
            Err(_) => AlignmentPolicy::default(),
        };

        let defaults = TopicGroups::default();
        let groups = TopicGroups {
            depression: group_var("RESPACE_DEP_COLUMNS", defaults.depression),
            anxiety: group_var("RESPACE_ANX_COLUMNS", defaults.anxiety),
        };

        Ok(Self {
            responses_path: env::var("RESPACE_RESPONSES")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data/responses.csv")),
            space_path: env::var("RESPACE_SPACE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data/space.csv")),
            output_dir: env::var("RESPACE_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./output")),
            response_delimiter,
            space_delimiter,
            word_column: env::var("RESPACE_WORD_COLUMN").unwrap_or_else(|_| "words".to_string()),
            frequency_column: env::var("RESPACE_FREQUENCY_COLUMN")
                .ok()
                .filter(|c| !c.is_empty()),
            dimensions,
            groups,
            policy,
        })
    }

    /// Check that the semantic space file exists.
    pub fn require_space(&self) -> Result<()> {
        if !self.space_path.exists() {
            anyhow::bail!(
                "Semantic space not found: {}\n\
                 Set RESPACE_SPACE in your .env file or pass --space.",
                self.space_path.display()
            );
        }
        Ok(())
    }

    /// Check that both input files exist.
    pub fn require_inputs(&self) -> Result<()> {
        self.require_space()?;
        if !self.responses_path.exists() {
            anyhow::bail!(
                "Responses file not found: {}\n\
                 Set RESPACE_RESPONSES in your .env file or pass --responses.",
                self.responses_path.display()
            );
        }
        Ok(())
    }

    pub fn space_options(&self) -> SpaceOptions {
        SpaceOptions {
            delimiter: self.space_delimiter,
            word_column: self.word_column.clone(),
            frequency_column: self.frequency_column.clone(),
            expected_dimensions: self.dimensions,
            ..SpaceOptions::default()
        }
    }

    pub fn response_options(&self) -> ResponseOptions {
        ResponseOptions {
            delimiter: self.response_delimiter,
            ..ResponseOptions::default()
        }
    }
}

fn delimiter_var(name: &str, default: u8) -> Result<u8> {
    match env::var(name) {
        Ok(raw) => parse_delimiter(&raw)
            .ok_or_else(|| anyhow::anyhow!("{name} must be a single character, got {raw:?}")),
        Err(_) => Ok(default),
    }
}

/// Override a group's columns from a comma-separated env var.
fn group_var(name: &str, default: TopicGroup) -> TopicGroup {
    match env::var(name) {
        Ok(raw) => {
            let columns = split_columns(&raw);
            if columns.is_empty() {
                default
            } else {
                TopicGroup::new(default.name, columns)
            }
        }
        Err(_) => default,
    }
}

/// Split a comma-separated column list, dropping blanks.
pub fn split_columns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_columns() {
        assert_eq!(
            split_columns(" Deptext, dep_all_words ,,"),
            vec!["Deptext".to_string(), "dep_all_words".to_string()]
        );
        assert!(split_columns("").is_empty());
    }
}
