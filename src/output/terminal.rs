// Colored terminal output for run summaries, cleaned text and the space.
//
// main.rs delegates all display formatting here.

use colored::Colorize;

use super::summary::RunSummary;
use crate::responses::extract::{GroupWords, RowWords};
use crate::space::SemanticSpace;
use crate::text::cleaner::CleanedText;

/// Display the outcome of a `build` run.
pub fn display_summary(summary: &RunSummary) {
    println!(
        "\n{}",
        format!(
            "=== Response Space ({} participants, {} dimensions) ===",
            summary.participants, summary.dimensions
        )
        .bold()
    );
    println!();

    for group in &summary.groups {
        let rate = format!("{:.1}%", group.vocabulary_rate * 100.0);
        let colored_rate = if group.vocabulary_rate >= 0.9 {
            rate.bright_green()
        } else if group.vocabulary_rate >= 0.7 {
            rate.bright_yellow()
        } else {
            rate.bright_red()
        };

        println!(
            "  {:<12} {:>6} rows   {:>7} words   {} in vocabulary",
            group.name.bold(),
            group.rows_written,
            group.words,
            colored_rate,
        );

        if group.empty_word_lists > 0 {
            println!(
                "  {:<12} {} participants fell back to the space mean",
                "",
                group.empty_word_lists.to_string().yellow()
            );
        }

        if !group.top_out_of_vocabulary.is_empty() {
            let tokens: Vec<String> = group
                .top_out_of_vocabulary
                .iter()
                .take(8)
                .map(|t| format!("{} ({})", t.token, t.participants))
                .collect();
            println!("  {:<12} Unknown: {}", "", tokens.join(", ").dimmed());
        }
    }

    println!();

    if summary.failures.is_empty() {
        println!("  {}", "No aggregation failures.".dimmed());
    } else {
        println!(
            "  {} {} aggregation failures (policy: {})",
            "!".bright_red(),
            summary.failures.len(),
            summary.policy
        );
        for failure in summary.failures.iter().take(10) {
            println!(
                "    row {:>5}  {:<12} {}",
                failure.row,
                failure.group,
                failure.reason.dimmed()
            );
        }
        if summary.failures.len() > 10 {
            println!("    ... and {} more", summary.failures.len() - 10);
        }
    }

    if let Some(reason) = &summary.misalignment {
        println!("  {} {}", "!!".red().bold(), reason.red());
    }
}

/// Display the cleaned form of one piece of text.
pub fn display_cleaned(text: &str, cleaned: &CleanedText) {
    println!("\n{}", "=== Cleaned Text ===".bold());
    println!("  Input:   {}", text.dimmed());
    println!("  Words:   {}", join_or_none(&cleaned.words).bright_green());
    println!(
        "  Unknown: {}",
        join_or_none(&cleaned.out_of_vocabulary).yellow()
    );
}

/// Display both topic groups' words for one participant.
pub fn display_row_words(row: usize, words: &RowWords, depression: &str, anxiety: &str) {
    println!("\n{}", format!("=== Participant row {row} ===").bold());
    display_group(depression, &words.depression);
    display_group(anxiety, &words.anxiety);
}

fn display_group(name: &str, words: &GroupWords) {
    println!();
    println!(
        "  {} ({} text cells, {} words)",
        name.bold(),
        words.text_cells,
        words.words.len()
    );
    println!("    Words:   {}", join_or_none(&words.words).bright_green());
    println!(
        "    Unknown: {}",
        join_or_none(&words.out_of_vocabulary).yellow()
    );
    if words.words.is_empty() {
        println!("    {}", "Empty word list: aggregates to the space mean".dimmed());
    }
}

/// Display semantic space statistics.
pub fn display_space(space: &SemanticSpace) {
    let mean_sum: f64 = space.mean().iter().sum();

    println!("\n{}", "=== Semantic Space ===".bold());
    println!("  Words:          {}", space.len());
    println!("  Rows:           {}", space.row_count());
    if space.duplicate_count() > 0 {
        println!(
            "  Duplicates:     {}",
            space.duplicate_count().to_string().yellow()
        );
    }
    if space.unindexed_count() > 0 {
        println!("  Without word:   {}", space.unindexed_count());
    }
    if space.undecodable_count() > 0 {
        println!(
            "  Not UTF-8:      {}",
            space.undecodable_count().to_string().yellow()
        );
    }
    println!("  Dimensions:     {}", space.dimensions());
    println!("  Mean weighting: {:?}", space.weighting());
    println!("  Mean sum:       {mean_sum:.6}");
    if mean_sum == 0.0 {
        println!(
            "  {} mean components sum to zero; empty word lists cannot be normalized",
            "!".bright_red()
        );
    }
}

fn join_or_none(words: &[String]) -> String {
    if words.is_empty() {
        "(none)".to_string()
    } else {
        words.join(", ")
    }
}
