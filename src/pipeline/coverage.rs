// Vocabulary coverage: how much of what participants wrote the space knows.

use std::collections::HashMap;

use serde::Serialize;

use crate::responses::extract::GroupWords;

/// Running coverage counts for one topic group.
#[derive(Debug, Clone, Default)]
pub struct GroupCoverage {
    /// Participants with at least one text cell in the group.
    pub participants_with_text: usize,
    /// Participants whose word list came out empty.
    pub empty_word_lists: usize,
    /// Distinct in-vocabulary words summed over participants.
    pub words: usize,
    /// Distinct out-of-vocabulary tokens summed over participants.
    pub out_of_vocabulary: usize,
    /// Participants using each out-of-vocabulary token.
    oov_counts: HashMap<String, usize>,
}

/// An out-of-vocabulary token and how many participants used it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OovToken {
    pub token: String,
    pub participants: usize,
}

impl GroupCoverage {
    pub fn record(&mut self, words: &GroupWords) {
        if words.text_cells > 0 {
            self.participants_with_text += 1;
        }
        if words.words.is_empty() {
            self.empty_word_lists += 1;
        }
        self.words += words.words.len();
        self.out_of_vocabulary += words.out_of_vocabulary.len();
        for token in &words.out_of_vocabulary {
            *self.oov_counts.entry(token.clone()).or_insert(0) += 1;
        }
    }

    /// Share of distinct tokens that had a vector, 0.0 to 1.0.
    pub fn vocabulary_rate(&self) -> f64 {
        let total = self.words + self.out_of_vocabulary;
        if total == 0 {
            0.0
        } else {
            self.words as f64 / total as f64
        }
    }

    /// Most widely used out-of-vocabulary tokens, ties broken alphabetically.
    pub fn top_out_of_vocabulary(&self, n: usize) -> Vec<OovToken> {
        let mut tokens: Vec<OovToken> = self
            .oov_counts
            .iter()
            .map(|(token, &participants)| OovToken {
                token: token.clone(),
                participants,
            })
            .collect();
        tokens.sort_by(|a, b| {
            b.participants
                .cmp(&a.participants)
                .then_with(|| a.token.cmp(&b.token))
        });
        tokens.truncate(n);
        tokens
    }
}
