// Response text cleaner.
//
// Lowercases, strips everything that is neither a word character nor
// whitespace, splits on whitespace and keeps each distinct token once.
// Tokens the semantic space has no vector for are set aside rather than
// treated as an error.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::space::SemanticSpace;

/// Anything that is not a (Unicode) word character or whitespace.
///
/// Combining marks are stripped as well, even though the regex crate counts
/// them as word characters.
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]|\p{M}").expect("punctuation pattern is valid"));

/// The result of cleaning one text field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedText {
    /// Distinct in-vocabulary words, in order of first appearance.
    pub words: Vec<String>,
    /// Distinct tokens with no vector in the space, in order of first appearance.
    pub out_of_vocabulary: Vec<String>,
}

/// Lowercase, strip punctuation and split into distinct tokens.
///
/// Tokens keep their first-seen order. Underscores and digits count as word
/// characters and survive.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let stripped = PUNCTUATION.replace_all(&lowered, "");

    let mut seen = HashSet::new();
    stripped
        .split_whitespace()
        .filter(|token| seen.insert(*token))
        .map(str::to_string)
        .collect()
}

/// Clean a text field against the semantic space vocabulary.
pub fn clean_text(text: &str, space: &SemanticSpace) -> CleanedText {
    let (words, out_of_vocabulary): (Vec<String>, Vec<String>) = tokenize(text)
        .into_iter()
        .partition(|token| space.contains(token));

    CleanedText {
        words,
        out_of_vocabulary,
    }
}
