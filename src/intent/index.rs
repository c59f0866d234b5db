//! Swappable phrase-matching backends
//!
//! The resolver only needs "best label and its score" for a piece of text.
//! Any backend that can be rebuilt from a `Vocabulary` can sit behind
//! `IntentIndex`, e.g. a sentence-embedding model.

use tracing::debug;

use crate::command::ClassifierError;

use super::vocabulary::Vocabulary;

/// Best-scoring label for a piece of text
#[derive(Debug, Clone, PartialEq)]
pub struct IntentMatch {
    pub label: String,
    /// Similarity in [0, 1]
    pub score: f64,
}

pub trait IntentIndex: Send {
    /// Re-index after the vocabulary changed
    fn rebuild(&mut self, vocabulary: &Vocabulary);

    /// Nearest labelled example for `text`
    fn best_match(&self, text: &str) -> Result<IntentMatch, ClassifierError>;
}

/// Character-level nearest-neighbour matcher
///
/// Scores each example phrase with the better of normalized Levenshtein
/// and Sørensen-Dice bigram similarity. Ties go to the earlier phrase.
#[derive(Debug, Default)]
pub struct SimilarityIndex {
    examples: Vec<(String, String)>,
}

impl SimilarityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn score(text: &str, phrase: &str) -> f64 {
        strsim::normalized_levenshtein(text, phrase).max(strsim::sorensen_dice(text, phrase))
    }
}

impl IntentIndex for SimilarityIndex {
    fn rebuild(&mut self, vocabulary: &Vocabulary) {
        self.examples = vocabulary
            .phrases()
            .map(|(label, phrase)| (label.to_string(), phrase.to_lowercase()))
            .collect();
        debug!(examples = self.examples.len(), "similarity index rebuilt");
    }

    fn best_match(&self, text: &str) -> Result<IntentMatch, ClassifierError> {
        let mut best: Option<(&str, f64)> = None;

        for (label, phrase) in &self.examples {
            let score = Self::score(text, phrase);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((label, score));
            }
        }

        best.map(|(label, score)| IntentMatch {
            label: label.to_string(),
            score,
        })
        .ok_or(ClassifierError::EmptyIndex)
    }
}
