//! Utterance to intent resolution
//!
//! Order of evaluation for one utterance:
//! 1. Keyword override for unambiguous direction words
//! 2. Similarity match against the vocabulary, gated by the threshold
//!
//! A distance modifier is extracted independently of the label.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::command::ResolvedCommand;

use super::index::{IntentIndex, SimilarityIndex};
use super::vocabulary::Vocabulary;

/// Threshold used by the trick-capable resolver
pub const DEFAULT_THRESHOLD: f64 = 0.50;

/// Words matched lexically before the similarity backend is trusted,
/// checked in this order
pub const OVERRIDE_KEYWORDS: [&str; 8] =
    ["forward", "back", "left", "right", "up", "down", "spin", "shake"];

const NUMBER_WORDS: [(&str, f64); 13] = [
    ("zero", 0.0),
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("seven", 7.0),
    ("eight", 8.0),
    ("nine", 9.0),
    ("ten", 10.0),
    ("half", 0.5),
    ("quarter", 0.25),
];

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b(\d+(?:\.\d+)?)\b").expect("valid number pattern"))
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}

/// First keyword, in list order, contained anywhere in `text`. Inflected
/// forms such as "upward" or "spinning" still match.
pub fn keyword_override(text: &str) -> Option<&'static str> {
    OVERRIDE_KEYWORDS.iter().copied().find(|kw| text.contains(kw))
}

/// Distance modifier from a digit literal or a number word
pub fn extract_modifier(text: &str) -> Option<f64> {
    if let Some(found) = number_pattern().captures(text).and_then(|c| c.get(1)) {
        if let Ok(value) = found.as_str().parse::<f64>() {
            return Some(value);
        }
    }

    let lowered = text.to_lowercase();
    NUMBER_WORDS
        .iter()
        .find(|(word, _)| words(&lowered).any(|w| w == *word))
        .map(|(_, value)| *value)
}

pub struct IntentResolver {
    vocabulary: Vocabulary,
    index: Box<dyn IntentIndex>,
    threshold: f64,
}

impl IntentResolver {
    pub fn new(mut index: Box<dyn IntentIndex>, vocabulary: Vocabulary, threshold: f64) -> Self {
        index.rebuild(&vocabulary);
        Self {
            vocabulary,
            index,
            threshold,
        }
    }

    /// Built-in vocabulary over the similarity backend
    pub fn with_threshold(threshold: f64) -> Self {
        Self::new(
            Box::new(SimilarityIndex::new()),
            Vocabulary::builtin(),
            threshold,
        )
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Add a label with example phrases and re-index
    pub fn register<I, S>(&mut self, label: &str, phrases: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let added = self.vocabulary.insert(label, phrases);
        self.index.rebuild(&self.vocabulary);
        debug!(%label, added, "vocabulary updated");
    }

    /// Resolve an utterance into an intent, if one is recognized
    pub fn resolve(&self, utterance: &str) -> Option<ResolvedCommand> {
        let text = utterance.trim().to_lowercase();
        if text.is_empty() {
            return None;
        }
        let modifier = extract_modifier(&text);

        if let Some(keyword) = keyword_override(&text) {
            debug!(%keyword, "keyword override");
            return Some(ResolvedCommand::voice(keyword, 1.0, modifier));
        }

        let found = match self.index.best_match(&text) {
            Ok(found) => found,
            Err(e) => {
                warn!(?e, "intent classification failed");
                return None;
            }
        };

        debug!(label = %found.label, score = found.score, "intent match");
        if found.score > self.threshold {
            Some(ResolvedCommand::voice(found.label, found.score, modifier))
        } else {
            debug!(score = found.score, threshold = self.threshold, "low confidence intent");
            None
        }
    }
}
