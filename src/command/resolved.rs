//! Output of the voice and gesture resolvers

use serde::{Deserialize, Serialize};

/// Modality a command was recognized from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Voice,
    Gesture,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Voice => write!(f, "voice"),
            Source::Gesture => write!(f, "gesture"),
        }
    }
}

/// One resolver result for one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCommand {
    pub source: Source,
    pub label: String,
    pub confidence: f64,
    /// Distance override parsed from the utterance, in meters
    pub modifier: Option<f64>,
}

impl ResolvedCommand {
    pub fn voice(label: impl Into<String>, confidence: f64, modifier: Option<f64>) -> Self {
        Self {
            source: Source::Voice,
            label: label.into(),
            confidence,
            modifier,
        }
    }

    pub fn gesture(label: impl Into<String>) -> Self {
        Self {
            source: Source::Gesture,
            label: label.into(),
            confidence: 1.0,
            modifier: None,
        }
    }
}

/// Failures inside a classifier backend
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier has no examples to match against")]
    EmptyIndex,

    #[error("expected {expected} features, got {actual}")]
    FeatureLength { expected: usize, actual: usize },

    #[error("classifier backend failed: {0}")]
    Backend(String),
}
