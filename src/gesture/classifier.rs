//! Gesture classifier backends

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::command::ClassifierError;

use super::features::FEATURE_LEN;

/// Closed-set gesture classifier over complete feature vectors
pub trait GestureClassifier: Send {
    fn classify(&self, features: &[f64; FEATURE_LEN]) -> Result<String, ClassifierError>;
}

/// One labelled recording
#[derive(Debug, Clone, Deserialize)]
pub struct GestureSample {
    pub label: String,
    pub features: Vec<f64>,
}

/// Majority vote among the k closest samples by Euclidean distance
#[derive(Debug)]
pub struct NearestNeighborClassifier {
    samples: Vec<GestureSample>,
    k: usize,
}

impl NearestNeighborClassifier {
    pub const DEFAULT_K: usize = 5;

    pub fn new(samples: Vec<GestureSample>, k: usize) -> Result<Self, ClassifierError> {
        if let Some(bad) = samples.iter().find(|s| s.features.len() != FEATURE_LEN) {
            return Err(ClassifierError::FeatureLength {
                expected: FEATURE_LEN,
                actual: bad.features.len(),
            });
        }
        Ok(Self {
            samples,
            k: k.max(1),
        })
    }

    /// Classifier with no samples; every prediction fails with
    /// `EmptyIndex`
    pub fn empty(k: usize) -> Self {
        Self {
            samples: Vec::new(),
            k: k.max(1),
        }
    }

    /// Load samples from a JSON array of `{label, features}` objects
    pub fn load(path: &Path, k: usize) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read gesture samples {}", path.display()))?;
        let samples: Vec<GestureSample> =
            serde_json::from_slice(&bytes).context("failed to parse gesture samples")?;
        let classifier = Self::new(samples, k)?;

        info!(?path, samples = classifier.samples.len(), k, "gesture classifier loaded");
        Ok(classifier)
    }

    fn distance(a: &[f64], b: &[f64]) -> f64 {
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

impl GestureClassifier for NearestNeighborClassifier {
    fn classify(&self, features: &[f64; FEATURE_LEN]) -> Result<String, ClassifierError> {
        if self.samples.is_empty() {
            return Err(ClassifierError::EmptyIndex);
        }

        let mut ranked: Vec<(f64, &str)> = self
            .samples
            .iter()
            .map(|s| (Self::distance(features, &s.features), s.label.as_str()))
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
        ranked.truncate(self.k);

        let mut votes: HashMap<&str, usize> = HashMap::new();
        for (_, label) in &ranked {
            *votes.entry(*label).or_default() += 1;
        }
        let top = votes.values().copied().max().unwrap_or(0);

        // among tied labels the nearest one wins
        ranked
            .iter()
            .find(|(_, label)| votes.get(label).copied() == Some(top))
            .map(|(_, label)| label.to_string())
            .ok_or(ClassifierError::EmptyIndex)
    }
}
