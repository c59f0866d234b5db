//! Feature vector to gesture resolution

use tracing::{debug, warn};

use crate::command::ResolvedCommand;

use super::classifier::GestureClassifier;
use super::features::FeatureVector;

pub struct GestureResolver {
    classifier: Box<dyn GestureClassifier>,
}

impl GestureResolver {
    pub fn new(classifier: Box<dyn GestureClassifier>) -> Self {
        Self { classifier }
    }

    /// Classify a frame's features. Incomplete or empty vectors and
    /// classifier failures all yield no gesture.
    pub fn resolve(&self, features: &FeatureVector) -> Option<ResolvedCommand> {
        if features.is_empty() {
            return None;
        }
        if !features.is_valid() {
            debug!(len = features.len(), "incomplete or blank feature vector");
            return None;
        }
        let values = features.as_array()?;

        match self.classifier.classify(values) {
            Ok(label) => {
                debug!(%label, "gesture recognized");
                Some(ResolvedCommand::gesture(label))
            }
            Err(e) => {
                warn!(?e, "gesture prediction failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{ClassifierError, Source};
    use crate::gesture::FEATURE_LEN;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingClassifier {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl GestureClassifier for CountingClassifier {
        fn classify(&self, _features: &[f64; FEATURE_LEN]) -> Result<String, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ClassifierError::Backend("model not loaded".into()))
            } else {
                Ok("takeoff".to_string())
            }
        }
    }

    fn resolver(fail: bool) -> (GestureResolver, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let classifier = CountingClassifier {
            calls: Arc::clone(&calls),
            fail,
        };
        (GestureResolver::new(Box::new(classifier)), calls)
    }

    #[test]
    fn test_valid_vector() {
        let (resolver, calls) = resolver(false);
        let resolved = resolver
            .resolve(&FeatureVector::new(vec![0.1; FEATURE_LEN]))
            .unwrap();
        assert_eq!(resolved.label, "takeoff");
        assert_eq!(resolved.source, Source::Gesture);
        assert_eq!(resolved.modifier, None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalid_vectors_never_reach_classifier() {
        let (resolver, calls) = resolver(false);
        assert!(resolver
            .resolve(&FeatureVector::new(vec![0.0; FEATURE_LEN]))
            .is_none());
        assert!(resolver.resolve(&FeatureVector::new(vec![0.3; 63])).is_none());
        assert!(resolver.resolve(&FeatureVector::new(vec![0.3; 127])).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_classifier_failure_absorbed() {
        let (resolver, calls) = resolver(true);
        assert!(resolver
            .resolve(&FeatureVector::new(vec![0.1; FEATURE_LEN]))
            .is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
