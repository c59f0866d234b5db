//! Hand gesture resolution
//!
//! Landmarks are normalized into a fixed 126-value feature vector; a
//! swappable closed-set classifier maps valid vectors to command labels.

mod classifier;
mod features;
mod resolver;

pub use classifier::{GestureClassifier, NearestNeighborClassifier};
pub use features::{FeatureVector, HandLandmarks, FEATURE_LEN};
pub use resolver::GestureResolver;
