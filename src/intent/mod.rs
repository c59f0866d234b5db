//! Speech intent resolution
//!
//! Wraps a swappable phrase-matching backend with the keyword override,
//! confidence gate and distance-modifier extraction. The vocabulary grows
//! at runtime when tricks are saved.

mod index;
mod resolver;
mod vocabulary;

pub use index::{IntentIndex, IntentMatch, SimilarityIndex};
pub use resolver::{extract_modifier, keyword_override, IntentResolver, DEFAULT_THRESHOLD};
pub use vocabulary::Vocabulary;
