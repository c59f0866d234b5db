//! Hand landmark feature vectors
//!
//! Layout: up to two hands, 21 landmarks each, (x, y, z) per landmark.
//! Each hand is translated so the wrist is the origin and scaled by the
//! wrist to middle-fingertip distance. Missing hands are zero-filled.

use serde::{Deserialize, Serialize};

pub const LANDMARKS_PER_HAND: usize = 21;
pub const MAX_HANDS: usize = 2;
/// Length of a complete feature vector
pub const FEATURE_LEN: usize = MAX_HANDS * LANDMARKS_PER_HAND * 3;

const WRIST: usize = 0;
const MIDDLE_FINGER_TIP: usize = 12;
const MIN_SCALE: f64 = 1e-6;

/// One landmark in camera-normalized coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Landmark {
    fn distance(&self, other: &Landmark) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2))
            .sqrt()
    }
}

pub type HandLandmarks = [Landmark; LANDMARKS_PER_HAND];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Normalize detected hands into a feature vector. Hands beyond the
    /// second are ignored.
    pub fn from_hands(hands: &[HandLandmarks]) -> Self {
        let mut values = Vec::with_capacity(FEATURE_LEN);

        for hand in hands.iter().take(MAX_HANDS) {
            let base = hand[WRIST];
            let scale = match base.distance(&hand[MIDDLE_FINGER_TIP]) {
                d if d > 0.0 => d,
                _ => MIN_SCALE,
            };
            for point in hand {
                values.push((point.x - base.x) / scale);
                values.push((point.y - base.y) / scale);
                values.push((point.z - base.z) / scale);
            }
        }

        values.resize(FEATURE_LEN, 0.0);
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Complete length and at least one non-zero value
    pub fn is_valid(&self) -> bool {
        self.len() == FEATURE_LEN && self.as_slice().iter().any(|v| *v != 0.0)
    }

    /// Fixed-size view, present only for complete vectors
    pub fn as_array(&self) -> Option<&[f64; FEATURE_LEN]> {
        self.as_slice().try_into().ok()
    }
}
