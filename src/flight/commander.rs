//! Flight commander boundary
//!
//! Every motion call is awaited until the aircraft reports the maneuver
//! finished (or the call fails). The controller never issues two motion
//! calls concurrently.

use std::time::Duration;

use async_trait::async_trait;

use crate::state::Pose;

/// One sample from the onboard state estimator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorSample {
    /// Estimated height in meters
    pub z: f64,
    /// Roll angle in degrees
    pub roll: f64,
}

impl EstimatorSample {
    /// Plausible height and near-level attitude
    pub fn is_stable(&self) -> bool {
        self.z > 0.01 && self.z < 2.0 && self.roll.abs() < 20.0
    }
}

/// Errors reported by the flight link; all of them end the session
#[derive(Debug, thiserror::Error)]
pub enum FlightError {
    #[error("flight link error: {0}")]
    Link(String),

    #[error("{command} rejected: {reason}")]
    Rejected { command: &'static str, reason: String },

    #[error("flight link disconnected")]
    Disconnected,
}

#[async_trait]
pub trait FlightCommander: Send {
    /// Climb to `height` meters over `duration`
    async fn takeoff(&mut self, height: f64, duration: Duration) -> Result<(), FlightError>;

    /// Descend to the ground over `duration`, heading 0
    async fn land(&mut self, duration: Duration) -> Result<(), FlightError>;

    /// Fly to an absolute pose over `duration`
    async fn go_to(&mut self, target: Pose, duration: Duration) -> Result<(), FlightError>;

    /// Next state-estimator sample
    async fn estimate(&mut self) -> Result<EstimatorSample, FlightError>;

    /// Release the link
    async fn disconnect(&mut self) -> Result<(), FlightError>;
}
