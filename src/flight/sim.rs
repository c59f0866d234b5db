//! Hardware-free commander
//!
//! Accepts every command, waits out its duration and logs it. Used when
//! no radio link is configured so the fusion loop can run at a desk.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::state::Pose;

use super::commander::{EstimatorSample, FlightCommander, FlightError};

/// Height the estimator reports while resting on the ground
const GROUND_HEIGHT: f64 = 0.03;

#[derive(Debug)]
pub struct SimulatedCommander {
    pose: Option<Pose>,
    connected: bool,
}

impl SimulatedCommander {
    pub fn new() -> Self {
        Self {
            pose: None,
            connected: true,
        }
    }

    /// Pose last flown to, `None` while on the ground
    pub fn pose(&self) -> Option<Pose> {
        self.pose
    }

    fn ensure_connected(&self) -> Result<(), FlightError> {
        if self.connected {
            Ok(())
        } else {
            Err(FlightError::Disconnected)
        }
    }
}

impl Default for SimulatedCommander {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FlightCommander for SimulatedCommander {
    async fn takeoff(&mut self, height: f64, duration: Duration) -> Result<(), FlightError> {
        self.ensure_connected()?;
        info!(height, duration_ms = duration.as_millis() as u64, "sim: takeoff");
        tokio::time::sleep(duration).await;
        self.pose = Some(Pose::new(0.0, 0.0, height, 0.0));
        Ok(())
    }

    async fn land(&mut self, duration: Duration) -> Result<(), FlightError> {
        self.ensure_connected()?;
        info!(duration_ms = duration.as_millis() as u64, "sim: land");
        tokio::time::sleep(duration).await;
        self.pose = None;
        Ok(())
    }

    async fn go_to(&mut self, target: Pose, duration: Duration) -> Result<(), FlightError> {
        self.ensure_connected()?;
        if self.pose.is_none() {
            return Err(FlightError::Rejected {
                command: "go_to",
                reason: "aircraft is on the ground".to_string(),
            });
        }
        info!(%target, duration_ms = duration.as_millis() as u64, "sim: go_to");
        tokio::time::sleep(duration).await;
        self.pose = Some(target);
        Ok(())
    }

    async fn estimate(&mut self) -> Result<EstimatorSample, FlightError> {
        self.ensure_connected()?;
        let z = self.pose().map_or(GROUND_HEIGHT, |p| p.z);
        Ok(EstimatorSample { z, roll: 0.5 })
    }

    async fn disconnect(&mut self) -> Result<(), FlightError> {
        info!("sim: disconnected");
        self.connected = false;
        Ok(())
    }
}
