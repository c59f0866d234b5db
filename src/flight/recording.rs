//! Test double that records every flight call

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;

use crate::state::Pose;

use super::commander::{EstimatorSample, FlightCommander, FlightError};

#[derive(Debug, Clone, PartialEq)]
pub enum FlightCall {
    Takeoff { height: f64, duration: Duration },
    Land { duration: Duration },
    GoTo { target: Pose, duration: Duration },
    Disconnect,
}

#[derive(Debug, Default)]
pub struct RecordingCommander {
    pub calls: Vec<FlightCall>,
    /// Samples handed out by `estimate`; stable once exhausted
    pub samples: VecDeque<EstimatorSample>,
    /// Fail the motion call with this index (0-based)
    pub fail_at: Option<usize>,
    motion_calls: usize,
}

impl RecordingCommander {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }

    /// Targets of every go_to call, in order
    pub fn targets(&self) -> Vec<Pose> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                FlightCall::GoTo { target, .. } => Some(*target),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matches: impl Fn(&FlightCall) -> bool) -> usize {
        self.calls.iter().filter(|c| matches(c)).count()
    }

    async fn motion(&mut self, call: FlightCall, duration: Duration) -> Result<(), FlightError> {
        let index = self.motion_calls;
        self.motion_calls += 1;
        if self.fail_at == Some(index) {
            return Err(FlightError::Link("radio timeout".to_string()));
        }
        self.calls.push(call);
        tokio::time::sleep(duration).await;
        Ok(())
    }
}

#[async_trait]
impl FlightCommander for RecordingCommander {
    async fn takeoff(&mut self, height: f64, duration: Duration) -> Result<(), FlightError> {
        self.motion(FlightCall::Takeoff { height, duration }, duration)
            .await
    }

    async fn land(&mut self, duration: Duration) -> Result<(), FlightError> {
        self.motion(FlightCall::Land { duration }, duration).await
    }

    async fn go_to(&mut self, target: Pose, duration: Duration) -> Result<(), FlightError> {
        self.motion(FlightCall::GoTo { target, duration }, duration)
            .await
    }

    async fn estimate(&mut self) -> Result<EstimatorSample, FlightError> {
        Ok(self
            .samples
            .pop_front()
            .unwrap_or(EstimatorSample { z: 0.05, roll: 1.0 }))
    }

    async fn disconnect(&mut self) -> Result<(), FlightError> {
        self.calls.push(FlightCall::Disconnect);
        Ok(())
    }
}
