//! Primitive command execution
//!
//! The pilot owns the flight commander and the commanded setpoint. It is
//! the only place motion calls are issued, and every pose it sends has
//! been clamped into the flight envelope first.

use std::time::Duration;

use tracing::{debug, info};

use crate::command::{Choreography, Command};
use crate::state::{Pose, PositionState};

use super::commander::{FlightCommander, FlightError};

/// Distance flown toward the operator by come_here
const APPROACH_DISTANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy)]
pub struct PilotSettings {
    /// Translation used when no distance modifier was spoken
    pub default_step: f64,
    /// Duration handed to takeoff, land and single moves
    pub maneuver: Duration,
    /// Extra wait after takeoff and land complete
    pub settle: Duration,
}

impl Default for PilotSettings {
    fn default() -> Self {
        Self {
            default_step: 0.3,
            maneuver: Duration::from_secs(2),
            settle: Duration::from_secs(1),
        }
    }
}

/// What executing one command actually did
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    TookOff { height: f64 },
    Landed,
    Moved(Pose),
    Maneuver(&'static str),
    StationKeep(Pose),
    /// Guard refused the command; nothing was sent
    Skipped(&'static str),
}

pub struct Pilot<F> {
    flight: F,
    position: PositionState,
    settings: PilotSettings,
}

impl<F: FlightCommander> Pilot<F> {
    pub fn new(flight: F, settings: PilotSettings) -> Self {
        Self {
            flight,
            position: PositionState::new(),
            settings,
        }
    }

    pub fn position(&self) -> &PositionState {
        &self.position
    }

    pub fn flight(&self) -> &F {
        &self.flight
    }

    pub fn flight_mut(&mut self) -> &mut F {
        &mut self.flight
    }

    /// Execute one primitive command. `modifier` overrides the translation
    /// distance of directional moves.
    pub async fn execute(
        &mut self,
        command: &Command,
        modifier: Option<f64>,
    ) -> Result<Execution, FlightError> {
        let airborne = self.position.is_airborne();

        match command {
            Command::Takeoff if airborne => Ok(Execution::Skipped("already in the air")),
            Command::Takeoff => {
                let height = self.position.set_pose(self.position.pose()).z;
                info!(height, "taking off");
                self.flight.takeoff(height, self.settings.maneuver).await?;
                tokio::time::sleep(self.settings.settle).await;
                self.position.set_airborne(true);
                Ok(Execution::TookOff { height })
            }
            Command::Land | Command::Stop if !airborne => {
                Ok(Execution::Skipped("already on the ground"))
            }
            Command::Land | Command::Stop => {
                self.land().await?;
                Ok(Execution::Landed)
            }
            _ if !airborne => Ok(Execution::Skipped("not airborne")),
            Command::Move(direction) => {
                let distance = modifier
                    .filter(|d| *d > 0.0)
                    .unwrap_or(self.settings.default_step);
                let (dx, dy, dz) = direction.offset(distance);
                info!(direction = direction.label(), distance, "moving");
                let target = self.fly_offset(dx, dy, dz).await?;
                Ok(Execution::Moved(target))
            }
            Command::ComeHere => {
                info!("approaching operator");
                let target = self.fly_offset(0.0, APPROACH_DISTANCE, 0.0).await?;
                Ok(Execution::Moved(target))
            }
            Command::Expressive(expression) => {
                let choreography = Choreography::expression(*expression);
                self.perform(&choreography).await?;
                Ok(Execution::Maneuver(choreography.name))
            }
            Command::LearnTrick | Command::EndTrick | Command::Trick(_) | Command::Other(_) => {
                debug!(command = %command, "no dedicated behavior, holding position");
                let target = self.fly_offset(0.0, 0.0, 0.0).await?;
                Ok(Execution::StationKeep(target))
            }
        }
    }

    /// Fly a choreography from the current setpoint; the setpoint itself
    /// is unchanged afterwards
    pub async fn perform(&mut self, choreography: &Choreography) -> Result<(), FlightError> {
        let base = self.position.pose();
        info!(
            maneuver = choreography.name,
            total_ms = choreography.total_time().as_millis() as u64,
            "performing maneuver"
        );

        for (target, step) in choreography.targets(base) {
            self.flight.go_to(target, step.duration).await?;
            if !step.hold.is_zero() {
                tokio::time::sleep(step.hold).await;
            }
        }
        Ok(())
    }

    /// Land if flying. Returns true if a land call was made.
    pub async fn land_if_airborne(&mut self) -> Result<bool, FlightError> {
        if !self.position.is_airborne() {
            return Ok(false);
        }
        self.land().await?;
        Ok(true)
    }

    async fn land(&mut self) -> Result<(), FlightError> {
        info!("landing");
        self.flight.land(self.settings.maneuver).await?;
        tokio::time::sleep(self.settings.settle).await;
        self.position.set_airborne(false);
        Ok(())
    }

    async fn fly_offset(&mut self, dx: f64, dy: f64, dz: f64) -> Result<Pose, FlightError> {
        let target = self
            .position
            .set_pose(self.position.pose().offset(dx, dy, dz).with_yaw(0.0));
        debug_assert!(target.is_within_envelope());
        self.flight.go_to(target, self.settings.maneuver).await?;
        Ok(target)
    }
}
