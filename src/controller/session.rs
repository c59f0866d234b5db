//! Session runner: readiness wait, control loop, teardown

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::events::ControllerEvent;
use crate::flight::{FlightCommander, FlightError};
use crate::input::InputSources;
use crate::lifecycle::QuitFlag;

use super::dispatcher::{Controller, CycleOutcome};

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub cycle_interval: Duration,
    pub estimator_poll: Duration,
    pub stable_samples: u32,
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            cycle_interval: config.cycle_interval,
            estimator_poll: config.estimator_poll,
            stable_samples: config.stable_samples,
        }
    }
}

/// Why the loop exited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Quit flag raised by the operator, a signal, or closed input
    Quit,
    /// Live stop command landed the drone
    Stopped,
}

impl<F: FlightCommander> Controller<F> {
    /// Poll the position estimator until more than `stable_samples`
    /// consecutive samples are stable. Returns false if quit was raised
    /// first.
    pub async fn wait_until_ready(
        &mut self,
        settings: &SessionSettings,
        quit: &QuitFlag,
    ) -> Result<bool, FlightError> {
        let mut stable = 0u32;
        info!("waiting for position estimate");

        while stable <= settings.stable_samples {
            if quit.is_raised() {
                return Ok(false);
            }

            let sample = self.pilot_mut().flight_mut().estimate().await?;
            if sample.is_stable() {
                stable += 1;
            } else {
                stable = 0;
            }
            debug!(z = sample.z, roll = sample.roll, stable, "estimator sample");

            if stable <= settings.stable_samples {
                tokio::time::sleep(settings.estimator_poll).await;
            }
        }

        info!("position estimate stable");
        Ok(true)
    }

    /// Run a full session. Teardown runs on every exit path, and the
    /// commander is disconnected even if landing failed.
    pub async fn run(
        &mut self,
        sources: &mut InputSources,
        quit: &QuitFlag,
        settings: &SessionSettings,
    ) -> Result<SessionEnd, FlightError> {
        let result = self.run_loop(sources, quit, settings).await;
        if let Err(e) = &result {
            error!(?e, "control loop failed, landing");
        }

        let teardown = self.teardown().await;
        if let Err(e) = &teardown {
            error!(?e, "teardown failed");
        }

        let disconnect = self.pilot_mut().flight_mut().disconnect().await;
        if let Err(e) = &disconnect {
            error!(?e, "disconnect failed");
        }

        let end = result?;
        teardown?;
        disconnect?;
        info!(?end, mood = %self.mood(), "session finished");
        Ok(end)
    }

    async fn run_loop(
        &mut self,
        sources: &mut InputSources,
        quit: &QuitFlag,
        settings: &SessionSettings,
    ) -> Result<SessionEnd, FlightError> {
        if !self.wait_until_ready(settings, quit).await? {
            return Ok(SessionEnd::Quit);
        }
        self.emit(ControllerEvent::Ready);

        loop {
            if quit.is_raised() {
                return Ok(SessionEnd::Quit);
            }

            let input = sources.poll();
            if self.cycle(input, Instant::now()).await? == CycleOutcome::Stop {
                return Ok(SessionEnd::Stopped);
            }

            tokio::time::sleep(settings.cycle_interval).await;
        }
    }
}
