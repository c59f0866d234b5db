//! Flight commander boundary and primitive execution
//!
//! `FlightCommander` is the actuation boundary; `Pilot` turns commands
//! and choreographies into clamped motion calls against it.

mod commander;
mod pilot;
#[cfg(test)]
pub(crate) mod recording;
mod sim;

pub use commander::{EstimatorSample, FlightCommander, FlightError};
pub use pilot::{Execution, Pilot, PilotSettings};
pub use sim::SimulatedCommander;
