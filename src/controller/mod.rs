//! Behavior controller
//!
//! `Controller` fuses one cycle of voice and gesture input into at most
//! one executed command; the session runner wraps it with the readiness
//! wait and the landing teardown.

mod dispatcher;
mod session;

pub use dispatcher::{Controller, ControllerSettings, CycleOutcome};
pub use session::{SessionEnd, SessionSettings};
