//! Input module for utterance and frame producers
//!
//! Producers push into bounded queues; the control loop drains at most
//! one item per source per cycle.

mod console;
mod sources;

pub use console::{ConsoleError, ConsoleListener};
pub use sources::{CycleInput, InputSenders, InputSources, QUEUE_CAPACITY};
