//! Command kinds and fixed maneuvers
//!
//! Resolvers produce `ResolvedCommand`s; the winning label becomes a closed
//! `Command` enum; expressive and idle maneuvers are `Choreography` tables
//! run by the pilot.

mod choreography;
mod kind;
mod resolved;

pub use choreography::{ChoreoStep, Choreography};
pub use kind::{Command, Direction, Expression, END_TRICK, LEARN_TRICK};
pub use resolved::{ClassifierError, ResolvedCommand, Source};
