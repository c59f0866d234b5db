//! Session state owned by the controller
//!
//! - Position: commanded setpoint and airborne flag, clamped to the envelope
//! - Mood: affect state and the idle scheduler that decays it
//! - Recorder: Idle, AwaitingName and Recording trick authoring states
//! - Tricks: saved trick table with JSON export

mod mood;
mod position;
mod recorder;
mod tricks;

pub use mood::{Affect, IdleAction, IdleTick, Mood, MoodScheduler, MoodSettings};
pub use position::{Pose, PositionState, HORIZONTAL_LIMIT, MAX_ALTITUDE, MIN_ALTITUDE};
pub use recorder::{RecorderOutcome, RecorderState, TrickRecorder};
pub use tricks::{TrickDefinition, TrickStoreError, TrickTable};
