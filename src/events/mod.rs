//! Events module for controller telemetry
//!
//! Structured events for recognized commands, recorder transitions, mood
//! changes and flight state. The console renders them through `Display`.

use serde::{Deserialize, Serialize};

use crate::command::Source;
use crate::state::Mood;

/// Events emitted by the controller while dispatching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerEvent {
    /// Position estimate settled, loop starting
    Ready,

    /// Utterance drained from the voice queue
    Heard { text: String },

    /// Command chosen by arbitration and admitted by the cooldown gate
    CommandRecognized {
        source: Source,
        label: String,
        confidence: f64,
        /// Distance override in meters
        modifier: Option<f64>,
    },

    /// Learning mode entered, waiting for a trick name
    LearningStarted,

    /// Trick name captured, recording steps
    TrickNamed { name: String },

    /// Step appended to the trick being recorded
    StepRecorded { name: String, step: String },

    /// Trick stored and added to the vocabulary
    TrickSaved { name: String, steps: usize },

    /// end_trick without a name or steps
    TrickDiscarded,

    /// Saved trick being replayed
    TrickStarted { name: String, steps: usize },

    /// Mood changed
    MoodChanged { from: Mood, to: Mood },

    TookOff { height: f64 },

    Landed,
}

impl std::fmt::Display for ControllerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerEvent::Ready => write!(f, "READY"),
            ControllerEvent::Heard { text } => write!(f, "HEARD '{}'", text),
            ControllerEvent::CommandRecognized {
                source,
                label,
                confidence,
                modifier,
            } => {
                write!(f, "COMMAND {} via {} ({:.2})", label, source, confidence)?;
                if let Some(distance) = modifier {
                    write!(f, " distance {:.2}m", distance)?;
                }
                Ok(())
            }
            ControllerEvent::LearningStarted => write!(f, "LEARNING say the trick name"),
            ControllerEvent::TrickNamed { name } => {
                write!(f, "RECORDING '{}', say 'end trick' to finish", name)
            }
            ControllerEvent::StepRecorded { name, step } => {
                write!(f, "STEP '{}' += {}", name, step)
            }
            ControllerEvent::TrickSaved { name, steps } => {
                write!(f, "TRICK_SAVED '{}' ({} steps)", name, steps)
            }
            ControllerEvent::TrickDiscarded => write!(f, "TRICK_DISCARDED"),
            ControllerEvent::TrickStarted { name, steps } => {
                write!(f, "TRICK '{}' ({} steps)", name, steps)
            }
            ControllerEvent::MoodChanged { from, to } => write!(f, "MOOD {} -> {}", from, to),
            ControllerEvent::TookOff { height } => write!(f, "AIRBORNE at {:.2}m", height),
            ControllerEvent::Landed => write!(f, "LANDED"),
        }
    }
}
