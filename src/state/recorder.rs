//! Trick recording state machine
//!
//! Handles transitions between Idle, AwaitingName and Recording based on
//! resolved intents and raw utterance text. While the recorder is not Idle
//! it intercepts input so nothing reaches the flight commander.

use tracing::{debug, info, warn};

use crate::command::{END_TRICK, LEARN_TRICK};

use super::tricks::TrickDefinition;

/// The three recorder states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    /// Not authoring; input dispatches normally
    Idle,
    /// Learning mode entered, next utterance becomes the trick name
    AwaitingName,
    /// Collecting steps until end_trick
    Recording,
}

impl Default for RecorderState {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for RecorderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecorderState::Idle => write!(f, "Idle"),
            RecorderState::AwaitingName => write!(f, "AwaitingName"),
            RecorderState::Recording => write!(f, "Recording"),
        }
    }
}

/// What the recorder did with one cycle's input
#[derive(Debug, Clone, PartialEq)]
pub enum RecorderOutcome {
    /// Input was not intercepted and should be dispatched
    Passthrough,
    /// Learning mode entered
    Started,
    /// Trick name captured
    Named(String),
    /// Step appended to the trick in progress
    StepRecorded { name: String, step: String },
    /// Trick finished and ready to store
    Saved(TrickDefinition),
    /// end_trick without a name or steps
    Discarded,
    /// Intercepted but nothing usable this cycle
    Ignored,
}

impl RecorderOutcome {
    /// Whether the input was consumed by the recorder
    pub fn is_intercepted(&self) -> bool {
        !matches!(self, RecorderOutcome::Passthrough)
    }
}

#[derive(Debug, Default)]
pub struct TrickRecorder {
    state: RecorderState,
    name: Option<String>,
    steps: Vec<String>,
}

impl TrickRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Steps recorded so far
    pub fn pending_steps(&self) -> &[String] {
        &self.steps
    }

    /// Feed one cycle's input: raw utterance text and the resolved label
    pub fn observe(&mut self, text: Option<&str>, label: Option<&str>) -> RecorderOutcome {
        if label == Some(LEARN_TRICK) {
            self.clear();
            self.transition_to(RecorderState::AwaitingName);
            return RecorderOutcome::Started;
        }

        match self.state {
            RecorderState::Idle => RecorderOutcome::Passthrough,
            RecorderState::AwaitingName => self.observe_name(text),
            RecorderState::Recording => self.observe_step(label),
        }
    }

    /// Return to Idle, discarding any unfinished trick. Returns true if
    /// something was discarded.
    pub fn reset(&mut self) -> bool {
        let had_work = self.state != RecorderState::Idle;
        if had_work {
            info!(name = ?self.name, steps = self.steps.len(), "discarding unfinished trick");
            self.clear();
            self.transition_to(RecorderState::Idle);
        }
        had_work
    }

    fn observe_name(&mut self, text: Option<&str>) -> RecorderOutcome {
        let name = match text.map(|t| t.trim().to_lowercase()) {
            Some(name) if !name.is_empty() => name,
            _ => return RecorderOutcome::Ignored,
        };

        info!(%name, "trick name captured");
        self.name = Some(name.clone());
        self.transition_to(RecorderState::Recording);
        RecorderOutcome::Named(name)
    }

    fn observe_step(&mut self, label: Option<&str>) -> RecorderOutcome {
        match label {
            Some(END_TRICK) => self.finish(),
            Some(step) => {
                let name = self.name.clone().unwrap_or_default();
                debug!(%name, %step, "recording step");
                self.steps.push(step.to_string());
                RecorderOutcome::StepRecorded {
                    name,
                    step: step.to_string(),
                }
            }
            None => RecorderOutcome::Ignored,
        }
    }

    fn finish(&mut self) -> RecorderOutcome {
        let name = self.name.take();
        let steps = std::mem::take(&mut self.steps);
        self.transition_to(RecorderState::Idle);

        match name {
            Some(name) if !steps.is_empty() => {
                info!(%name, steps = steps.len(), "trick complete");
                RecorderOutcome::Saved(TrickDefinition { name, steps })
            }
            name => {
                warn!(?name, steps = steps.len(), "no trick name or steps to save");
                RecorderOutcome::Discarded
            }
        }
    }

    fn clear(&mut self) {
        self.name = None;
        self.steps.clear();
    }

    fn transition_to(&mut self, next: RecorderState) {
        if next != self.state {
            info!(from = %self.state, to = %next, "recorder transition");
            self.state = next;
        }
    }
}
