//! Console input producer
//!
//! Stands in for the microphone and camera pipelines. Typed lines become
//! utterances. JSON arrays are taken as ready feature vectors, and JSON
//! objects of the form `{"hands": [[{"x":..,"y":..,"z":..}; 21], ...]}`
//! are raw tracker landmarks normalized here. Runs on a dedicated thread
//! because stdin reads block.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::gesture::{FeatureVector, HandLandmarks};
use crate::lifecycle::QuitFlag;

use super::sources::InputSenders;

/// One parsed console line
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    Quit,
    Utterance(String),
    Frame(FeatureVector),
    Empty,
}

/// Raw hand-tracker output for one frame
#[derive(Debug, Deserialize)]
struct LandmarkFrame {
    hands: Vec<HandLandmarks>,
}

/// Errors that can occur in the console listener
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("console listener is already running")]
    AlreadyRunning,

    #[error("failed to spawn listener thread: {0}")]
    ThreadSpawn(String),

    #[error("malformed feature vector: {0}")]
    Frame(#[from] serde_json::Error),
}

/// Classify a console line
pub fn parse_line(line: &str) -> Result<ConsoleInput, ConsoleError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(ConsoleInput::Empty);
    }
    if trimmed.eq_ignore_ascii_case("q") || trimmed.eq_ignore_ascii_case("quit") {
        return Ok(ConsoleInput::Quit);
    }
    if trimmed.starts_with('[') {
        let features: FeatureVector = serde_json::from_str(trimmed)?;
        return Ok(ConsoleInput::Frame(features));
    }
    if trimmed.starts_with('{') {
        let frame: LandmarkFrame = serde_json::from_str(trimmed)?;
        debug!(hands = frame.hands.len(), "landmark frame");
        return Ok(ConsoleInput::Frame(FeatureVector::from_hands(&frame.hands)));
    }
    Ok(ConsoleInput::Utterance(trimmed.to_lowercase()))
}

/// Reads stdin on a background thread and feeds the input queues
pub struct ConsoleListener {
    senders: InputSenders,
    quit: QuitFlag,
    running: Arc<AtomicBool>,
}

impl ConsoleListener {
    pub fn new(senders: InputSenders, quit: QuitFlag) -> Self {
        Self {
            senders,
            quit,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawn the reader thread. It exits on EOF, on `quit`, or when the
    /// queues are closed.
    pub fn start(&self) -> Result<(), ConsoleError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ConsoleError::AlreadyRunning);
        }

        let senders = self.senders.clone();
        let quit = self.quit.clone();
        let running = Arc::clone(&self.running);

        thread::Builder::new()
            .name("console-input".to_string())
            .spawn(move || {
                info!("console input thread started");
                let stdin = std::io::stdin();
                read_lines(stdin.lock(), &senders, &quit, &running);
                running.store(false, Ordering::SeqCst);
                info!("console input thread stopped");
            })
            .map_err(|e| ConsoleError::ThreadSpawn(e.to_string()))?;

        Ok(())
    }

    /// Ask the reader to stop after its current line
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

fn read_lines<R: BufRead>(
    reader: R,
    senders: &InputSenders,
    quit: &QuitFlag,
    running: &AtomicBool,
) {
    for line in reader.lines() {
        if !running.load(Ordering::SeqCst) || quit.is_raised() {
            return;
        }

        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!(?e, "console read failed");
                break;
            }
        };

        let delivered = match parse_line(&line) {
            Ok(ConsoleInput::Quit) => {
                quit.raise("operator");
                return;
            }
            Ok(ConsoleInput::Utterance(text)) => {
                debug!(%text, "utterance queued");
                senders.utterances.blocking_send(text).is_ok()
            }
            Ok(ConsoleInput::Frame(features)) => senders.frames.blocking_send(features).is_ok(),
            Ok(ConsoleInput::Empty) => true,
            Err(e) => {
                warn!(%e, "ignoring console line");
                true
            }
        };

        if !delivered {
            warn!("input queue closed");
            return;
        }
    }

    quit.raise("console closed");
}
