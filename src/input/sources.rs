//! Bounded queues between producers and the control loop

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::gesture::FeatureVector;

/// Default capacity of each producer queue
pub const QUEUE_CAPACITY: usize = 32;

/// Producer halves, handed to capture threads
#[derive(Debug, Clone)]
pub struct InputSenders {
    pub utterances: mpsc::Sender<String>,
    pub frames: mpsc::Sender<FeatureVector>,
}

/// Items drained for one control cycle
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CycleInput {
    pub utterance: Option<String>,
    pub frame: Option<FeatureVector>,
}

/// Consumer halves, drained by the control loop without blocking
#[derive(Debug)]
pub struct InputSources {
    utterances: mpsc::Receiver<String>,
    frames: mpsc::Receiver<FeatureVector>,
}

impl InputSources {
    /// Create both queues with the given capacity
    pub fn channel(capacity: usize) -> (InputSenders, InputSources) {
        let (utterance_tx, utterance_rx) = mpsc::channel(capacity);
        let (frame_tx, frame_rx) = mpsc::channel(capacity);
        (
            InputSenders {
                utterances: utterance_tx,
                frames: frame_tx,
            },
            InputSources {
                utterances: utterance_rx,
                frames: frame_rx,
            },
        )
    }

    /// Take at most one item from each queue; never waits
    pub fn poll(&mut self) -> CycleInput {
        CycleInput {
            utterance: take(&mut self.utterances),
            frame: take(&mut self.frames),
        }
    }
}

fn take<T>(rx: &mut mpsc::Receiver<T>) -> Option<T> {
    match rx.try_recv() {
        Ok(item) => Some(item),
        Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
    }
}
