//! Cooperative cancellation for the control loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

/// Shared quit request, checked once per control cycle
#[derive(Debug, Clone, Default)]
pub struct QuitFlag {
    raised: Arc<AtomicBool>,
}

impl QuitFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the loop to stop; `reason` is only logged
    pub fn raise(&self, reason: &str) {
        if !self.raised.swap(true, Ordering::SeqCst) {
            info!(%reason, "quit requested");
        }
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}
