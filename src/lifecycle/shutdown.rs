//! Signal handling for graceful shutdown

use tokio::signal::unix::{signal, SignalKind};
use tracing::debug;

use super::quit::QuitFlag;

/// Handles shutdown signals (SIGTERM, SIGINT)
pub struct ShutdownSignal;

impl ShutdownSignal {
    /// Create a new shutdown signal handler
    pub fn new() -> Self {
        Self
    }

    /// Wait for a shutdown signal
    pub async fn wait(&self) -> std::io::Result<()> {
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {
                debug!("received SIGTERM");
            }
            _ = sigint.recv() => {
                debug!("received SIGINT");
            }
        }
        Ok(())
    }

    /// Raise `quit` once a signal arrives. The control loop notices on its
    /// next cycle and runs the landing teardown itself.
    pub fn spawn_forwarder(self, quit: QuitFlag) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            match self.wait().await {
                Ok(()) => quit.raise("signal"),
                Err(e) => tracing::error!(?e, "failed to register signal handlers"),
            }
        })
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
