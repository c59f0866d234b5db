//! drone-fusion: voice and gesture command fusion for a small quadrotor
//!
//! The daemon drains one utterance and one gesture frame per control
//! cycle, picks at most one command and flies it:
//! - Voice intents beat gestures and a cooldown gates execution
//! - Tricks are authored by voice and replayed step by step
//! - An idle scheduler drifts the mood and performs idle maneuvers
//!
//! Console lines stand in for the speech and hand-tracking pipelines and
//! the simulated commander stands in for the radio link.

mod command;
mod config;
mod controller;
mod events;
mod flight;
mod gesture;
mod input;
mod intent;
mod lifecycle;
mod state;

use anyhow::Result;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::controller::{Controller, ControllerSettings, SessionSettings};
use crate::events::ControllerEvent;
use crate::flight::{Pilot, SimulatedCommander};
use crate::gesture::{GestureClassifier, GestureResolver, NearestNeighborClassifier};
use crate::input::{ConsoleListener, InputSources, QUEUE_CAPACITY};
use crate::intent::IntentResolver;
use crate::lifecycle::{QuitFlag, ShutdownSignal};
use crate::state::TrickTable;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries operator feedback; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "drone-fusion starting");

    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(?config.tricks_path, "configuration loaded");

    let quit = QuitFlag::new();
    let signals = ShutdownSignal::new().spawn_forwarder(quit.clone());

    let (senders, mut sources) = InputSources::channel(QUEUE_CAPACITY);
    let console = ConsoleListener::new(senders, quit.clone());
    match console.start() {
        Ok(()) => info!("console input started, type commands or `quit`"),
        Err(e) => {
            error!(?e, "failed to start console input");
            warn!("continuing without operator input");
        }
    }

    let (event_tx, mut event_rx) = broadcast::channel::<ControllerEvent>(64);
    let telemetry = tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(event) => println!("{event}"),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "event printer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut controller = Controller::new(
        ControllerSettings::from(&config),
        Pilot::new(SimulatedCommander::new(), config.pilot),
        IntentResolver::with_threshold(config.intent_threshold),
        GestureResolver::new(load_gestures(&config)),
        event_tx,
        Instant::now(),
    );

    match TrickTable::load(&config.tricks_path) {
        Ok(tricks) => controller.load_tricks(tricks),
        Err(e) => warn!(?e, "saved tricks unavailable, starting with none"),
    }

    info!(
        threshold = controller.intents().threshold(),
        tricks = controller.tricks().len(),
        "controller initialized, entering control loop"
    );
    let result = controller
        .run(&mut sources, &quit, &SessionSettings::from(&config))
        .await;

    if let Err(e) = controller.tricks().save(&config.tricks_path) {
        error!(?e, "failed to export tricks");
    }

    info!("shutting down...");
    console.stop();
    signals.abort();
    drop(controller);
    let _ = telemetry.await;

    info!("drone-fusion stopped");
    result?;
    Ok(())
}

/// Nearest-neighbour classifier over the configured samples. Without
/// samples every frame resolves to no gesture.
fn load_gestures(config: &Config) -> Box<dyn GestureClassifier> {
    let loaded = config
        .gesture_samples
        .as_deref()
        .map(|path| NearestNeighborClassifier::load(path, NearestNeighborClassifier::DEFAULT_K));

    let classifier = match loaded {
        Some(Ok(classifier)) => classifier,
        Some(Err(e)) => {
            error!(?e, "failed to load gesture samples");
            NearestNeighborClassifier::empty(NearestNeighborClassifier::DEFAULT_K)
        }
        None => {
            info!("no gesture samples configured");
            NearestNeighborClassifier::empty(NearestNeighborClassifier::DEFAULT_K)
        }
    };
    Box::new(classifier)
}
