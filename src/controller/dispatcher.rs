//! Per-cycle command fusion and dispatch
//!
//! One call to `Controller::cycle` is one dispatch decision:
//! 1. Resolve the drained utterance and frame
//! 2. Let the trick recorder intercept authoring input
//! 3. Arbitrate (voice beats gesture) and apply the cooldown gate
//! 4. Execute directly or replay a saved trick
//! 5. Evaluate the idle scheduler

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::command::{Choreography, Command, ResolvedCommand};
use crate::config::Config;
use crate::events::ControllerEvent;
use crate::flight::{Execution, FlightCommander, FlightError, Pilot};
use crate::gesture::GestureResolver;
use crate::input::CycleInput;
use crate::intent::IntentResolver;
use crate::state::{
    Mood, MoodScheduler, MoodSettings, PositionState, RecorderOutcome, RecorderState,
    TrickRecorder, TrickTable,
};

#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    pub cooldown: Duration,
    pub stop_ends_session: bool,
    pub gesture_during_recording: bool,
    pub mood: MoodSettings,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ControllerSettings {
    fn from(config: &Config) -> Self {
        Self {
            cooldown: config.cooldown,
            stop_ends_session: config.stop_ends_session,
            gesture_during_recording: config.gesture_during_recording,
            mood: config.mood,
        }
    }
}

/// Whether the control loop should keep running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Continue,
    Stop,
}

pub struct Controller<F> {
    settings: ControllerSettings,
    pilot: Pilot<F>,
    intents: IntentResolver,
    gestures: GestureResolver,
    recorder: TrickRecorder,
    tricks: TrickTable,
    mood: MoodScheduler,
    last_execution: Option<Instant>,
    event_tx: broadcast::Sender<ControllerEvent>,
}

impl<F: FlightCommander> Controller<F> {
    pub fn new(
        settings: ControllerSettings,
        pilot: Pilot<F>,
        intents: IntentResolver,
        gestures: GestureResolver,
        event_tx: broadcast::Sender<ControllerEvent>,
        now: Instant,
    ) -> Self {
        Self {
            settings,
            pilot,
            intents,
            gestures,
            recorder: TrickRecorder::new(),
            tricks: TrickTable::new(),
            mood: MoodScheduler::new(settings.mood, now),
            last_execution: None,
            event_tx,
        }
    }

    /// Adopt previously exported tricks and make their names recognizable
    pub fn load_tricks(&mut self, tricks: TrickTable) {
        for trick in tricks.iter() {
            self.intents.register(&trick.name, [trick.name.as_str()]);
            self.tricks.insert(trick.clone());
        }
        info!(count = self.tricks.len(), "tricks available");
    }

    pub fn tricks(&self) -> &TrickTable {
        &self.tricks
    }

    pub fn position(&self) -> &PositionState {
        self.pilot.position()
    }

    pub fn mood(&self) -> Mood {
        self.mood.mood()
    }

    pub fn recorder_state(&self) -> RecorderState {
        self.recorder.state()
    }

    pub fn last_execution(&self) -> Option<Instant> {
        self.last_execution
    }

    pub fn intents(&self) -> &IntentResolver {
        &self.intents
    }

    pub(super) fn pilot_mut(&mut self) -> &mut Pilot<F> {
        &mut self.pilot
    }

    pub(super) fn emit(&self, event: ControllerEvent) {
        debug!(?event, "emitting controller event");
        let _ = self.event_tx.send(event);
    }

    /// Run one dispatch cycle over the drained input
    pub async fn cycle(&mut self, input: CycleInput, now: Instant) -> Result<CycleOutcome, FlightError> {
        let text = input
            .utterance
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        if let Some(text) = text {
            self.emit(ControllerEvent::Heard {
                text: text.to_string(),
            });
        }

        let voice = text.and_then(|t| self.intents.resolve(t));
        let recording = self.recorder_state();
        let gesture = match (recording, input.frame.as_ref()) {
            (RecorderState::Idle, Some(frame)) => self.gestures.resolve(frame),
            (RecorderState::Recording, Some(frame)) if self.settings.gesture_during_recording => {
                self.gestures.resolve(frame)
            }
            _ => None,
        };

        let recorder_label = match recording {
            RecorderState::Recording => voice.as_ref().or(gesture.as_ref()),
            _ => voice.as_ref(),
        }
        .map(|c| c.label.as_str());

        let outcome = self.recorder.observe(text, recorder_label);
        let result = if outcome.is_intercepted() {
            self.apply_recorder(outcome);
            CycleOutcome::Continue
        } else {
            if voice.is_some() && gesture.is_some() {
                debug!("voice and gesture in one cycle, gesture discarded");
            }
            match voice.or(gesture) {
                Some(fused) => self.dispatch(fused, now).await?,
                None => CycleOutcome::Continue,
            }
        };

        self.run_idle(now).await?;
        Ok(result)
    }

    /// Land if needed and discard unfinished authoring. Runs on every
    /// session exit path.
    pub async fn teardown(&mut self) -> Result<(), FlightError> {
        if self.recorder.reset() {
            self.emit(ControllerEvent::TrickDiscarded);
        }
        if self.pilot.land_if_airborne().await? {
            self.emit(ControllerEvent::Landed);
        }
        Ok(())
    }

    async fn dispatch(&mut self, fused: ResolvedCommand, now: Instant) -> Result<CycleOutcome, FlightError> {
        let command = Command::from_label(&fused.label, &self.tricks);
        if matches!(command, Command::LearnTrick | Command::EndTrick) {
            info!(%command, "not recording a trick, ignoring");
            return Ok(CycleOutcome::Continue);
        }

        if let Some(last) = self.last_execution() {
            let elapsed = now.saturating_duration_since(last);
            if elapsed <= self.settings.cooldown {
                let remaining = self.settings.cooldown - elapsed;
                debug!(%command, remaining_ms = remaining.as_millis() as u64, "cooldown, dropping command");
                return Ok(CycleOutcome::Continue);
            }
        }
        self.last_execution = Some(now);

        self.emit(ControllerEvent::CommandRecognized {
            source: fused.source,
            label: fused.label.clone(),
            confidence: fused.confidence,
            modifier: fused.modifier,
        });

        let execution = match &command {
            Command::Trick(name) => {
                self.replay(name, fused.modifier).await?;
                None
            }
            primitive => Some(self.execute(primitive, fused.modifier).await?),
        };

        if let Some((from, to)) = self.mood.record_interaction(now, command.affect()) {
            info!(%from, %to, "mood changed");
            self.emit(ControllerEvent::MoodChanged { from, to });
        }

        let landed = matches!(execution, Some(Execution::Landed));
        if command == Command::Stop && landed && self.settings.stop_ends_session {
            info!("stop command, ending session");
            return Ok(CycleOutcome::Stop);
        }
        Ok(CycleOutcome::Continue)
    }

    /// Replay a saved trick through the primitive path; steps are not
    /// cooldown-gated and share the invocation's distance modifier
    async fn replay(&mut self, name: &str, modifier: Option<f64>) -> Result<(), FlightError> {
        let steps = match self.tricks.get(name) {
            Some(trick) => trick.steps.clone(),
            None => return Ok(()),
        };

        info!(%name, steps = steps.len(), "performing learned trick");
        self.emit(ControllerEvent::TrickStarted {
            name: name.to_string(),
            steps: steps.len(),
        });

        for step in &steps {
            let command = Command::primitive(step);
            debug!(%command, "trick step");
            self.execute(&command, modifier).await?;
        }
        Ok(())
    }

    async fn execute(&mut self, command: &Command, modifier: Option<f64>) -> Result<Execution, FlightError> {
        let execution = self.pilot.execute(command, modifier).await?;
        match &execution {
            Execution::TookOff { height } => self.emit(ControllerEvent::TookOff { height: *height }),
            Execution::Landed => self.emit(ControllerEvent::Landed),
            Execution::Skipped(reason) => info!(%command, %reason, "command skipped"),
            _ => {}
        }
        Ok(execution)
    }

    fn apply_recorder(&mut self, outcome: RecorderOutcome) {
        match outcome {
            RecorderOutcome::Started => self.emit(ControllerEvent::LearningStarted),
            RecorderOutcome::Named(name) => self.emit(ControllerEvent::TrickNamed { name }),
            RecorderOutcome::StepRecorded { name, step } => {
                debug!(%name, steps = self.recorder.pending_steps().len(), "trick in progress");
                self.emit(ControllerEvent::StepRecorded { name, step })
            }
            RecorderOutcome::Saved(trick) => {
                self.intents.register(&trick.name, [trick.name.as_str()]);
                let event = ControllerEvent::TrickSaved {
                    name: trick.name.clone(),
                    steps: trick.steps.len(),
                };
                if self.tricks.insert(trick) {
                    info!("existing trick overwritten");
                }
                self.emit(event);
            }
            RecorderOutcome::Discarded => {
                warn!("trick discarded");
                self.emit(ControllerEvent::TrickDiscarded);
            }
            RecorderOutcome::Ignored | RecorderOutcome::Passthrough => {}
        }
    }

    async fn run_idle(&mut self, now: Instant) -> Result<(), FlightError> {
        let airborne = self.pilot.position().is_airborne();
        let tick = match self.mood.poll(now, airborne) {
            Some(tick) => tick,
            None => return Ok(()),
        };

        if let Some((from, to)) = tick.transition {
            info!(%from, %to, "mood decayed");
            self.emit(ControllerEvent::MoodChanged { from, to });
        }
        if let Some(action) = tick.action {
            self.pilot.perform(&Choreography::idle(action)).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{ClassifierError, Source};
    use crate::flight::recording::{FlightCall, RecordingCommander};
    use crate::flight::PilotSettings;
    use crate::gesture::{FeatureVector, GestureClassifier, FEATURE_LEN};
    use crate::intent::DEFAULT_THRESHOLD;
    use crate::state::{Pose, TrickDefinition};

    struct FixedGesture(&'static str);

    impl GestureClassifier for FixedGesture {
        fn classify(&self, _features: &[f64; FEATURE_LEN]) -> Result<String, ClassifierError> {
            Ok(self.0.to_string())
        }
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn frame() -> FeatureVector {
        FeatureVector::new(vec![0.25; FEATURE_LEN])
    }

    fn said(text: &str) -> CycleInput {
        CycleInput {
            utterance: Some(text.to_string()),
            frame: None,
        }
    }

    fn setup(
        settings: ControllerSettings,
        gesture: &'static str,
        start: Instant,
    ) -> (
        Controller<RecordingCommander>,
        broadcast::Receiver<ControllerEvent>,
    ) {
        let (tx, rx) = broadcast::channel(64);
        let controller = Controller::new(
            settings,
            Pilot::new(RecordingCommander::new(), PilotSettings::default()),
            IntentResolver::with_threshold(DEFAULT_THRESHOLD),
            GestureResolver::new(Box::new(FixedGesture(gesture))),
            tx,
            start,
        );
        (controller, rx)
    }

    fn drain(rx: &mut broadcast::Receiver<ControllerEvent>) -> Vec<ControllerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn flight(controller: &mut Controller<RecordingCommander>) -> &RecordingCommander {
        controller.pilot_mut().flight()
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_drops_second_command() {
        let start = Instant::now();
        let (mut controller, mut rx) = setup(ControllerSettings::default(), "none", start);

        controller.cycle(said("take off"), start).await.unwrap();
        controller.cycle(said("go up"), start + secs(1)).await.unwrap();

        assert!(controller.position().is_airborne());
        assert_eq!(controller.last_execution(), Some(start));
        assert!(flight(&mut controller).targets().is_empty());

        // the dropped command leaves no telemetry beyond what was heard
        let events = drain(&mut rx);
        assert!(!events.iter().any(|e| matches!(
            e,
            ControllerEvent::CommandRecognized { label, .. } if label == "up"
        )));
        assert!(events.contains(&ControllerEvent::Heard {
            text: "go up".to_string()
        }));

        // gate reopens only strictly after the cooldown
        controller.cycle(said("go up"), start + secs(3)).await.unwrap();
        assert!(flight(&mut controller).targets().is_empty());
        controller.cycle(said("go up"), start + secs(4)).await.unwrap();
        assert_eq!(flight(&mut controller).targets(), vec![Pose::new(0.0, 0.0, 0.8, 0.0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_voice_beats_gesture() {
        let start = Instant::now();
        let (mut controller, mut rx) = setup(ControllerSettings::default(), "land", start);

        controller.cycle(said("take off"), start).await.unwrap();
        drain(&mut rx);

        let input = CycleInput {
            utterance: Some("go up".to_string()),
            frame: Some(frame()),
        };
        controller.cycle(input, start + secs(4)).await.unwrap();

        assert!(controller.position().is_airborne());
        assert_eq!(controller.position().pose().z, 0.8);
        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            ControllerEvent::CommandRecognized { source: Source::Voice, label, .. } if label == "up"
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gesture_alone_dispatches() {
        let start = Instant::now();
        let (mut controller, _rx) = setup(ControllerSettings::default(), "takeoff", start);

        let input = CycleInput {
            utterance: None,
            frame: Some(frame()),
        };
        controller.cycle(input, start).await.unwrap();

        assert!(controller.position().is_airborne());
        assert_eq!(
            flight(&mut controller).count(|c| matches!(c, FlightCall::Takeoff { .. })),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_movement_on_ground_is_skipped() {
        let start = Instant::now();
        let (mut controller, _rx) = setup(ControllerSettings::default(), "none", start);

        controller.cycle(said("go forward"), start).await.unwrap();

        assert!(flight(&mut controller).calls.is_empty());
        assert_eq!(controller.position().pose(), Pose::default());
        // the admitted command still consumed the cooldown window
        assert_eq!(controller.last_execution(), Some(start));
    }

    #[tokio::test(start_paused = true)]
    async fn test_distance_modifier_applies() {
        let start = Instant::now();
        let (mut controller, _rx) = setup(ControllerSettings::default(), "none", start);

        controller.cycle(said("take off"), start).await.unwrap();
        controller
            .cycle(said("go right 1"), start + secs(4))
            .await
            .unwrap();

        assert_eq!(controller.position().pose(), Pose::new(1.0, 0.0, 0.5, 0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_learn_and_replay_trick() {
        let start = Instant::now();
        let (mut controller, mut rx) = setup(ControllerSettings::default(), "none", start);

        controller.cycle(said("take off"), start).await.unwrap();
        controller
            .cycle(said("learn a new trick"), start + secs(1))
            .await
            .unwrap();
        assert_eq!(controller.recorder_state(), RecorderState::AwaitingName);

        controller.cycle(said("loop"), start + secs(2)).await.unwrap();
        controller.cycle(said("go forward"), start + secs(3)).await.unwrap();
        controller.cycle(said("go forward"), start + secs(4)).await.unwrap();
        controller.cycle(said("go up"), start + secs(5)).await.unwrap();

        // recording never actuates
        assert!(flight(&mut controller).targets().is_empty());

        controller.cycle(said("end trick"), start + secs(6)).await.unwrap();
        assert_eq!(controller.recorder_state(), RecorderState::Idle);
        assert_eq!(
            controller.tricks().get("loop"),
            Some(&TrickDefinition {
                name: "loop".to_string(),
                steps: vec!["forward".into(), "forward".into(), "up".into()],
            })
        );
        assert!(controller.intents().vocabulary().contains("loop"));

        controller.cycle(said("loop"), start + secs(10)).await.unwrap();

        assert_eq!(controller.position().pose(), Pose::new(0.0, 0.6, 0.8, 0.0));
        assert_eq!(flight(&mut controller).targets().len(), 3);

        let events = drain(&mut rx);
        assert!(events.contains(&ControllerEvent::LearningStarted));
        assert!(events.contains(&ControllerEvent::TrickSaved {
            name: "loop".to_string(),
            steps: 3,
        }));
        assert!(events.contains(&ControllerEvent::TrickStarted {
            name: "loop".to_string(),
            steps: 3,
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_modifier_applies_to_every_step() {
        let start = Instant::now();
        let (mut controller, mut rx) = setup(ControllerSettings::default(), "none", start);

        controller.cycle(said("take off"), start).await.unwrap();
        controller
            .cycle(said("learn a new trick"), start + secs(1))
            .await
            .unwrap();
        controller.cycle(said("loop"), start + secs(2)).await.unwrap();
        controller.cycle(said("go forward"), start + secs(3)).await.unwrap();
        controller.cycle(said("go up"), start + secs(4)).await.unwrap();
        controller.cycle(said("end trick"), start + secs(5)).await.unwrap();
        drain(&mut rx);

        controller.cycle(said("loop 2"), start + secs(10)).await.unwrap();

        // both steps move 2 m and each target is clamped to the envelope
        assert_eq!(
            flight(&mut controller).targets(),
            vec![Pose::new(0.0, 1.5, 0.5, 0.0), Pose::new(0.0, 1.5, 1.5, 0.0)]
        );
        assert_eq!(controller.position().pose(), Pose::new(0.0, 1.5, 1.5, 0.0));

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            ControllerEvent::CommandRecognized { label, modifier: Some(m), .. }
                if label == "loop" && *m == 2.0
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gesture_ignored_while_recording() {
        let start = Instant::now();
        let (mut controller, mut rx) = setup(ControllerSettings::default(), "forward", start);

        controller
            .cycle(said("learn a new trick"), start)
            .await
            .unwrap();
        controller.cycle(said("wave"), start + secs(1)).await.unwrap();

        let gesture_only = CycleInput {
            utterance: None,
            frame: Some(frame()),
        };
        controller
            .cycle(gesture_only.clone(), start + secs(2))
            .await
            .unwrap();
        controller.cycle(said("end trick"), start + secs(3)).await.unwrap();

        let events = drain(&mut rx);
        assert!(!events
            .iter()
            .any(|e| matches!(e, ControllerEvent::StepRecorded { .. })));
        assert!(events.contains(&ControllerEvent::TrickDiscarded));
        assert!(controller.tricks().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_gesture_recorded_when_enabled() {
        let start = Instant::now();
        let settings = ControllerSettings {
            gesture_during_recording: true,
            ..ControllerSettings::default()
        };
        let (mut controller, _rx) = setup(settings, "forward", start);

        controller
            .cycle(said("learn a new trick"), start)
            .await
            .unwrap();
        controller.cycle(said("wave"), start + secs(1)).await.unwrap();
        let gesture_only = CycleInput {
            utterance: None,
            frame: Some(frame()),
        };
        controller.cycle(gesture_only, start + secs(2)).await.unwrap();
        controller.cycle(said("end trick"), start + secs(3)).await.unwrap();

        assert_eq!(
            controller.tricks().get("wave").map(|t| t.steps.clone()),
            Some(vec!["forward".to_string()])
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_trick_outside_recording_is_noop() {
        let start = Instant::now();
        let (mut controller, _rx) = setup(ControllerSettings::default(), "none", start);

        let outcome = controller.cycle(said("end trick"), start).await.unwrap();

        assert_eq!(outcome, CycleOutcome::Continue);
        assert!(controller.last_execution().is_none());
        assert!(flight(&mut controller).calls.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_session_after_landing() {
        let start = Instant::now();
        let (mut controller, _rx) = setup(ControllerSettings::default(), "none", start);

        // nothing to land yet, keep going
        let outcome = controller.cycle(said("stop"), start).await.unwrap();
        assert_eq!(outcome, CycleOutcome::Continue);

        controller.cycle(said("take off"), start + secs(4)).await.unwrap();
        let outcome = controller.cycle(said("halt"), start + secs(8)).await.unwrap();

        assert_eq!(outcome, CycleOutcome::Stop);
        assert!(!controller.position().is_airborne());
        assert_eq!(
            flight(&mut controller).count(|c| matches!(c, FlightCall::Land { .. })),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_continues_when_configured() {
        let start = Instant::now();
        let settings = ControllerSettings {
            stop_ends_session: false,
            ..ControllerSettings::default()
        };
        let (mut controller, _rx) = setup(settings, "none", start);

        controller.cycle(said("take off"), start).await.unwrap();
        let outcome = controller.cycle(said("stop"), start + secs(4)).await.unwrap();

        assert_eq!(outcome, CycleOutcome::Continue);
        assert!(!controller.position().is_airborne());
    }

    #[tokio::test(start_paused = true)]
    async fn test_bored_drone_sweeps_yaw() {
        let start = Instant::now();
        let (mut controller, mut rx) = setup(ControllerSettings::default(), "none", start);

        controller.cycle(said("take off"), start).await.unwrap();
        controller.cycle(said("be happy"), start + secs(4)).await.unwrap();
        assert_eq!(controller.mood(), Mood::Happy);
        let before = flight(&mut controller).targets().len();

        controller
            .cycle(CycleInput::default(), start + secs(30))
            .await
            .unwrap();

        assert_eq!(controller.mood(), Mood::Bored);
        let after = flight(&mut controller).targets();
        assert!(after.len() > before);
        assert!(after[before..].iter().any(|pose| pose.yaw != 0.0));
        // idle maneuvers leave the setpoint alone
        assert_eq!(controller.position().pose().yaw, 0.0);

        let events = drain(&mut rx);
        assert!(events.contains(&ControllerEvent::MoodChanged {
            from: Mood::Happy,
            to: Mood::Bored,
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_tricks_registers_names() {
        let start = Instant::now();
        let (mut controller, _rx) = setup(ControllerSettings::default(), "none", start);

        let mut table = TrickTable::new();
        table.insert(TrickDefinition {
            name: "hop".to_string(),
            steps: vec!["up".into(), "down".into()],
        });
        controller.load_tricks(table);

        assert!(controller.intents().vocabulary().contains("hop"));
        controller.cycle(said("take off"), start).await.unwrap();
        controller.cycle(said("hop"), start + secs(4)).await.unwrap();

        let targets = flight(&mut controller).targets();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[1], Pose::new(0.0, 0.0, 0.5, 0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_lands_and_discards() {
        let start = Instant::now();
        let (mut controller, mut rx) = setup(ControllerSettings::default(), "none", start);

        controller.cycle(said("take off"), start).await.unwrap();
        controller
            .cycle(said("learn a new trick"), start + secs(1))
            .await
            .unwrap();
        drain(&mut rx);

        controller.teardown().await.unwrap();

        assert!(!controller.position().is_airborne());
        assert_eq!(controller.recorder_state(), RecorderState::Idle);
        let events = drain(&mut rx);
        assert!(events.contains(&ControllerEvent::TrickDiscarded));
        assert!(events.contains(&ControllerEvent::Landed));
    }
}
