//! Configuration loading and management
//!
//! Defaults match the trick-capable controller; every value can be
//! overridden through a `DRONE_FUSION_*` environment variable.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::flight::PilotSettings;
use crate::intent::DEFAULT_THRESHOLD;
use crate::state::MoodSettings;

const ENV_PREFIX: &str = "DRONE_FUSION_";

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// JSON export of saved tricks
    pub tricks_path: PathBuf,

    /// Labelled gesture samples for the nearest-neighbour classifier
    pub gesture_samples: Option<PathBuf>,

    /// Minimum time between two executed commands
    pub cooldown: Duration,

    /// Similarity an intent match must exceed
    pub intent_threshold: f64,

    /// Step size and maneuver timing
    pub pilot: PilotSettings,

    /// Idle tick and mood decay thresholds
    pub mood: MoodSettings,

    /// A live `stop` command ends the session after landing
    pub stop_ends_session: bool,

    /// Record gesture labels as trick steps while recording
    pub gesture_during_recording: bool,

    /// Pause between control cycles
    pub cycle_interval: Duration,

    /// Interval between estimator samples while waiting for readiness
    pub estimator_poll: Duration,

    /// Consecutive stable samples that must be exceeded before flying
    pub stable_samples: u32,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults rooted at `data_dir`
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            tricks_path: data_dir.join("tricks.json"),
            data_dir,
            gesture_samples: None,
            cooldown: Duration::from_secs(3),
            intent_threshold: DEFAULT_THRESHOLD,
            pilot: PilotSettings::default(),
            mood: MoodSettings::default(),
            stop_ends_session: true,
            gesture_during_recording: false,
            cycle_interval: Duration::from_millis(10),
            estimator_poll: Duration::from_millis(500),
            stable_samples: 5,
        }
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = match lookup("DRONE_FUSION_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => {
                let home = lookup("HOME").context("HOME is not set")?;
                PathBuf::from(home)
                    .join(".local")
                    .join("share")
                    .join("drone-fusion")
            }
        };

        let mut config = Self::with_data_dir(data_dir);
        let env = Env { lookup: &lookup };

        if let Some(path) = env.get::<PathBuf>("TRICKS_PATH")? {
            config.tricks_path = path;
        }
        config.gesture_samples = env.get::<PathBuf>("GESTURE_SAMPLES")?;

        if let Some(cooldown) = env.secs("COOLDOWN_SECS")? {
            config.cooldown = cooldown;
        }
        if let Some(threshold) = env.get::<f64>("INTENT_THRESHOLD")? {
            if !(0.0..=1.0).contains(&threshold) {
                bail!("{ENV_PREFIX}INTENT_THRESHOLD must be within 0..=1, got {threshold}");
            }
            config.intent_threshold = threshold;
        }
        if let Some(step) = env.get::<f64>("DEFAULT_STEP")? {
            if !step.is_finite() || step <= 0.0 {
                bail!("{ENV_PREFIX}DEFAULT_STEP must be a positive distance, got {step}");
            }
            config.pilot.default_step = step;
        }
        if let Some(duration) = env.secs("MANEUVER_SECS")? {
            config.pilot.maneuver = duration;
        }
        if let Some(tick) = env.secs("IDLE_TICK_SECS")? {
            config.mood.tick = tick;
        }
        if let Some(after) = env.secs("BORED_AFTER_SECS")? {
            config.mood.bored_after = after;
        }
        if let Some(after) = env.secs("SAD_AFTER_SECS")? {
            config.mood.sad_after = after;
        }
        if let Some(flag) = env.get::<bool>("STOP_ENDS_SESSION")? {
            config.stop_ends_session = flag;
        }
        if let Some(flag) = env.get::<bool>("GESTURE_DURING_RECORDING")? {
            config.gesture_during_recording = flag;
        }
        if let Some(interval) = env.secs("CYCLE_INTERVAL_SECS")? {
            config.cycle_interval = interval;
        }
        if let Some(poll) = env.secs("ESTIMATOR_POLL_SECS")? {
            config.estimator_poll = poll;
        }
        if let Some(samples) = env.get::<u32>("STABLE_SAMPLES")? {
            config.stable_samples = samples;
        }

        Ok(config)
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::with_data_dir(PathBuf::from(".drone-fusion"))
    }
}

/// Typed access to prefixed variables
struct Env<'a, F> {
    lookup: &'a F,
}

impl<F> Env<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let key = format!("{}{}", ENV_PREFIX, name);
        match (self.lookup)(&key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
            None => Ok(None),
        }
    }

    fn secs(&self, name: &str) -> Result<Option<Duration>> {
        match self.get::<f64>(name)? {
            Some(secs) => Duration::try_from_secs_f64(secs)
                .map(Some)
                .with_context(|| format!("invalid duration for {}{}", ENV_PREFIX, name)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load_with(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_load() {
        let config = Config::load().unwrap();
        assert!(config.tricks_path.to_string_lossy().contains("drone-fusion"));
    }

    #[test]
    fn test_defaults() {
        let config = load_with(&[("HOME", "/home/pilot")]).unwrap();
        assert_eq!(
            config.data_dir,
            PathBuf::from("/home/pilot/.local/share/drone-fusion")
        );
        assert_eq!(config.cooldown, Duration::from_secs(3));
        assert_eq!(config.intent_threshold, 0.50);
        assert_eq!(config.mood.tick, Duration::from_secs(5));
        assert!(config.stop_ends_session);
        assert!(!config.gesture_during_recording);
        assert!(config.gesture_samples.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load_with(&[
            ("DRONE_FUSION_DATA_DIR", "/tmp/fusion"),
            ("DRONE_FUSION_COOLDOWN_SECS", "1.5"),
            ("DRONE_FUSION_INTENT_THRESHOLD", "0.35"),
            ("DRONE_FUSION_GESTURE_DURING_RECORDING", "true"),
            ("DRONE_FUSION_GESTURE_SAMPLES", "/tmp/samples.json"),
        ])
        .unwrap();
        assert_eq!(config.tricks_path, PathBuf::from("/tmp/fusion/tricks.json"));
        assert_eq!(config.cooldown, Duration::from_millis(1500));
        assert_eq!(config.intent_threshold, 0.35);
        assert!(config.gesture_during_recording);
        assert_eq!(
            config.gesture_samples,
            Some(PathBuf::from("/tmp/samples.json"))
        );
    }

    #[test]
    fn test_malformed_value_names_variable() {
        let err = load_with(&[("HOME", "/h"), ("DRONE_FUSION_COOLDOWN_SECS", "soon")])
            .unwrap_err();
        assert!(err.to_string().contains("DRONE_FUSION_COOLDOWN_SECS"));

        assert!(load_with(&[("HOME", "/h"), ("DRONE_FUSION_COOLDOWN_SECS", "-1")]).is_err());
    }

    #[test]
    fn test_estimator_poll_override() {
        let config = load_with(&[
            ("HOME", "/h"),
            ("DRONE_FUSION_ESTIMATOR_POLL_SECS", "0.25"),
            ("DRONE_FUSION_STABLE_SAMPLES", "3"),
        ])
        .unwrap();
        assert_eq!(config.estimator_poll, Duration::from_millis(250));
        assert_eq!(config.stable_samples, 3);
    }

    #[test]
    fn test_negative_step_rejected() {
        let err = load_with(&[("HOME", "/h"), ("DRONE_FUSION_DEFAULT_STEP", "-0.3")])
            .unwrap_err();
        assert!(err.to_string().contains("DRONE_FUSION_DEFAULT_STEP"));

        assert!(load_with(&[("HOME", "/h"), ("DRONE_FUSION_DEFAULT_STEP", "0")]).is_err());
        let config = load_with(&[("HOME", "/h"), ("DRONE_FUSION_DEFAULT_STEP", "0.3")]).unwrap();
        assert_eq!(config.pilot.default_step, 0.3);
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        for raw in ["NaN", "1.5", "-0.1"] {
            let err = load_with(&[("HOME", "/h"), ("DRONE_FUSION_INTENT_THRESHOLD", raw)])
                .unwrap_err();
            assert!(err.to_string().contains("DRONE_FUSION_INTENT_THRESHOLD"), "{raw}");
        }
    }
}
