//! Mood tracking and the idle scheduler
//!
//! Mood decays only with idle time (`Happy -> Bored -> Sad`) and is lifted
//! only by executed commands. The scheduler is polled every control cycle
//! but only evaluates on its own fixed tick.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

/// Affect state driving autonomous idle behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Neutral,
    Happy,
    Bored,
    Sad,
}

impl Default for Mood {
    fn default() -> Self {
        Self::Neutral
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mood::Neutral => write!(f, "neutral"),
            Mood::Happy => write!(f, "happy"),
            Mood::Bored => write!(f, "bored"),
            Mood::Sad => write!(f, "sad"),
        }
    }
}

/// How an executed command affects mood
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affect {
    /// Playful commands lift mood to Happy
    Cheerful,
    /// Landing settles mood back to Neutral
    Calming,
    /// Anything else only recovers a decayed mood
    Plain,
}

/// Autonomous maneuver requested by an idle tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleAction {
    /// Full yaw oscillation while bored
    YawSweep,
    /// Small descent and recovery while sad
    Droop,
}

/// Result of one evaluated idle tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleTick {
    /// Mood change caused by this tick, as (from, to)
    pub transition: Option<(Mood, Mood)>,
    /// Maneuver to fly, only produced when airborne
    pub action: Option<IdleAction>,
}

/// Timing of the idle scheduler
#[derive(Debug, Clone, Copy)]
pub struct MoodSettings {
    pub tick: Duration,
    pub bored_after: Duration,
    pub sad_after: Duration,
}

impl Default for MoodSettings {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(5),
            bored_after: Duration::from_secs(20),
            sad_after: Duration::from_secs(40),
        }
    }
}

pub struct MoodScheduler {
    mood: Mood,
    settings: MoodSettings,
    last_interaction: Instant,
    next_tick: Instant,
}

impl MoodScheduler {
    pub fn new(settings: MoodSettings, now: Instant) -> Self {
        Self {
            mood: Mood::Neutral,
            settings,
            last_interaction: now,
            next_tick: now + settings.tick,
        }
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    /// Register an executed command; returns the mood change if any
    pub fn record_interaction(&mut self, now: Instant, affect: Affect) -> Option<(Mood, Mood)> {
        self.last_interaction = now;

        let next = match affect {
            Affect::Cheerful => Mood::Happy,
            Affect::Calming => Mood::Neutral,
            Affect::Plain => match self.mood {
                Mood::Bored | Mood::Sad => Mood::Neutral,
                other => other,
            },
        };

        self.set(next)
    }

    /// Evaluate the idle tick if it is due
    pub fn poll(&mut self, now: Instant, airborne: bool) -> Option<IdleTick> {
        if now < self.next_tick {
            return None;
        }
        self.next_tick = now + self.settings.tick;

        let idle = now.saturating_duration_since(self.last_interaction);
        debug!(idle_secs = idle.as_secs_f64(), mood = %self.mood, "idle tick");

        let next = if idle > self.settings.bored_after && self.mood == Mood::Happy {
            Mood::Bored
        } else if idle > self.settings.sad_after && self.mood == Mood::Bored {
            Mood::Sad
        } else {
            self.mood
        };
        let transition = self.set(next);

        let action = if airborne {
            match self.mood {
                Mood::Bored => Some(IdleAction::YawSweep),
                Mood::Sad => Some(IdleAction::Droop),
                Mood::Neutral | Mood::Happy => None,
            }
        } else {
            None
        };

        Some(IdleTick { transition, action })
    }

    fn set(&mut self, next: Mood) -> Option<(Mood, Mood)> {
        let previous = self.mood;
        self.mood = next;
        (previous != next).then_some((previous, next))
    }
}
