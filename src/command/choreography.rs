//! Fixed maneuvers expressed as data
//!
//! Each step is an offset from the pose the maneuver started at, an
//! absolute heading, the duration handed to the commander and an extra
//! hold once the commander reports completion. The last step of every
//! choreography returns to the starting position at heading 0.

use std::time::Duration;

use crate::state::{IdleAction, Pose};

use super::kind::Expression;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChoreoStep {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    pub yaw: f64,
    pub duration: Duration,
    pub hold: Duration,
}

const fn step(dx: f64, dy: f64, dz: f64, yaw: f64, duration_ms: u64, hold_ms: u64) -> ChoreoStep {
    ChoreoStep {
        dx,
        dy,
        dz,
        yaw,
        duration: Duration::from_millis(duration_ms),
        hold: Duration::from_millis(hold_ms),
    }
}

const fn turn(yaw: f64, duration_ms: u64, hold_ms: u64) -> ChoreoStep {
    step(0.0, 0.0, 0.0, yaw, duration_ms, hold_ms)
}

const EXCITED: &[ChoreoStep] = &[
    step(0.0, 0.0, 0.4, 0.0, 1000, 0),
    step(0.0, 0.0, 0.0, 0.0, 1000, 1000),
];

const HAPPY: &[ChoreoStep] = &[
    step(-0.1, 0.0, 0.2, 0.0, 1000, 0),
    step(0.2, 0.0, 0.0, 0.0, 1000, 0),
    step(0.0, 0.0, 0.0, 0.0, 1000, 0),
];

const SAD: &[ChoreoStep] = &[
    step(0.0, 0.0, -0.3, 0.0, 2000, 0),
    step(0.0, 0.0, 0.0, 0.0, 2000, 0),
];

const SPIN: &[ChoreoStep] = &[
    turn(180.0, 2000, 1000),
    turn(-180.0, 2000, 1000),
    turn(0.0, 2000, 0),
];

const SHAKE: &[ChoreoStep] = &[
    turn(-30.0, 500, 0),
    turn(30.0, 500, 0),
    turn(-30.0, 500, 0),
    turn(0.0, 500, 0),
];

const YAW_SWEEP: &[ChoreoStep] = &[
    turn(180.0, 2000, 1000),
    turn(-180.0, 2000, 1000),
    turn(0.0, 1000, 2000),
];

const DROOP: &[ChoreoStep] = &[
    step(0.0, 0.0, -0.2, 0.0, 1000, 0),
    step(0.0, 0.0, 0.0, 0.0, 1000, 2000),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Choreography {
    pub name: &'static str,
    pub steps: &'static [ChoreoStep],
}

impl Choreography {
    pub fn expression(expression: Expression) -> Self {
        let steps = match expression {
            Expression::Excited => EXCITED,
            Expression::Happy => HAPPY,
            Expression::Sad => SAD,
            Expression::Spin => SPIN,
            Expression::Shake => SHAKE,
        };
        Self {
            name: expression.label(),
            steps,
        }
    }

    pub fn idle(action: IdleAction) -> Self {
        match action {
            IdleAction::YawSweep => Self {
                name: "idle_sweep",
                steps: YAW_SWEEP,
            },
            IdleAction::Droop => Self {
                name: "idle_droop",
                steps: DROOP,
            },
        }
    }

    /// Absolute, envelope-clamped targets for a maneuver starting at `base`
    pub fn targets(&self, base: Pose) -> impl Iterator<Item = (Pose, &ChoreoStep)> + '_ {
        self.steps.iter().map(move |s| {
            let target = base.offset(s.dx, s.dy, s.dz).with_yaw(s.yaw).clamped();
            (target, s)
        })
    }

    /// Wall time the maneuver occupies
    pub fn total_time(&self) -> Duration {
        self.steps.iter().map(|s| s.duration + s.hold).sum()
    }
}
