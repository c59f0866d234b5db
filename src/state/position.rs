//! Commanded setpoint tracking
//!
//! The controller never reads the aircraft's estimated pose during flight;
//! it tracks the last setpoint it commanded and keeps that setpoint inside
//! a fixed indoor flight envelope.

use serde::{Deserialize, Serialize};

/// Horizontal envelope half-width in meters (applies to x and y)
pub const HORIZONTAL_LIMIT: f64 = 1.5;
/// Lowest commanded altitude in meters
pub const MIN_ALTITUDE: f64 = 0.1;
/// Highest commanded altitude in meters
pub const MAX_ALTITUDE: f64 = 1.5;
/// Altitude used for the first takeoff
pub const DEFAULT_ALTITUDE: f64 = 0.5;

/// A position setpoint with heading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Heading in degrees
    pub yaw: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, z: f64, yaw: f64) -> Self {
        Self { x, y, z, yaw }
    }

    /// Translate by an offset, keeping the heading
    pub fn offset(&self, dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
            yaw: self.yaw,
        }
    }

    /// Same position with a different heading
    pub fn with_yaw(&self, yaw: f64) -> Self {
        Self { yaw, ..*self }
    }

    /// Project the pose into the flight envelope
    pub fn clamped(&self) -> Self {
        Self {
            x: self.x.clamp(-HORIZONTAL_LIMIT, HORIZONTAL_LIMIT),
            y: self.y.clamp(-HORIZONTAL_LIMIT, HORIZONTAL_LIMIT),
            z: self.z.clamp(MIN_ALTITUDE, MAX_ALTITUDE),
            yaw: self.yaw,
        }
    }

    pub fn is_within_envelope(&self) -> bool {
        (-HORIZONTAL_LIMIT..=HORIZONTAL_LIMIT).contains(&self.x)
            && (-HORIZONTAL_LIMIT..=HORIZONTAL_LIMIT).contains(&self.y)
            && (MIN_ALTITUDE..=MAX_ALTITUDE).contains(&self.z)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(0.0, 0.0, DEFAULT_ALTITUDE, 0.0)
    }
}

impl std::fmt::Display for Pose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.2}, {:.2}, {:.2}) yaw {:.0}°",
            self.x, self.y, self.z, self.yaw
        )
    }
}

/// Last commanded setpoint plus whether the aircraft is flying
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PositionState {
    pose: Pose,
    airborne: bool,
}

impl PositionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn is_airborne(&self) -> bool {
        self.airborne
    }

    /// Store a new setpoint, clamped into the envelope, and return it
    pub fn set_pose(&mut self, pose: Pose) -> Pose {
        self.pose = pose.clamped();
        self.pose
    }

    /// Called only after a takeoff or land call has completed
    pub fn set_airborne(&mut self, airborne: bool) {
        self.airborne = airborne;
    }
}
