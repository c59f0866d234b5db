//! Closed set of command kinds
//!
//! Labels coming out of the resolvers are turned into a `Command` exactly
//! once; everything downstream matches on the enum.

use crate::state::{Affect, TrickTable};

/// Label that enters trick learning mode
pub const LEARN_TRICK: &str = "learn_trick";
/// Label that finishes the trick being recorded
pub const END_TRICK: &str = "end_trick";

/// Translation directions, relative to the takeoff frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Forward,
        Direction::Back,
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Back => "back",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// Offset (dx, dy, dz) for a move of `distance` meters
    pub fn offset(&self, distance: f64) -> (f64, f64, f64) {
        match self {
            Direction::Forward => (0.0, distance, 0.0),
            Direction::Back => (0.0, -distance, 0.0),
            Direction::Left => (-distance, 0.0, 0.0),
            Direction::Right => (distance, 0.0, 0.0),
            Direction::Up => (0.0, 0.0, distance),
            Direction::Down => (0.0, 0.0, -distance),
        }
    }
}

/// Hard-coded expressive maneuvers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expression {
    Excited,
    Happy,
    Sad,
    Spin,
    Shake,
}

impl Expression {
    pub fn label(&self) -> &'static str {
        match self {
            Expression::Excited => "excited",
            Expression::Happy => "happy",
            Expression::Sad => "sad",
            Expression::Spin => "spin",
            Expression::Shake => "shake",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Takeoff,
    Land,
    /// Land and end the session loop
    Stop,
    Move(Direction),
    Expressive(Expression),
    /// Approach the operator
    ComeHere,
    LearnTrick,
    EndTrick,
    /// Replay of a saved trick
    Trick(String),
    /// Any label without a dedicated behavior
    Other(String),
}

impl Command {
    /// Resolve a label, preferring saved tricks over built-in commands
    pub fn from_label(label: &str, tricks: &TrickTable) -> Self {
        if tricks.contains(label) {
            Command::Trick(label.to_string())
        } else {
            Self::primitive(label)
        }
    }

    /// Resolve a label against the built-in commands only
    pub fn primitive(label: &str) -> Self {
        if let Some(direction) = Direction::ALL.into_iter().find(|d| d.label() == label) {
            return Command::Move(direction);
        }

        match label {
            "takeoff" => Command::Takeoff,
            "land" => Command::Land,
            "stop" => Command::Stop,
            "excited" => Command::Expressive(Expression::Excited),
            "happy" => Command::Expressive(Expression::Happy),
            "sad" => Command::Expressive(Expression::Sad),
            "spin" => Command::Expressive(Expression::Spin),
            "shake" => Command::Expressive(Expression::Shake),
            "come_here" | "come here" => Command::ComeHere,
            LEARN_TRICK => Command::LearnTrick,
            END_TRICK => Command::EndTrick,
            other => Command::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Command::Takeoff => "takeoff",
            Command::Land => "land",
            Command::Stop => "stop",
            Command::Move(direction) => direction.label(),
            Command::Expressive(expression) => expression.label(),
            Command::ComeHere => "come_here",
            Command::LearnTrick => LEARN_TRICK,
            Command::EndTrick => END_TRICK,
            Command::Trick(name) | Command::Other(name) => name,
        }
    }

    /// Mood effect of executing this command
    pub fn affect(&self) -> Affect {
        match self {
            Command::Expressive(Expression::Happy)
            | Command::Expressive(Expression::Excited)
            | Command::Expressive(Expression::Spin)
            | Command::ComeHere => Affect::Cheerful,
            Command::Land | Command::Stop => Affect::Calming,
            _ => Affect::Plain,
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Trick(name) => write!(f, "trick '{}'", name),
            other => write!(f, "{}", other.label()),
        }
    }
}
