//! Machine state replay

use serde::{Deserialize, Serialize};

use crate::command::{Command, CommandKind};

/// Tolerance for positional and extrusion comparisons, in millimeters
pub const EPSILON: f64 = 1e-6;

/// The accumulated effect of a command subsequence
///
/// MachineState is always derived by replaying a command sequence from the
/// defined initial state (all zero, absolute modes); it is never stored
/// independently of the sequence it summarizes, except as a cached
/// extraction result. The E register is normalized to an absolute filament
/// length even when the stream itself runs in relative-E mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MachineState {
    /// Current absolute X position
    pub x: f64,
    /// Current absolute Y position
    pub y: f64,
    /// Current absolute Z position
    pub z: f64,
    /// Current absolute E register value
    pub e: f64,
    /// Current feed rate (mm/min)
    pub feed_rate: f64,
    /// True if the last filament move was a retraction not yet undone
    pub retracted: bool,
    /// Effective XYZ distance mode (G90 = true)
    pub absolute_xyz: bool,
    /// Effective E distance mode (M82 = true)
    pub absolute_e: bool,
    /// True once an X or Y word has been observed
    pub position_known: bool,
}

impl Default for MachineState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            e: 0.0,
            feed_rate: 0.0,
            retracted: false,
            absolute_xyz: true,
            absolute_e: true,
            position_known: false,
        }
    }
}

impl MachineState {
    /// Create the defined initial state (all zero, absolute modes)
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one command into this state
    pub fn apply(&mut self, cmd: &Command) {
        self.absolute_xyz = cmd.absolute_xyz;
        self.absolute_e = cmd.absolute_e;

        match cmd.kind {
            CommandKind::PositionReset => {
                // G92 sets registers directly; values are always absolute
                if let Some(x) = cmd.x {
                    self.x = x;
                    self.position_known = true;
                }
                if let Some(y) = cmd.y {
                    self.y = y;
                    self.position_known = true;
                }
                if let Some(z) = cmd.z {
                    self.z = z;
                }
                if let Some(e) = cmd.e {
                    self.e = e;
                }
            }
            CommandKind::TravelMove | CommandKind::ExtrusionMove | CommandKind::Retraction => {
                if let Some(f) = cmd.f {
                    self.feed_rate = f;
                }
                if let Some(x) = cmd.x {
                    self.x = if self.absolute_xyz { x } else { self.x + x };
                    self.position_known = true;
                }
                if let Some(y) = cmd.y {
                    self.y = if self.absolute_xyz { y } else { self.y + y };
                    self.position_known = true;
                }
                if let Some(z) = cmd.z {
                    self.z = if self.absolute_xyz { z } else { self.z + z };
                }
                if let Some(e) = cmd.e {
                    let new_e = if self.absolute_e { e } else { self.e + e };
                    let delta = new_e - self.e;
                    if delta < -EPSILON {
                        self.retracted = true;
                    } else if delta > EPSILON {
                        self.retracted = false;
                    }
                    self.e = new_e;
                }
            }
            CommandKind::LayerChange | CommandKind::Other => {
                if let Some(f) = cmd.f {
                    self.feed_rate = f;
                }
            }
        }
    }

    /// Derive the state reached by replaying commands from the initial state
    pub fn replay<'a>(commands: impl IntoIterator<Item = &'a Command>) -> Self {
        Self::replay_from(Self::new(), commands)
    }

    /// Derive the state reached by replaying commands from a given state
    pub fn replay_from<'a>(
        mut state: Self,
        commands: impl IntoIterator<Item = &'a Command>,
    ) -> Self {
        for cmd in commands {
            state.apply(cmd);
        }
        state
    }

    /// Compare X, Y, Z, E, and the retraction flag against another state
    ///
    /// Feed rate and modes are deliberately excluded; the first real move of
    /// the following section restores its own feed rate.
    pub fn matches_position(&self, other: &Self, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.z - other.z).abs() <= tolerance
            && (self.e - other.e).abs() <= tolerance
            && self.retracted == other.retracted
    }
}
