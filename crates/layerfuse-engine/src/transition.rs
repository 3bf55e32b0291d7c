//! Inter-section transition synthesis

use layerfuse_core::{Command, MachineState, EPSILON};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TransitionError;

/// Settings governing synthesized transitions
///
/// Speeds are mm/min. Defaults follow common slicer values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransitionSettings {
    /// Height to lift above the exit Z before travelling (mm)
    pub z_hop: f64,
    /// Filament length pulled back before travel (mm)
    pub retraction_distance: f64,
    /// XY travel speed
    pub travel_speed: f64,
    /// Retraction speed
    pub retract_speed: f64,
    /// De-retraction (prime) speed
    pub prime_speed: f64,
    /// Z move speed
    pub z_speed: f64,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            z_hop: 0.4,
            retraction_distance: 4.5,
            travel_speed: 7200.0,
            retract_speed: 2100.0,
            prime_speed: 2100.0,
            z_speed: 600.0,
        }
    }
}

/// Bridging content inserted between two adjacent sections
///
/// Post-condition: replaying `commands` from `from` yields a machine state
/// equal to `to` in X, Y, Z, E, and the retraction flag. Feed rate is
/// allowed to differ; the next section's first real move resets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    /// Exit state of the preceding section
    pub from: MachineState,
    /// Entry state of the following section
    pub to: MachineState,
    /// Synthesized bridging commands
    pub commands: Vec<Command>,
}

/// Transition calculator
///
/// Synthesizes the minimal retraction-safe, collision-safe,
/// extrusion-continuous command sequence bridging one section's exit state
/// to the next section's entry state.
pub struct TransitionCalculator {
    settings: TransitionSettings,
}

impl TransitionCalculator {
    /// Create a calculator with the given settings
    pub fn new(settings: TransitionSettings) -> Self {
        Self { settings }
    }

    /// The active transition settings
    pub fn settings(&self) -> &TransitionSettings {
        &self.settings
    }

    /// Compute the bridging sequence from `exit` to `entry`
    ///
    /// Steps, in fixed order:
    /// 1. Retract, unless the exit state is already retracted
    /// 2. Z-hop above the exit height
    /// 3. XY travel to the entry position at the hopped height
    /// 4. Z move down to the entry height exactly (layer-height differences
    ///    between sections are absorbed here)
    /// 5. De-retract if the entry state is unretracted, then reset the E
    ///    register to the entry value with G92
    pub fn compute(
        &self,
        exit: &MachineState,
        entry: &MachineState,
    ) -> Result<Transition, TransitionError> {
        if !exit.position_known {
            return Err(TransitionError::MissingPosition {
                endpoint: "exit".to_string(),
            });
        }
        if !entry.position_known {
            return Err(TransitionError::MissingPosition {
                endpoint: "entry".to_string(),
            });
        }

        let s = &self.settings;
        let mut commands = vec![
            Command::comment("---------- TRANSITION CODE START ----------"),
            state_comment("Previous section ended at", exit),
            state_comment("Next section starts at", entry),
        ];

        // The synthesized moves are absolute; restore absolute modes first
        // if the previous section left the machine in relative mode.
        if !exit.absolute_xyz {
            commands.push(Command::absolute_motion());
        }
        if !exit.absolute_e {
            commands.push(Command::absolute_extrusion());
        }

        let mut current_e = exit.e;
        if !exit.retracted {
            current_e -= s.retraction_distance;
            commands.push(Command::retract_to(current_e, s.retract_speed));
        }

        commands.push(Command::travel_z(exit.z + s.z_hop, s.z_speed));
        commands.push(Command::travel_xy(entry.x, entry.y, s.travel_speed));
        commands.push(Command::travel_z(entry.z, s.z_speed));

        if !entry.retracted {
            current_e += s.retraction_distance;
            commands.push(Command::prime_to(current_e, s.prime_speed));
        }
        commands.push(Command::reset_e(entry.e));
        commands.push(Command::comment("---------- TRANSITION CODE END ----------"));

        let replayed = MachineState::replay_from(*exit, &commands);
        verify_post_condition(&replayed, entry)?;

        debug!(
            "Synthesized transition: ({:.3}, {:.3}, {:.3}) -> ({:.3}, {:.3}, {:.3}), {} commands",
            exit.x,
            exit.y,
            exit.z,
            entry.x,
            entry.y,
            entry.z,
            commands.len()
        );

        Ok(Transition {
            from: *exit,
            to: *entry,
            commands,
        })
    }
}

/// Check the core correctness property of the whole engine: the replayed
/// state equals the entry state in X, Y, Z, E, and retraction flag
fn verify_post_condition(
    replayed: &MachineState,
    entry: &MachineState,
) -> Result<(), TransitionError> {
    let axes = [
        ('X', entry.x, replayed.x),
        ('Y', entry.y, replayed.y),
        ('Z', entry.z, replayed.z),
        ('E', entry.e, replayed.e),
    ];
    for (axis, expected, actual) in axes {
        if (expected - actual).abs() > EPSILON {
            return Err(TransitionError::PostCondition {
                axis,
                expected,
                actual,
            });
        }
    }
    if replayed.retracted != entry.retracted {
        return Err(TransitionError::PostCondition {
            axis: 'R',
            expected: if entry.retracted { 1.0 } else { 0.0 },
            actual: if replayed.retracted { 1.0 } else { 0.0 },
        });
    }
    Ok(())
}

/// Aligned from/to state comment, matching the upstream transition block
/// layout
fn state_comment(label: &str, state: &MachineState) -> Command {
    Command::comment(format!(
        "{:<34}X{:>10.3} Y{:>10.3} Z{:>11.3} E{:>13.5}",
        format!("{}:", label),
        state.x,
        state.y,
        state.z,
        state.e
    ))
}
