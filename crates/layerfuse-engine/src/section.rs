//! Section model

use layerfuse_core::{Command, CommandKind, MachineState};
use serde::{Deserialize, Serialize};

/// One quality profile's contribution to the combined job
///
/// Sections are contiguous, non-overlapping, and ordered by increasing start
/// height; the first starts at 0 and the last is unbounded above. A
/// section's command list excludes the machine-initialization prologue
/// unless it is the first section, and the shutdown epilogue unless it is
/// the last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Quality profile identifier
    pub profile: String,
    /// Start of the height interval, inclusive (mm)
    pub height_start: f64,
    /// End of the height interval, exclusive; `None` for the last section
    pub height_end: Option<f64>,
    /// Retained command subsequence
    pub commands: Vec<Command>,
    /// Machine state immediately before the first retained command
    pub entry: MachineState,
    /// Machine state immediately after the last retained command
    pub exit: MachineState,
    /// Detected layer-boundary Z values across the whole source stream
    pub layer_boundaries: Vec<f64>,
    /// Maximum Z at which the source stream deposits material
    pub max_z: f64,
}

impl Section {
    /// Number of layer markers retained in this section
    pub fn layer_count(&self) -> u32 {
        self.commands
            .iter()
            .filter(|c| c.kind == CommandKind::LayerChange)
            .count() as u32
    }

    /// Check whether a height falls within this section's interval
    pub fn contains(&self, z: f64) -> bool {
        z >= self.height_start && self.height_end.is_none_or(|end| z < end)
    }
}
