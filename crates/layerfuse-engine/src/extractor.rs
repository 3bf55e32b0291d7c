//! Height-bounded section extraction

use layerfuse_core::{Command, CommandKind, MachineState, EPSILON};
use tracing::debug;

use crate::error::ExtractError;
use crate::section::Section;

/// Marker emitted by the upstream slicer after the last layer
const END_OF_PRINT_MARKER: &str = ";End of Gcode";

/// A detected layer boundary: the command index where the layer begins and
/// the Z height at which it prints
#[derive(Debug, Clone, Copy)]
struct LayerEntry {
    index: usize,
    z: f64,
}

/// Section extractor
///
/// Walks a parsed stream with a running [`MachineState`] and yields the
/// subsequence of commands whose printing height falls within a requested
/// window, together with the machine state immediately before and after it.
pub struct SectionExtractor;

impl SectionExtractor {
    /// Extract the height window `[height_start, height_end)` from a stream
    ///
    /// The walk begins accumulating at the first layer whose print height
    /// reaches `height_start` and stops at the first layer whose print
    /// height reaches `height_end`. When `is_first` is false the
    /// machine-initialization prologue is excluded (the combined job's first
    /// section already performed it); when `is_last` is false the shutdown
    /// epilogue is excluded, since a transition immediately follows.
    pub fn extract(
        commands: &[Command],
        profile: &str,
        height_start: f64,
        height_end: Option<f64>,
        is_first: bool,
        is_last: bool,
    ) -> Result<Section, ExtractError> {
        // One replay pass: state after every command, layer table, stream
        // landmarks.
        let mut state = MachineState::new();
        let mut states = Vec::with_capacity(commands.len() + 1);
        states.push(state);

        let mut layers: Vec<LayerEntry> = Vec::new();
        let mut pending_marker: Option<usize> = None;
        let mut saw_marker = false;
        let mut max_print_z: f64 = 0.0;
        let mut epilogue_start: Option<usize> = None;

        for (i, cmd) in commands.iter().enumerate() {
            if cmd.kind == CommandKind::LayerChange {
                saw_marker = true;
                pending_marker = Some(i);
            }
            if epilogue_start.is_none()
                && cmd.kind == CommandKind::Other
                && cmd.raw.trim_start().starts_with(END_OF_PRINT_MARKER)
            {
                epilogue_start = Some(i);
            }

            state.apply(cmd);

            // The first Z-bearing move after a marker fixes the layer's
            // print height.
            if let Some(marker_idx) = pending_marker {
                if cmd.z.is_some() && cmd.is_move() {
                    layers.push(LayerEntry {
                        index: marker_idx,
                        z: state.z,
                    });
                    pending_marker = None;
                }
            }
            if cmd.kind == CommandKind::ExtrusionMove {
                max_print_z = max_print_z.max(state.z);
            }
            states.push(state);
        }

        if !saw_marker {
            layers = Self::detect_layers_by_z(commands, &states);
        }

        if height_start > EPSILON && height_start + EPSILON >= max_print_z {
            return Err(ExtractError::HeightOutOfRange {
                requested: height_start,
                max_z: max_print_z,
            });
        }

        let start_layer = if is_first {
            None
        } else {
            let found = layers.iter().find(|l| l.z + EPSILON >= height_start);
            match found {
                Some(entry) => Some(*entry),
                None => {
                    return Err(ExtractError::HeightOutOfRange {
                        requested: height_start,
                        max_z: max_print_z,
                    })
                }
            }
        };
        let start_idx = start_layer.map(|l| l.index).unwrap_or(0);

        let epilogue_start = epilogue_start
            .or_else(|| Self::detect_shutdown_block(commands))
            .unwrap_or(commands.len());
        let end_idx = match height_end {
            Some(end) => layers
                .iter()
                .find(|l| l.z + EPSILON >= end)
                .map(|l| l.index)
                .unwrap_or(if is_last { commands.len() } else { epilogue_start }),
            None => {
                if is_last {
                    commands.len()
                } else {
                    epilogue_start
                }
            }
        };

        if start_idx >= end_idx {
            return Err(ExtractError::EmptySection {
                profile: profile.to_string(),
                start: height_start,
            });
        }

        let retained = &commands[start_idx..end_idx];
        if !retained.iter().any(|c| c.kind == CommandKind::ExtrusionMove) {
            return Err(ExtractError::EmptySection {
                profile: profile.to_string(),
                start: height_start,
            });
        }

        let mut entry = states[start_idx];
        if let Some(layer) = start_layer {
            // The entry height is the first retained layer's own stacking
            // height, not wherever the prior layer left the nozzle.
            entry.z = layer.z;
        }
        let exit = states[end_idx];

        debug!(
            "Extracted section '{}': commands {}..{} of {}, Z window [{:.3}, {:?})",
            profile,
            start_idx,
            end_idx,
            commands.len(),
            height_start,
            height_end
        );

        Ok(Section {
            profile: profile.to_string(),
            height_start,
            height_end,
            commands: retained.to_vec(),
            entry,
            exit,
            layer_boundaries: layers.iter().map(|l| l.z).collect(),
            max_z: max_print_z,
        })
    }

    /// Fallback epilogue detection for streams without an end-of-print
    /// marker: the shutdown block begins at the first heater-off command
    /// after the last extruding move
    fn detect_shutdown_block(commands: &[Command]) -> Option<usize> {
        let last_extrude = commands
            .iter()
            .rposition(|c| c.kind == CommandKind::ExtrusionMove)?;
        commands[last_extrude + 1..]
            .iter()
            .position(|c| {
                let code = c.raw.trim_start();
                code.starts_with("M104 S0") || code.starts_with("M140 S0")
            })
            .map(|offset| last_extrude + 1 + offset)
    }

    /// Fallback layer detection for streams without `;LAYER:` markers
    ///
    /// A Z-bearing move that raises the nozzle above every height printed so
    /// far becomes a boundary candidate; it is confirmed when extrusion
    /// happens at that height. Z-hop excursions never extrude at the hopped
    /// height, so they are ignored.
    fn detect_layers_by_z(commands: &[Command], states: &[MachineState]) -> Vec<LayerEntry> {
        let mut layers = Vec::new();
        let mut last_z = f64::NEG_INFINITY;
        let mut candidate: Option<LayerEntry> = None;

        for (i, cmd) in commands.iter().enumerate() {
            let post = states[i + 1];
            if cmd.z.is_some() && cmd.is_move() && post.z > last_z + EPSILON {
                candidate = Some(LayerEntry {
                    index: i,
                    z: post.z,
                });
            }
            if cmd.kind == CommandKind::ExtrusionMove {
                if let Some(entry) = candidate {
                    if (post.z - entry.z).abs() < EPSILON {
                        layers.push(entry);
                        last_z = entry.z;
                        candidate = None;
                    }
                }
            }
        }
        layers
    }
}
