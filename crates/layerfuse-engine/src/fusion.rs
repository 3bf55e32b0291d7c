//! Fusion orchestration

use layerfuse_core::{parser, serializer, Command, CommandKind, EPSILON};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{FusionError, Result};
use crate::extractor::SectionExtractor;
use crate::section::Section;
use crate::transition::{Transition, TransitionCalculator, TransitionSettings};

/// One raw slicer output plus the height window it contributes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionInput {
    /// Quality profile identifier
    pub profile: String,
    /// Complete raw G-code text for the entire model under this profile
    pub raw: String,
    /// Start of this section's height window, inclusive (mm)
    pub height_start: f64,
    /// End of the window, exclusive; `None` for the last section
    pub height_end: Option<f64>,
}

/// The validated unit the engine serializes: ordered sections plus the
/// transitions between consecutive pairs
///
/// Assembled once per fusion run and never mutated; discarded after
/// serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionPlan {
    /// Sections in increasing height order
    pub sections: Vec<Section>,
    /// Transitions between consecutive sections (`sections.len() - 1`)
    pub transitions: Vec<Transition>,
}

impl FusionPlan {
    /// Total layer markers across all retained sections
    pub fn total_layers(&self) -> u32 {
        self.sections.iter().map(|s| s.layer_count()).sum()
    }

    /// Render the interleaved command sequence
    /// `[Section 1, Transition 1, Section 2, ...]`
    ///
    /// Layer markers are renumbered consecutively across sections and
    /// `;LAYER_COUNT:` rewritten to the fused total, so previewers render
    /// the combined file correctly.
    pub fn render(&self) -> Vec<Command> {
        let total_layers = self.total_layers();
        let mut out = Vec::new();

        out.push(Command::comment("========== GCODE SPLICING INFO =========="));
        out.push(Command::comment(format!(
            "Total sections: {}",
            self.sections.len()
        )));
        for (i, section) in self.sections.iter().enumerate() {
            let end = match section.height_end {
                Some(end) => format!("Z{:.2}mm", end),
                None => "Top".to_string(),
            };
            out.push(Command::comment(format!(
                "Section {}: Z{:.2}mm - {}",
                i + 1,
                section.height_start,
                end
            )));
        }
        out.push(Command::comment("========================================="));

        let mut layer_counter: i32 = 0;
        for (i, section) in self.sections.iter().enumerate() {
            out.push(Command::comment(format!(
                "========== SECTION {} START ==========",
                i + 1
            )));
            if i > 0 {
                out.extend(self.transitions[i - 1].commands.iter().cloned());
            }
            for cmd in &section.commands {
                if cmd.kind == CommandKind::LayerChange {
                    out.push(Command::layer_marker(layer_counter));
                    layer_counter += 1;
                } else if cmd.raw.trim_start().starts_with(";LAYER_COUNT:") {
                    out.push(Command::layer_count(total_layers));
                } else {
                    out.push(cmd.clone());
                }
            }
            out.push(Command::comment(format!(
                "========== SECTION {} END ==========",
                i + 1
            )));
        }
        out
    }
}

/// Fusion engine
///
/// Orchestrator for a full fusion run: parses every raw input, extracts
/// each section's height window, computes the transitions between adjacent
/// pairs, validates the result, and serializes the combined stream. Owns no
/// state between invocations.
pub struct FusionEngine {
    calculator: TransitionCalculator,
}

impl FusionEngine {
    /// Create an engine with the given transition settings
    pub fn new(settings: TransitionSettings) -> Self {
        Self {
            calculator: TransitionCalculator::new(settings),
        }
    }

    /// Build and validate a fusion plan from ordered raw inputs
    pub fn plan(&self, inputs: &[SectionInput]) -> Result<FusionPlan> {
        validate_layout(inputs)?;

        info!("Planning fusion of {} sections", inputs.len());
        let last = inputs.len() - 1;
        let mut sections = Vec::with_capacity(inputs.len());
        for (i, input) in inputs.iter().enumerate() {
            let commands = parser::parse(&input.raw)?;
            debug!(
                "Section {} ('{}'): {} commands, window [{:.3}, {:?})",
                i + 1,
                input.profile,
                commands.len(),
                input.height_start,
                input.height_end
            );
            let section = SectionExtractor::extract(
                &commands,
                &input.profile,
                input.height_start,
                input.height_end,
                i == 0,
                i == last,
            )?;
            sections.push(section);
        }

        let mut transitions = Vec::with_capacity(last);
        for pair in sections.windows(2) {
            transitions.push(self.calculator.compute(&pair[0].exit, &pair[1].entry)?);
        }

        info!(
            "Fusion plan ready: {} sections, {} transitions, {} layers",
            sections.len(),
            transitions.len(),
            sections.iter().map(|s| s.layer_count()).sum::<u32>()
        );
        Ok(FusionPlan {
            sections,
            transitions,
        })
    }

    /// Run a complete fusion and return the combined G-code text
    ///
    /// Fails without producing any output if any stage fails or any
    /// transition post-condition does not hold.
    pub fn fuse(&self, inputs: &[SectionInput]) -> Result<String> {
        let plan = self.plan(inputs)?;
        Ok(serializer::serialize(&plan.render()))
    }
}

/// Reject height layouts that are not a contiguous increasing partition
/// starting at zero with an unbounded last interval
fn validate_layout(inputs: &[SectionInput]) -> Result<()> {
    if inputs.is_empty() {
        return Err(FusionError::InvalidLayout {
            reason: "no sections configured".to_string(),
        });
    }
    if inputs[0].height_start.abs() > EPSILON {
        return Err(FusionError::InvalidLayout {
            reason: format!(
                "first section must start at 0, got {:.3}",
                inputs[0].height_start
            ),
        });
    }
    let last = inputs.len() - 1;
    for (i, input) in inputs.iter().enumerate() {
        if i == last {
            if input.height_end.is_some() {
                return Err(FusionError::InvalidLayout {
                    reason: "the last section must be unbounded above".to_string(),
                });
            }
            continue;
        }
        let Some(end) = input.height_end else {
            return Err(FusionError::InvalidLayout {
                reason: format!("only the last section may be unbounded (section {})", i + 1),
            });
        };
        if end <= input.height_start + EPSILON {
            return Err(FusionError::InvalidLayout {
                reason: format!(
                    "section {} interval [{:.3}, {:.3}) is empty",
                    i + 1,
                    input.height_start,
                    end
                ),
            });
        }
        let next_start = inputs[i + 1].height_start;
        if (next_start - end).abs() > EPSILON {
            return Err(FusionError::InvalidLayout {
                reason: format!(
                    "sections must be contiguous: section {} ends at {:.3} but section {} starts at {:.3}",
                    i + 1,
                    end,
                    i + 2,
                    next_start
                ),
            });
        }
    }
    Ok(())
}
