//! G-code command types

use serde::{Deserialize, Serialize};

/// Classification of a single G-code line
///
/// The parser assigns exactly one kind per line. Anything it does not
/// recognize becomes [`CommandKind::Other`] and round-trips verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandKind {
    /// Motion without filament change (G0, or G1 with no E word)
    TravelMove,
    /// Motion that advances filament (E increasing)
    ExtrusionMove,
    /// Filament pull-back (E decreasing, typically an E-only move)
    Retraction,
    /// Layer boundary marker (`;LAYER:<n>`)
    LayerChange,
    /// Position register reset (G92)
    PositionReset,
    /// Comment, blank line, or unrecognized directive (passthrough)
    Other,
}

/// One parsed (or synthesized) G-code instruction
///
/// Carries the raw line text verbatim so serialization is lossless for
/// anything fusion logic does not touch. Numeric words are stored as
/// present/absent options; the effective motion and extrusion modes are
/// attached by the parser so callers never track modal directives
/// themselves. Commands are immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Raw line text, exactly as read (or as rendered at synthesis time)
    pub raw: String,
    /// Classification of this line
    pub kind: CommandKind,
    /// X word value, if present
    pub x: Option<f64>,
    /// Y word value, if present
    pub y: Option<f64>,
    /// Z word value, if present
    pub z: Option<f64>,
    /// E word value, if present
    pub e: Option<f64>,
    /// F (feed rate) word value, if present
    pub f: Option<f64>,
    /// Source line index (1-based; 0 for synthesized commands)
    pub line_number: u32,
    /// Layer index for `;LAYER:<n>` markers
    pub layer: Option<i32>,
    /// Effective XYZ distance mode at this command (G90 = true)
    pub absolute_xyz: bool,
    /// Effective E distance mode at this command (M82 = true)
    pub absolute_e: bool,
}

impl Command {
    /// Create a passthrough command that preserves the given line verbatim
    pub fn passthrough(raw: impl Into<String>, line_number: u32) -> Self {
        Self {
            raw: raw.into(),
            kind: CommandKind::Other,
            x: None,
            y: None,
            z: None,
            e: None,
            f: None,
            line_number,
            layer: None,
            absolute_xyz: true,
            absolute_e: true,
        }
    }

    /// Synthesize a comment line
    pub fn comment(text: impl AsRef<str>) -> Self {
        Self::passthrough(format!(";{}", text.as_ref()), 0)
    }

    /// Synthesize a rapid XY travel move
    pub fn travel_xy(x: f64, y: f64, feed: f64) -> Self {
        let mut cmd = Self::passthrough(
            format!("G0 F{} X{:.3} Y{:.3}", feed.round() as i64, x, y),
            0,
        );
        cmd.kind = CommandKind::TravelMove;
        cmd.x = Some(x);
        cmd.y = Some(y);
        cmd.f = Some(feed);
        cmd
    }

    /// Synthesize a rapid Z move
    pub fn travel_z(z: f64, feed: f64) -> Self {
        let mut cmd =
            Self::passthrough(format!("G0 F{} Z{:.3}", feed.round() as i64, z), 0);
        cmd.kind = CommandKind::TravelMove;
        cmd.z = Some(z);
        cmd.f = Some(feed);
        cmd
    }

    /// Synthesize a retraction to an absolute E target
    pub fn retract_to(e: f64, feed: f64) -> Self {
        let mut cmd =
            Self::passthrough(format!("G1 F{} E{:.5}", feed.round() as i64, e), 0);
        cmd.kind = CommandKind::Retraction;
        cmd.e = Some(e);
        cmd.f = Some(feed);
        cmd
    }

    /// Synthesize a prime (de-retraction) to an absolute E target
    pub fn prime_to(e: f64, feed: f64) -> Self {
        let mut cmd =
            Self::passthrough(format!("G1 F{} E{:.5}", feed.round() as i64, e), 0);
        cmd.kind = CommandKind::ExtrusionMove;
        cmd.e = Some(e);
        cmd.f = Some(feed);
        cmd
    }

    /// Synthesize a G92 extrusion-register reset
    pub fn reset_e(e: f64) -> Self {
        let mut cmd = Self::passthrough(format!("G92 E{:.5}", e), 0);
        cmd.kind = CommandKind::PositionReset;
        cmd.e = Some(e);
        cmd
    }

    /// Synthesize an absolute-motion directive (G90)
    pub fn absolute_motion() -> Self {
        Self::passthrough("G90", 0)
    }

    /// Synthesize an absolute-extrusion directive (M82)
    pub fn absolute_extrusion() -> Self {
        Self::passthrough("M82", 0)
    }

    /// Synthesize a `;LAYER:<n>` marker
    pub fn layer_marker(layer: i32) -> Self {
        let mut cmd = Self::passthrough(format!(";LAYER:{}", layer), 0);
        cmd.kind = CommandKind::LayerChange;
        cmd.layer = Some(layer);
        cmd
    }

    /// Synthesize a `;LAYER_COUNT:<n>` marker
    pub fn layer_count(total: u32) -> Self {
        Self::passthrough(format!(";LAYER_COUNT:{}", total), 0)
    }

    /// Check if this command produces motion
    pub fn is_move(&self) -> bool {
        matches!(
            self.kind,
            CommandKind::TravelMove | CommandKind::ExtrusionMove | CommandKind::Retraction
        )
    }
}
