//! Error taxonomy for the fusion engine
//!
//! All fatal: no stage is retried internally, and a failed fusion run never
//! produces a combined output. Retry, if any, belongs to the external
//! slicing collaborator.

use layerfuse_core::ParseError;
use thiserror::Error;

/// Section extraction error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// The requested window starts at or beyond the stream's top
    #[error(
        "Transition height {requested:.3}mm meets or exceeds the stream's maximum printed Z {max_z:.3}mm"
    )]
    HeightOutOfRange {
        /// The offending start height.
        requested: f64,
        /// The maximum Z at which the stream deposits material.
        max_z: f64,
    },

    /// Extraction retained no printable commands
    ///
    /// Signals a profile/height mismatch rather than silently producing a
    /// zero-length fused segment.
    #[error("Section '{profile}' retained no commands at heights from {start:.3}mm")]
    EmptySection {
        /// The profile identifier of the empty section.
        profile: String,
        /// The section's start height.
        start: f64,
    },
}

/// Transition synthesis error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    /// An endpoint state never observed an XY position
    #[error("Cannot synthesize transition: {endpoint} state has no recorded XY position")]
    MissingPosition {
        /// Which endpoint ("exit" or "entry") lacks position data.
        endpoint: String,
    },

    /// Replaying the synthesized commands did not reproduce the entry state
    #[error("Transition post-condition violated on {axis}: expected {expected:.5}, got {actual:.5}")]
    PostCondition {
        /// The axis or register that diverged (X, Y, Z, E, or R for retraction).
        axis: char,
        /// The entry-state value.
        expected: f64,
        /// The replayed value.
        actual: f64,
    },
}

/// Aggregated fusion error type
///
/// Any stage failure aborts the whole run; a partial combined file would be
/// unsafe to print.
#[derive(Error, Debug)]
pub enum FusionError {
    /// A raw input stream failed to parse
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Section extraction failed
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Transition synthesis failed
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// The configured height intervals are not a valid partition
    #[error("Invalid section layout: {reason}")]
    InvalidLayout {
        /// Why the layout was rejected.
        reason: String,
    },
}

/// Result type using FusionError
pub type Result<T> = std::result::Result<T, FusionError>;
