//! Error types for G-code parsing.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// G-code parse error type
///
/// Raised only for structurally malformed numeric fields on recognized
/// motion/extrusion commands. Unrecognized lines are never errors; they are
/// preserved verbatim as passthrough commands.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A recognized command carried a word whose numeric value failed to parse
    #[error("Malformed {word} value at line {line_number}: '{value}'")]
    InvalidNumber {
        /// The line number (1-based) where the malformed value was found.
        line_number: u32,
        /// The word letter (X, Y, Z, E, F).
        word: char,
        /// The token that failed to parse.
        value: String,
    },

    /// A recognized command was structurally corrupt beyond word-level repair
    #[error("Malformed command at line {line_number}: {reason}")]
    InvalidCommand {
        /// The line number (1-based) where the malformed command was found.
        line_number: u32,
        /// The reason the command could not be parsed.
        reason: String,
    },
}

/// Result type using ParseError
pub type Result<T> = std::result::Result<T, ParseError>;
