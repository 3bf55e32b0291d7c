//! Core G-code model for LayerFuse.
//!
//! This crate owns everything that touches raw G-code text:
//! - The typed [`Command`] model, immutable once parsed
//! - The [`StreamParser`], which classifies lines and tracks modal state
//! - [`MachineState`] replay, the accumulated effect of a command sequence
//! - The [`serializer`], which renders commands back to text verbatim
//!
//! Everything downstream (section extraction, transition synthesis, fusion)
//! operates on the types defined here and never re-reads raw text.

pub mod command;
pub mod error;
pub mod parser;
pub mod serializer;
pub mod state;

pub use command::{Command, CommandKind};
pub use error::{ParseError, Result};
pub use parser::{parse, StreamParser};
pub use serializer::serialize;
pub use state::{MachineState, EPSILON};
