//! LayerFuse job configuration crate.
//!
//! Handles the persisted fusion-job description: model path, destination,
//! per-section transition heights and profiles, slicer timeout, and the
//! transition parameters. The engine consumes this read-only at invocation
//! time and persists nothing itself.

pub mod config;
pub mod error;

pub use config::{
    JobConfig, SectionSettings, DEFAULT_SLICING_TIMEOUT_SECS, MAX_SLICING_TIMEOUT_SECS,
    MIN_SLICING_TIMEOUT_SECS,
};
pub use error::SettingsError;
