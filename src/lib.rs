//! # LayerFuse
//!
//! Fuses independently sliced G-code streams (one per print-quality
//! profile) into a single continuous job, partitioned by height, so one
//! physical print can use different quality settings at different
//! elevations.
//!
//! ## Architecture
//!
//! LayerFuse is organized as a workspace with multiple crates:
//!
//! 1. **layerfuse-core** - Command model, stream parser, machine-state
//!    replay, serializer
//! 2. **layerfuse-engine** - Section extraction, layer alignment,
//!    transition synthesis, fusion orchestration
//! 3. **layerfuse-settings** - Job configuration persistence
//! 4. **layerfuse** - CLI binary that integrates all crates
//!
//! The engine reconstructs and preserves machine state (position, extrusion
//! amount, motion mode) across streams that know nothing of each other, and
//! only ever writes a combined file when every transition post-condition
//! held.

pub use layerfuse_core::{
    parse, serialize, Command, CommandKind, MachineState, ParseError, StreamParser,
};

pub use layerfuse_engine::{
    align, ensure_aligned, is_layer_multiple, recommend, ExtractError, FusionEngine, FusionError,
    FusionPlan, Section, SectionExtractor, SectionInput, Transition, TransitionCalculator,
    TransitionError, TransitionSettings,
};

pub use layerfuse_settings::{JobConfig, SectionSettings, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with console output and RUST_LOG environment
/// variable support.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .init();

    Ok(())
}
