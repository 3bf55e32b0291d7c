//! Fusion engine for LayerFuse.
//!
//! Combines independently sliced G-code streams (one per quality profile)
//! into a single continuous job, partitioned by height:
//!
//! 1. [`extractor`] pulls each profile's height window out of its stream
//! 2. [`alignment`] snaps requested transition heights to layer boundaries
//! 3. [`transition`] synthesizes the bridging commands between sections
//! 4. [`fusion`] validates the plan and serializes the combined stream
//!
//! The engine is single-threaded and synchronous by design: correctness
//! depends on strictly ordered machine-state replay. Each `fuse` invocation
//! owns its inputs exclusively and retains no state between invocations.

pub mod alignment;
pub mod error;
pub mod extractor;
pub mod fusion;
pub mod section;
pub mod transition;

pub use alignment::{align, ensure_aligned, is_layer_multiple, recommend};
pub use error::{ExtractError, FusionError, Result, TransitionError};
pub use extractor::SectionExtractor;
pub use fusion::{FusionEngine, FusionPlan, SectionInput};
pub use section::Section;
pub use transition::{Transition, TransitionCalculator, TransitionSettings};
