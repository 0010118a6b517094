//! kgroute router — picks the answer provider and emits the spoken result.
//!
//! This crate contains:
//! - **snapshot**: the immutable, per-configuration provider client set
//! - **dispatcher**: `KnowledgeRouter` — selection policy and fallback sentences
//! - **emitter**: builds the `NormalizedAnswer` and sends it once

pub mod dispatcher;
pub mod emitter;
pub mod snapshot;

pub use dispatcher::{KnowledgeRouter, GENERIC_ERROR, NOT_ENABLED};
pub use emitter::emit;
pub use snapshot::{Adapter, ProviderSnapshot};
