//! kgroute core — data model, configuration, and the response stream boundary.
//!
//! This crate contains:
//! - **types**: `SpeechRequest` (inbound) and `NormalizedAnswer` (outbound)
//! - **config**: JSON schema, loader, and env var overrides
//! - **stream**: the `ResponseStream` trait the router emits answers through
//! - **audio**: PCM ↔ WAV helpers shared by the audio-consuming providers
//! - **error**: `RouterError`, the one failure that escapes request handling

pub mod audio;
pub mod config;
pub mod error;
pub mod stream;
pub mod types;
pub mod utils;

pub use error::RouterError;
pub use stream::ResponseStream;
pub use types::{AudioClip, NormalizedAnswer, SpeechInput, SpeechRequest};
