//! Answer providers for kgroute.
//!
//! # Architecture
//!
//! - [`traits`] — `SpeechProvider` (audio in) and `CompletionProvider` (text in)
//! - [`houndify::HoundifyClient`] — streams audio to Houndify, parses its JSON answer
//! - [`openai::OpenAiHelper`] — runs an external helper process per question
//! - [`together::TogetherClient`] — Together `/inference` completions over HTTP
//! - [`transcription`] — speech-to-text for the text-based providers

pub mod houndify;
pub mod openai;
pub mod together;
pub mod traits;
pub mod transcription;

pub use houndify::{parse_spoken_response, HoundifyClient, HoundifyError};
pub use openai::OpenAiHelper;
pub use together::TogetherClient;
pub use traits::{CompletionProvider, SpeechProvider};
pub use transcription::{Transcriber, WhisperTranscriber};
