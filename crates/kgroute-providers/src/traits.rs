//! Provider traits — the two request/response contracts an adapter can have.
//!
//! Houndify understands speech itself and gets the whole request; completion
//! backends only ever see the transcribed question.

use async_trait::async_trait;
use kgroute_core::SpeechRequest;

/// A provider that answers straight from the device request (audio or text).
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Answer the request.
    ///
    /// Errors carry the root cause for logging; the dispatcher decides what
    /// the device gets to hear.
    async fn ask(&self, request: &SpeechRequest) -> anyhow::Result<String>;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}

/// A provider that completes a transcribed question.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete the question.
    ///
    /// Never fails: every failure is already a sentence the device can speak.
    async fn complete(&self, text: &str) -> String;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
