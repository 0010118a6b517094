//! Speech-to-text for the text-based providers.
//!
//! Any OpenAI-compatible `/audio/transcriptions` endpoint will work; the
//! default config points at Groq's hosted Whisper (fast, free tier available).

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use kgroute_core::audio::pcm_to_wav;
use kgroute_core::config::TranscriptionConfig;
use kgroute_core::{SpeechInput, SpeechRequest};

// ─────────────────────────────────────────────
// Trait
// ─────────────────────────────────────────────

/// Turns a device request into the text of the question.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the request. Requests that already carry a transcript
    /// return it unchanged.
    async fn transcribe(&self, request: &SpeechRequest) -> anyhow::Result<String>;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}

// ─────────────────────────────────────────────
// Whisper
// ─────────────────────────────────────────────

/// Whisper transcription over an OpenAI-compatible HTTP API.
pub struct WhisperTranscriber {
    api_key: String,
    api_url: String,
    model: String,
    client: reqwest::Client,
}

impl WhisperTranscriber {
    pub fn new(config: &TranscriptionConfig) -> Self {
        Self {
            api_key: config.api_key.trim().to_string(),
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// Check if the transcriber is configured (has an API key).
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// `"en-US"` → `"en"`: Whisper wants an ISO-639-1 code.
fn language_code(locale: &str) -> Option<&str> {
    let code = locale.split(['-', '_']).next()?.trim();
    (code.len() == 2).then_some(code)
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, request: &SpeechRequest) -> anyhow::Result<String> {
        let clip = match &request.input {
            SpeechInput::Transcript(text) => return Ok(text.clone()),
            SpeechInput::Audio(clip) => clip,
        };

        if !self.is_configured() {
            anyhow::bail!("transcription: no API key configured");
        }

        debug!(
            session = %request.session,
            duration_ms = clip.duration_ms(),
            model = %self.model,
            "transcribing audio via Whisper"
        );

        let file_part = reqwest::multipart::Part::bytes(pcm_to_wav(clip)?)
            .file_name("speech.wav")
            .mime_str("audio/wav")?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone());
        if let Some(language) = language_code(&request.locale) {
            form = form.text("language", language.to_string());
        }

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .timeout(Duration::from_secs(60))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "transcription API error");
            anyhow::bail!("transcription API returned {status}: {body}");
        }

        let json: serde_json::Value = response.json().await?;
        let text = json["text"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("transcription response has no text field"))?
            .trim()
            .to_string();

        debug!(chars = text.len(), "transcription complete");
        Ok(text)
    }

    fn display_name(&self) -> &str {
        "Whisper"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
