//! Request and response types exchanged with the transport layer.
//!
//! A `SpeechRequest` is owned by the caller for the duration of one request;
//! the router only borrows it. A `NormalizedAnswer` is built once per request
//! and handed straight to the response stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Command type sent with every answer: no structured intent, free text only.
pub const NO_RESULT_COMMAND: &str = "NoResultCommand";

/// Default PCM sample rate of device audio.
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Default locale when the device does not report one.
pub const DEFAULT_LOCALE: &str = "en-US";

// ─────────────────────────────────────────────
// Inbound
// ─────────────────────────────────────────────

/// Raw device audio: 16-bit little-endian mono PCM.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioClip {
    /// Interleaved sample bytes (s16le, one channel).
    pub pcm: Vec<u8>,
    /// Samples per second.
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn new(pcm: Vec<u8>, sample_rate: u32) -> Self {
        Self { pcm, sample_rate }
    }

    /// Playback length in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        let samples = (self.pcm.len() / 2) as u64;
        samples * 1000 / u64::from(self.sample_rate)
    }
}

/// What the device sent: audio to be recognized, or text already transcribed
/// by the speech front end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpeechInput {
    Audio(AudioClip),
    Transcript(String),
}

/// One knowledge-graph question from a device session.
#[derive(Clone, Debug)]
pub struct SpeechRequest {
    /// Session identifier assigned by the transport.
    pub session: String,
    /// Device (robot serial) identifier.
    pub device: String,
    pub input: SpeechInput,
    /// IETF language tag, e.g. `"en-US"`.
    pub locale: String,
    /// When the request arrived.
    pub received_at: DateTime<Utc>,
}

impl SpeechRequest {
    /// Create a request carrying raw audio.
    pub fn from_audio(
        session: impl Into<String>,
        device: impl Into<String>,
        audio: AudioClip,
    ) -> Self {
        Self::new(session, device, SpeechInput::Audio(audio))
    }

    /// Create a request carrying an existing transcript.
    pub fn from_transcript(
        session: impl Into<String>,
        device: impl Into<String>,
        transcript: impl Into<String>,
    ) -> Self {
        Self::new(session, device, SpeechInput::Transcript(transcript.into()))
    }

    fn new(session: impl Into<String>, device: impl Into<String>, input: SpeechInput) -> Self {
        SpeechRequest {
            session: session.into(),
            device: device.into(),
            input,
            locale: DEFAULT_LOCALE.to_string(),
            received_at: Utc::now(),
        }
    }

    /// Override the locale (builder style).
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// The transcript, if the front end already produced one.
    pub fn transcript(&self) -> Option<&str> {
        match &self.input {
            SpeechInput::Transcript(text) => Some(text),
            SpeechInput::Audio(_) => None,
        }
    }

    /// The raw audio, if present.
    pub fn audio(&self) -> Option<&AudioClip> {
        match &self.input {
            SpeechInput::Audio(clip) => Some(clip),
            SpeechInput::Transcript(_) => None,
        }
    }
}

// ─────────────────────────────────────────────
// Outbound
// ─────────────────────────────────────────────

/// The single response shape every provider answer is mapped into.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedAnswer {
    pub session: String,
    pub device_id: String,
    /// Always [`NO_RESULT_COMMAND`].
    pub command_type: String,
    /// Sentence for the device to speak.
    pub spoken_text: String,
}

impl NormalizedAnswer {
    /// Build the answer for `request` with the given spoken text.
    pub fn for_request(request: &SpeechRequest, spoken_text: impl Into<String>) -> Self {
        NormalizedAnswer {
            session: request.session.clone(),
            device_id: request.device.clone(),
            command_type: NO_RESULT_COMMAND.to_string(),
            spoken_text: spoken_text.into(),
        }
    }
}
