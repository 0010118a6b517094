//! Configuration schema.
//!
//! Hierarchy: `Config` → `KnowledgeConfig`, `TranscriptionConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! Every struct is `#[serde(default)]` so partial files load cleanly.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.kgroute/config.json` + env vars.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub knowledge: KnowledgeConfig,
    pub transcription: TranscriptionConfig,
}

// ─────────────────────────────────────────────
// Knowledge graph provider
// ─────────────────────────────────────────────

/// Which answer provider handles knowledge-graph questions.
///
/// Unknown strings in the config file deserialize to `None`, which the
/// router treats the same as a disabled provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Houndify,
    Openai,
    Together,
    #[default]
    #[serde(other)]
    None,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Houndify => "houndify",
            ProviderKind::Openai => "openai",
            ProviderKind::Together => "together",
            ProviderKind::None => "none",
        }
    }

    /// Parse a provider name, case-insensitively. Unknown names map to `None`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "houndify" => ProviderKind::Houndify,
            "openai" => ProviderKind::Openai,
            "together" => ProviderKind::Together,
            _ => ProviderKind::None,
        }
    }

    /// Whether the provider consumes text (and so needs transcription first).
    pub fn needs_transcript(&self) -> bool {
        matches!(self, ProviderKind::Openai | ProviderKind::Together)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Knowledge-graph provider settings (the web UI edits these).
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KnowledgeConfig {
    /// Master switch.
    pub enable: bool,
    pub provider: ProviderKind,
    /// Client ID (Houndify only).
    pub id: String,
    /// Client key / API key.
    pub key: String,
    /// Model name (Together only).
    pub model: String,
    /// Override the provider's default endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Program and leading arguments of the OpenAI helper. The question is
    /// appended as the final argument.
    pub helper_command: Vec<String>,
    /// Upper bound on one provider call, in seconds.
    pub timeout_secs: u64,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            enable: false,
            provider: ProviderKind::None,
            id: String::new(),
            key: String::new(),
            model: "meta-llama/Llama-3-70b-chat-hf".to_string(),
            api_base: None,
            helper_command: vec![
                "python3".to_string(),
                "~/.kgroute/openai_request.py".to_string(),
            ],
            timeout_secs: 30,
        }
    }
}

impl KnowledgeConfig {
    /// Whether the credentials the selected provider needs are present.
    pub fn has_credentials(&self) -> bool {
        match self.provider {
            ProviderKind::Houndify => !self.id.trim().is_empty() && !self.key.trim().is_empty(),
            ProviderKind::Openai | ProviderKind::Together => !self.key.trim().is_empty(),
            ProviderKind::None => false,
        }
    }
}

// Keys never reach logs.
impl fmt::Debug for KnowledgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KnowledgeConfig")
            .field("enable", &self.enable)
            .field("provider", &self.provider)
            .field("id", &self.id)
            .field("key", &redact(&self.key))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("helper_command", &self.helper_command)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

// ─────────────────────────────────────────────
// Transcription
// ─────────────────────────────────────────────

/// Speech-to-text settings for text-based providers.
///
/// Any OpenAI-compatible `/audio/transcriptions` endpoint works; the default
/// is Groq's hosted Whisper.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptionConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: "https://api.groq.com/openai/v1/audio/transcriptions".to_string(),
            model: "whisper-large-v3".to_string(),
        }
    }
}

impl fmt::Debug for TranscriptionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscriptionConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.knowledge.enable);
        assert_eq!(config.knowledge.provider, ProviderKind::None);
        assert_eq!(config.knowledge.timeout_secs, 30);
        assert_eq!(config.transcription.model, "whisper-large-v3");
    }

    #[test]
    fn test_provider_kind_from_json() {
        let kinds: Vec<ProviderKind> =
            serde_json::from_str(r#"["houndify", "openai", "together", "none", "gemini", ""]"#)
                .unwrap();
        assert_eq!(
            kinds,
            vec![
                ProviderKind::Houndify,
                ProviderKind::Openai,
                ProviderKind::Together,
                ProviderKind::None,
                ProviderKind::None,
                ProviderKind::None,
            ]
        );
    }

    #[test]
    fn test_provider_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ProviderKind::Together).unwrap(),
            r#""together""#
        );
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!(ProviderKind::parse(" Houndify "), ProviderKind::Houndify);
        assert_eq!(ProviderKind::parse("OPENAI"), ProviderKind::Openai);
        assert_eq!(ProviderKind::parse("bard"), ProviderKind::None);
    }

    #[test]
    fn test_needs_transcript() {
        assert!(!ProviderKind::Houndify.needs_transcript());
        assert!(ProviderKind::Openai.needs_transcript());
        assert!(ProviderKind::Together.needs_transcript());
        assert!(!ProviderKind::None.needs_transcript());
    }

    #[test]
    fn test_has_credentials() {
        let mut k = KnowledgeConfig {
            enable: true,
            provider: ProviderKind::Houndify,
            key: "a2V5".into(),
            ..Default::default()
        };
        assert!(!k.has_credentials(), "houndify needs an id too");
        k.id = "client-id".into();
        assert!(k.has_credentials());

        k.provider = ProviderKind::Together;
        k.key = "   ".into();
        assert!(!k.has_credentials());
        k.key = "tg-key".into();
        assert!(k.has_credentials());

        k.provider = ProviderKind::None;
        assert!(!k.has_credentials());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = Config {
            knowledge: KnowledgeConfig {
                key: "super-secret".into(),
                ..Default::default()
            },
            transcription: TranscriptionConfig {
                api_key: "gsk_secret".into(),
                ..Default::default()
            },
        };
        let dump = format!("{config:?}");
        assert!(!dump.contains("super-secret"));
        assert!(!dump.contains("gsk_secret"));
        assert!(dump.contains("<redacted>"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"knowledge": {"enable": true, "provider": "openai"}}"#)
                .unwrap();
        assert!(config.knowledge.enable);
        assert_eq!(config.knowledge.provider, ProviderKind::Openai);
        assert_eq!(config.knowledge.helper_command[0], "python3");
        assert!(config.transcription.api_key.is_empty());
    }
}
