//! Houndify knowledge provider.
//!
//! Audio requests are wrapped in a WAV container and streamed with chunked
//! transfer encoding to `POST /v1/audio`; transcript-only requests go to
//! `GET /v1/text`. Both return one JSON document whose spoken answer lives at
//! `AllResults[0].SpokenResponseLong`.
//!
//! Every request is signed: the client key (URL-safe base64) is the HMAC-SHA256
//! key over `"{UserID};{RequestID}{Timestamp}"`.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use hmac::{Hmac, Mac};
use serde_json::{Map, Value};
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, error};

use kgroute_core::audio::pcm_to_wav;
use kgroute_core::config::KnowledgeConfig;
use kgroute_core::{AudioClip, SpeechInput, SpeechRequest};

use crate::traits::SpeechProvider;

type HmacSha256 = Hmac<Sha256>;

/// Default Houndify API host.
pub const DEFAULT_HOUNDIFY_BASE: &str = "https://api.houndify.com";

/// Size of each streamed audio chunk.
const AUDIO_CHUNK_BYTES: usize = 4096;

/// UserID sent when the device did not identify itself.
const ANONYMOUS_USER: &str = "anonymous";

// ─────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────

/// Why a Houndify call produced no answer.
#[derive(Debug, Error)]
pub enum HoundifyError {
    #[error("client key is not valid base64")]
    InvalidKey,

    #[error("failed to encode audio: {0}")]
    Audio(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("houndify returned HTTP {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode json")]
    Decode,

    /// The JSON parsed but does not follow the documented response schema.
    #[error("unexpected response shape: missing or mistyped {0}")]
    Schema(&'static str),

    /// `Status` was not OK; carries the provider's `ErrorMessage`.
    #[error("{0}")]
    Status(String),

    #[error("no results to return")]
    NoResults,
}

// ─────────────────────────────────────────────
// Response parsing
// ─────────────────────────────────────────────

/// Extract the spoken answer from a Houndify server response.
///
/// Checks, in order: valid JSON object, `Status` equals "OK" (any case),
/// `NumToReturn` ≥ 1, then reads `AllResults[0].SpokenResponseLong`.
pub fn parse_spoken_response(body: &str) -> Result<String, HoundifyError> {
    let result: Map<String, Value> = serde_json::from_str(body).map_err(|e| {
        debug!(error = %e, "houndify response is not a JSON object");
        HoundifyError::Decode
    })?;

    let status = result
        .get("Status")
        .and_then(Value::as_str)
        .ok_or(HoundifyError::Schema("Status"))?;

    if !status.eq_ignore_ascii_case("OK") {
        let reason = result
            .get("ErrorMessage")
            .and_then(Value::as_str)
            .ok_or(HoundifyError::Schema("ErrorMessage"))?;
        return Err(HoundifyError::Status(reason.to_string()));
    }

    let num_to_return = result
        .get("NumToReturn")
        .and_then(Value::as_f64)
        .ok_or(HoundifyError::Schema("NumToReturn"))?;
    if num_to_return < 1.0 {
        return Err(HoundifyError::NoResults);
    }

    result
        .get("AllResults")
        .and_then(Value::as_array)
        .and_then(|results| results.first())
        .and_then(|first| first.get("SpokenResponseLong"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(HoundifyError::Schema("AllResults[0].SpokenResponseLong"))
}

// ─────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────

/// A signed Houndify client, built once per configuration.
pub struct HoundifyClient {
    client: reqwest::Client,
    api_base: String,
    client_id: String,
    /// Decoded client key (HMAC secret).
    client_key: Vec<u8>,
}

impl std::fmt::Debug for HoundifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoundifyClient")
            .field("api_base", &self.api_base)
            .field("client_id", &self.client_id)
            .finish()
    }
}

impl HoundifyClient {
    /// Build a client from the knowledge config.
    ///
    /// Fails if the client key does not decode; such a client could never
    /// sign a request.
    pub fn new(config: &KnowledgeConfig) -> Result<Self, HoundifyError> {
        let key = config.key.trim();
        let client_key = URL_SAFE
            .decode(key)
            .or_else(|_| STANDARD.decode(key))
            .map_err(|_| HoundifyError::InvalidKey)?;
        if client_key.is_empty() {
            return Err(HoundifyError::InvalidKey);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_HOUNDIFY_BASE.to_string());

        Ok(HoundifyClient {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            client_id: config.id.trim().to_string(),
            client_key,
        })
    }

    /// Compute the `Hound-Client-Authentication` header value.
    fn client_authentication(
        &self,
        user_id: &str,
        request_id: &str,
        timestamp: i64,
    ) -> Result<String, HoundifyError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.client_key).map_err(|_| HoundifyError::InvalidKey)?;
        mac.update(format!("{user_id};{request_id}{timestamp}").as_bytes());
        let signature = URL_SAFE.encode(mac.finalize().into_bytes());
        Ok(format!("{};{};{}", self.client_id, timestamp, signature))
    }

    /// Attach the three Houndify auth headers to a request.
    fn signed(
        &self,
        builder: reqwest::RequestBuilder,
        request: &SpeechRequest,
    ) -> Result<reqwest::RequestBuilder, HoundifyError> {
        let user_id = if request.device.is_empty() {
            ANONYMOUS_USER
        } else {
            request.device.as_str()
        };
        let request_id = uuid::Uuid::new_v4().to_string();
        let timestamp = chrono::Utc::now().timestamp();

        let info = serde_json::json!({
            "ClientID": self.client_id,
            "UserID": user_id,
            "RequestID": request_id,
            "TimeStamp": timestamp,
            "InputLanguageIETFTag": request.locale,
        })
        .to_string();

        Ok(builder
            .header(
                "Hound-Request-Authentication",
                format!("{user_id};{request_id}"),
            )
            .header(
                "Hound-Client-Authentication",
                self.client_authentication(user_id, &request_id, timestamp)?,
            )
            .header("Hound-Request-Info", info))
    }

    /// Stream the clip to the voice endpoint and return the raw JSON body.
    async fn stream_audio(
        &self,
        request: &SpeechRequest,
        clip: &AudioClip,
    ) -> Result<String, HoundifyError> {
        let wav = pcm_to_wav(clip).map_err(|e| HoundifyError::Audio(e.to_string()))?;
        debug!(
            session = %request.session,
            bytes = wav.len(),
            duration_ms = clip.duration_ms(),
            "streaming audio to Houndify"
        );

        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = wav
            .chunks(AUDIO_CHUNK_BYTES)
            .map(|chunk| Ok(chunk.to_vec()))
            .collect();
        let body = reqwest::Body::wrap_stream(futures_util::stream::iter(chunks));

        let builder = self
            .client
            .post(format!("{}/v1/audio", self.api_base))
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(body);

        self.send(self.signed(builder, request)?).await
    }

    /// Ask a text question and return the raw JSON body.
    async fn text_query(&self, request: &SpeechRequest, text: &str) -> Result<String, HoundifyError> {
        debug!(session = %request.session, "sending text query to Houndify");
        let builder = self
            .client
            .get(format!("{}/v1/text", self.api_base))
            .query(&[("query", text)]);

        self.send(self.signed(builder, request)?).await
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<String, HoundifyError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(HoundifyError::Http { status, body });
        }
        Ok(body)
    }

    /// Answer a request: audio is streamed, transcripts use the text endpoint.
    pub async fn query(&self, request: &SpeechRequest) -> Result<String, HoundifyError> {
        let body = match &request.input {
            SpeechInput::Audio(clip) => self.stream_audio(request, clip).await?,
            SpeechInput::Transcript(text) => self.text_query(request, text).await?,
        };
        parse_spoken_response(&body)
    }
}

#[async_trait]
impl SpeechProvider for HoundifyClient {
    async fn ask(&self, request: &SpeechRequest) -> anyhow::Result<String> {
        match self.query(request).await {
            Ok(answer) => {
                debug!(session = %request.session, answer = %answer, "Houndify response");
                Ok(answer)
            }
            Err(e) => {
                error!(session = %request.session, error = %e, "Houndify request failed");
                Err(e.into())
            }
        }
    }

    fn display_name(&self) -> &str {
        "Houndify"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use kgroute_core::config::ProviderKind;
    use wiremock::matchers::{header, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // "hound-secret-key" in URL-safe base64
    const CLIENT_KEY: &str = "aG91bmQtc2VjcmV0LWtleQ==";

    fn make_config(api_base: Option<&str>) -> KnowledgeConfig {
        KnowledgeConfig {
            enable: true,
            provider: ProviderKind::Houndify,
            id: "client-123".to_string(),
            key: CLIENT_KEY.to_string(),
            api_base: api_base.map(String::from),
            ..Default::default()
        }
    }

    fn ok_body(answer: &str) -> serde_json::Value {
        serde_json::json!({
            "Status": "OK",
            "NumToReturn": 1,
            "AllResults": [{ "SpokenResponseLong": answer }]
        })
    }

    // ── Parsing ──

    #[test]
    fn test_parse_ok_any_case() {
        let body = r#"{"Status":"ok","NumToReturn":1,"AllResults":[{"SpokenResponseLong":"answer"}]}"#;
        assert_eq!(parse_spoken_response(body).unwrap(), "answer");
    }

    #[test]
    fn test_parse_error_status() {
        let body = r#"{"Status":"ERROR","ErrorMessage":"bad audio"}"#;
        let err = parse_spoken_response(body).unwrap_err();
        assert!(matches!(err, HoundifyError::Status(_)));
        assert_eq!(err.to_string(), "bad audio");
    }

    #[test]
    fn test_parse_no_results() {
        let body = r#"{"Status":"OK","NumToReturn":0,"AllResults":[]}"#;
        let err = parse_spoken_response(body).unwrap_err();
        assert_eq!(err.to_string(), "no results to return");
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_spoken_response("<html>502</html>").unwrap_err();
        assert!(matches!(err, HoundifyError::Decode));
        assert_eq!(err.to_string(), "failed to decode json");

        // Valid JSON, but not an object
        assert!(matches!(
            parse_spoken_response("[1, 2]").unwrap_err(),
            HoundifyError::Decode
        ));
    }

    #[test]
    fn test_parse_missing_spoken_response() {
        let body = r#"{"Status":"OK","NumToReturn":1,"AllResults":[{"WrittenResponse":"x"}]}"#;
        let err = parse_spoken_response(body).unwrap_err();
        assert!(matches!(
            err,
            HoundifyError::Schema("AllResults[0].SpokenResponseLong")
        ));
    }

    #[test]
    fn test_parse_mistyped_fields() {
        let body = r#"{"Status":200,"NumToReturn":1}"#;
        assert!(matches!(
            parse_spoken_response(body).unwrap_err(),
            HoundifyError::Schema("Status")
        ));

        let body = r#"{"Status":"OK","NumToReturn":"one"}"#;
        assert!(matches!(
            parse_spoken_response(body).unwrap_err(),
            HoundifyError::Schema("NumToReturn")
        ));

        let body = r#"{"Status":"ERROR"}"#;
        assert!(matches!(
            parse_spoken_response(body).unwrap_err(),
            HoundifyError::Schema("ErrorMessage")
        ));
    }

    // ── Client construction / signing ──

    #[test]
    fn test_invalid_key_rejected() {
        let mut config = make_config(None);
        config.key = "not base64 at all!".to_string();
        assert!(matches!(
            HoundifyClient::new(&config).unwrap_err(),
            HoundifyError::InvalidKey
        ));
    }

    #[test]
    fn test_default_api_base() {
        let client = HoundifyClient::new(&make_config(None)).unwrap();
        assert_eq!(client.api_base, DEFAULT_HOUNDIFY_BASE);

        let client = HoundifyClient::new(&make_config(Some("http://localhost:9000/"))).unwrap();
        assert_eq!(client.api_base, "http://localhost:9000");
    }

    #[test]
    fn test_client_authentication_format() {
        let client = HoundifyClient::new(&make_config(None)).unwrap();
        let value = client
            .client_authentication("vector-1", "req-1", 1_700_000_000)
            .unwrap();

        let parts: Vec<&str> = value.split(';').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "client-123");
        assert_eq!(parts[1], "1700000000");

        let mut mac = HmacSha256::new_from_slice(b"hound-secret-key").unwrap();
        mac.update(b"vector-1;req-11700000000");
        assert_eq!(parts[2], URL_SAFE.encode(mac.finalize().into_bytes()));
    }

    #[test]
    fn test_debug_hides_key() {
        let client = HoundifyClient::new(&make_config(None)).unwrap();
        let dump = format!("{client:?}");
        assert!(!dump.contains(CLIENT_KEY));
        assert!(dump.contains("client-123"));
    }

    // ── Integration tests with mock server ──

    #[tokio::test]
    async fn test_audio_request_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio"))
            .and(header_exists("Hound-Client-Authentication"))
            .and(header_exists("Hound-Request-Authentication"))
            .and(header_exists("Hound-Request-Info"))
            .and(header("Content-Type", "audio/wav"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("Paris is the capital of France.")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HoundifyClient::new(&make_config(Some(&mock_server.uri()))).unwrap();
        let request = SpeechRequest::from_audio(
            "sess-1",
            "00e20100",
            AudioClip::new(vec![0; 16_000], 16_000),
        );

        let answer = client.ask(&request).await.unwrap();
        assert_eq!(answer, "Paris is the capital of France.");
    }

    #[tokio::test]
    async fn test_text_request_uses_text_endpoint() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/text"))
            .and(query_param("query", "how tall is mount everest"))
            .and(header_exists("Hound-Client-Authentication"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("About 8849 meters.")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HoundifyClient::new(&make_config(Some(&mock_server.uri()))).unwrap();
        let request =
            SpeechRequest::from_transcript("sess-2", "00e20100", "how tall is mount everest");

        assert_eq!(client.ask(&request).await.unwrap(), "About 8849 meters.");
    }

    #[tokio::test]
    async fn test_error_status_from_server() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Status": "Error",
                "ErrorMessage": "bad audio"
            })))
            .mount(&mock_server)
            .await;

        let client = HoundifyClient::new(&make_config(Some(&mock_server.uri()))).unwrap();
        let request =
            SpeechRequest::from_audio("s", "d", AudioClip::new(vec![0; 640], 16_000));

        let err = client.query(&request).await.unwrap_err();
        assert_eq!(err.to_string(), "bad audio");
    }

    #[tokio::test]
    async fn test_http_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&mock_server)
            .await;

        let client = HoundifyClient::new(&make_config(Some(&mock_server.uri()))).unwrap();
        let request =
            SpeechRequest::from_audio("s", "d", AudioClip::new(vec![0; 640], 16_000));

        match client.query(&request).await.unwrap_err() {
            HoundifyError::Http { status, body } => {
                assert_eq!(status.as_u16(), 401);
                assert_eq!(body, "unauthorized");
            }
            other => panic!("expected HTTP error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_network_error() {
        let client = HoundifyClient::new(&make_config(Some("http://127.0.0.1:1"))).unwrap();
        let request = SpeechRequest::from_transcript("s", "d", "hello");
        assert!(matches!(
            client.query(&request).await.unwrap_err(),
            HoundifyError::Transport(_)
        ));
    }
}
