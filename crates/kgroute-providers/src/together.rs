//! Together provider — raw text completion over `POST /inference`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use kgroute_core::config::KnowledgeConfig;
use kgroute_core::utils::truncate_string;

use crate::traits::CompletionProvider;

/// Default Together API host.
pub const DEFAULT_TOGETHER_BASE: &str = "https://api.together.xyz";

pub const REQUEST_ERROR: &str = "There was an error making the request to Together API.";
pub const NO_RESPONSE: &str = "Together API returned no response.";
pub const ANSWER_NOT_FOUND: &str = "Answer was not found";

/// End-of-sequence token some models leave on the completion.
const END_OF_SEQUENCE: &str = "</s>";

const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 256;
const TOP_P: f64 = 1.0;

/// Wrap the question in the assistant persona prompt.
pub fn build_prompt(question: &str) -> String {
    format!(
        "You are a helpful robot called Vector . You will be given a question asked by a user \
         and you must provide the best answer you can. It may not be punctuated or spelled \
         correctly. Keep the answer concise yet informative. Here is the question: \"{question}\" \
         , Answer: "
    )
}

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    model: &'a str,
    prompt: String,
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
}

#[derive(Debug, Deserialize)]
struct InferenceResponse {
    output: InferenceOutput,
}

#[derive(Debug, Deserialize)]
struct InferenceOutput {
    choices: Vec<InferenceChoice>,
}

#[derive(Debug, Deserialize)]
struct InferenceChoice {
    text: String,
}

// ─────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────

pub struct TogetherClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for TogetherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TogetherClient")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl TogetherClient {
    pub fn new(config: &KnowledgeConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_TOGETHER_BASE.to_string());

        Ok(TogetherClient {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: config.key.trim().to_string(),
            model: config.model.clone(),
        })
    }

    fn inference_url(&self) -> String {
        format!("{}/inference", self.api_base)
    }
}

#[async_trait]
impl CompletionProvider for TogetherClient {
    async fn complete(&self, text: &str) -> String {
        let body = InferenceRequest {
            model: &self.model,
            prompt: build_prompt(text),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            top_p: TOP_P,
        };

        info!(model = %self.model, "Making request to Together API...");

        let response = match self
            .client
            .post(self.inference_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                error!(error = %e, "Together request failed");
                return REQUEST_ERROR.to_string();
            }
        };

        let status = response.status();
        let raw = match response.text().await {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = %e, "failed to read Together response body");
                return NO_RESPONSE.to_string();
            }
        };

        if !status.is_success() {
            error!(status = %status, body = %truncate_string(&raw, 500), "Together API error");
            return NO_RESPONSE.to_string();
        }

        let parsed: InferenceResponse = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!(error = %e, "failed to parse Together response");
                return NO_RESPONSE.to_string();
            }
        };

        match parsed.output.choices.into_iter().next() {
            Some(choice) => {
                let answer = choice
                    .text
                    .strip_suffix(END_OF_SEQUENCE)
                    .unwrap_or(&choice.text)
                    .to_string();
                debug!(answer = %truncate_string(&answer, 200), "Together response");
                answer
            }
            None => ANSWER_NOT_FOUND.to_string(),
        }
    }

    fn display_name(&self) -> &str {
        "Together"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
