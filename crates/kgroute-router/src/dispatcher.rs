//! Knowledge router — selects the provider for each request.
//!
//! The current `ProviderSnapshot` sits behind a `RwLock<Arc<_>>`. A request
//! clones the `Arc` once and works with that snapshot until it finishes, so
//! a concurrent `reinitialize` never mixes configs within one request.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, error, info, warn};

use kgroute_core::config::{KnowledgeConfig, ProviderKind};
use kgroute_core::error::RouterError;
use kgroute_core::stream::ResponseStream;
use kgroute_core::types::SpeechRequest;
use kgroute_providers::Transcriber;

use crate::emitter::emit;
use crate::snapshot::{Adapter, ProviderSnapshot};

/// Spoken when no provider is available for the current config.
pub const NOT_ENABLED: &str =
    "Knowledge graph is not enabled. This can be enabled in the web interface.";

/// Spoken when the question could not be transcribed.
pub const GENERIC_ERROR: &str = "There was an error.";

pub struct KnowledgeRouter {
    snapshot: RwLock<Arc<ProviderSnapshot>>,
    /// Serializes reinitialization; readers never take it.
    reconfigure: Mutex<()>,
    transcriber: Arc<dyn Transcriber>,
}

impl KnowledgeRouter {
    pub fn new(config: KnowledgeConfig, transcriber: Arc<dyn Transcriber>) -> Self {
        Self::from_snapshot(ProviderSnapshot::build(config), transcriber)
    }

    /// Start from a pre-built snapshot (custom adapters).
    pub fn from_snapshot(snapshot: ProviderSnapshot, transcriber: Arc<dyn Transcriber>) -> Self {
        KnowledgeRouter {
            snapshot: RwLock::new(Arc::new(snapshot)),
            reconfigure: Mutex::new(()),
            transcriber,
        }
    }

    /// The snapshot new requests will use.
    pub fn snapshot(&self) -> Arc<ProviderSnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The provider that will answer the next request.
    pub fn selected(&self) -> ProviderKind {
        self.snapshot().selected()
    }

    /// Rebuild provider clients from `config`.
    ///
    /// Returns `false` without touching anything when `config` equals the
    /// current one. Requests already in flight finish on the old snapshot.
    pub fn reinitialize(&self, config: KnowledgeConfig) -> bool {
        let _guard = self
            .reconfigure
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if self.snapshot().config() == &config {
            debug!("knowledge config unchanged, keeping provider clients");
            return false;
        }

        let next = Arc::new(ProviderSnapshot::build(config));
        info!(provider = %next.selected(), "knowledge router reinitialized");
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next;
        true
    }

    /// Produce the sentence to speak for `request`. Never fails.
    pub async fn answer(&self, request: &SpeechRequest) -> String {
        let snapshot = self.snapshot();
        let Some(adapter) = snapshot.adapter() else {
            info!(
                session = %request.session,
                "knowledge graph request while disabled"
            );
            return NOT_ENABLED.to_string();
        };

        match adapter {
            Adapter::Speech(provider) => match provider.ask(request).await {
                Ok(answer) => answer,
                Err(e) => {
                    warn!(
                        provider = provider.display_name(),
                        session = %request.session,
                        error = %e,
                        "provider request failed"
                    );
                    format!(
                        "There was an error making the request to {}.",
                        provider.display_name()
                    )
                }
            },
            Adapter::Completion(provider) => {
                let text = match self.transcriber.transcribe(request).await {
                    Ok(text) => text,
                    Err(e) => {
                        error!(
                            transcriber = self.transcriber.display_name(),
                            session = %request.session,
                            error = %e,
                            "transcription failed"
                        );
                        return GENERIC_ERROR.to_string();
                    }
                };
                debug!(
                    provider = provider.display_name(),
                    transcript = %text,
                    "dispatching transcribed question"
                );
                provider.complete(&text).await
            }
        }
    }

    /// Answer `request` and emit exactly one `NormalizedAnswer` on `stream`.
    pub async fn process_knowledge_graph(
        &self,
        request: &SpeechRequest,
        stream: &dyn ResponseStream,
    ) -> Result<(), RouterError> {
        let spoken_text = self.answer(request).await;
        emit(request, spoken_text, stream).await?;
        info!(
            session = %request.session,
            device = %request.device,
            "(KG) request served"
        );
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
