//! Provider snapshot — one configuration and the client built from it.
//!
//! A snapshot is never mutated. Reconfiguring builds a new one and swaps the
//! `Arc`, so a request always sees a config and client that belong together.
//! When the config is disabled or its credentials are unusable, no client is
//! built at all, which is what guarantees zero provider traffic.

use std::sync::Arc;

use tracing::{error, info, warn};

use kgroute_core::config::{KnowledgeConfig, ProviderKind};
use kgroute_providers::{
    CompletionProvider, HoundifyClient, OpenAiHelper, SpeechProvider, TogetherClient,
};

/// The adapter selected for a configuration.
#[derive(Clone)]
pub enum Adapter {
    /// Consumes the raw request (Houndify).
    Speech(Arc<dyn SpeechProvider>),
    /// Consumes transcribed text (OpenAI helper, Together).
    Completion(Arc<dyn CompletionProvider>),
}

impl Adapter {
    pub fn display_name(&self) -> &str {
        match self {
            Adapter::Speech(p) => p.display_name(),
            Adapter::Completion(p) => p.display_name(),
        }
    }
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Adapter::Speech(p) => write!(f, "Speech({})", p.display_name()),
            Adapter::Completion(p) => write!(f, "Completion({})", p.display_name()),
        }
    }
}

#[derive(Debug)]
pub struct ProviderSnapshot {
    config: KnowledgeConfig,
    adapter: Option<Adapter>,
}

impl ProviderSnapshot {
    /// Build the client for `config`, or a disabled snapshot if it can't be used.
    pub fn build(config: KnowledgeConfig) -> Self {
        if !config.enable {
            info!("Knowledge graph is disabled, not initializing a provider client");
            return Self::disabled(config);
        }
        if config.provider == ProviderKind::None {
            warn!("Knowledge graph is enabled but no known provider is selected");
            return Self::disabled(config);
        }
        if !config.has_credentials() {
            warn!(
                provider = %config.provider,
                "Provider credentials are empty, not initializing client"
            );
            return Self::disabled(config);
        }

        let adapter = match config.provider {
            ProviderKind::Houndify => HoundifyClient::new(&config)
                .map(|c| Adapter::Speech(Arc::new(c)))
                .map_err(anyhow::Error::from),
            ProviderKind::Openai => {
                OpenAiHelper::new(&config).map(|c| Adapter::Completion(Arc::new(c)))
            }
            ProviderKind::Together => {
                TogetherClient::new(&config).map(|c| Adapter::Completion(Arc::new(c)))
            }
            ProviderKind::None => return Self::disabled(config),
        };

        match adapter {
            Ok(adapter) => {
                info!(provider = adapter.display_name(), "Initialized provider client");
                Self::with_adapter(config, adapter)
            }
            Err(e) => {
                error!(
                    provider = %config.provider,
                    error = %e,
                    "Failed to initialize provider client, knowledge graph disabled"
                );
                Self::disabled(config)
            }
        }
    }

    /// A snapshot that answers every request with the "not enabled" sentence.
    pub fn disabled(config: KnowledgeConfig) -> Self {
        ProviderSnapshot {
            config,
            adapter: None,
        }
    }

    /// A snapshot with a caller-supplied adapter.
    pub fn with_adapter(config: KnowledgeConfig, adapter: Adapter) -> Self {
        ProviderSnapshot {
            config,
            adapter: Some(adapter),
        }
    }

    pub fn config(&self) -> &KnowledgeConfig {
        &self.config
    }

    pub fn adapter(&self) -> Option<&Adapter> {
        self.adapter.as_ref()
    }

    /// The provider that will answer, or `None` when disabled.
    pub fn selected(&self) -> ProviderKind {
        if self.adapter.is_some() {
            self.config.provider
        } else {
            ProviderKind::None
        }
    }
}
