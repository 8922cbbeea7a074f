/*!
 * Provider registry and selection.
 *
 * Holds the configured backends in preference order and picks the one that
 * serves a requested language pair. Built once from configuration; immutable
 * afterwards.
 */

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{EngineConfig, ProviderKind, ProviderSettings};
use crate::errors::TranslationError;
use crate::language::Language;
use crate::providers::{DeepLProvider, GoogleProvider, TranslationBackend};

/// A backend together with its selection rank and retry policy
#[derive(Debug, Clone)]
pub struct RegisteredProvider {
    /// The wire adapter
    pub backend: Arc<dyn TranslationBackend>,
    /// Preference rank; lower is preferred
    pub priority: u32,
    /// Per-request time budget enforced by the orchestrator
    pub timeout: Duration,
    /// Maximum retry attempts after the first call
    pub retry_count: u32,
    /// Base backoff in milliseconds, doubled on each retry
    pub retry_backoff_ms: u64,
}

impl RegisteredProvider {
    /// Name of the underlying backend
    pub fn name(&self) -> &str {
        self.backend.name()
    }
}

/// Summary of one registered backend, for introspection
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    /// Backend name
    pub name: String,
    /// Preference rank
    pub priority: u32,
    /// Languages the backend serves
    pub supported_languages: Vec<Language>,
}

/// Ranked set of configured backends
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    /// Sorted by priority ascending
    providers: Vec<RegisteredProvider>,
}

impl ProviderRegistry {
    /// Build the registry from configuration.
    ///
    /// Disabled and keyless entries are skipped; an empty registry is valid
    /// and every selection against it fails with an unsupported-pair error.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let mut registry = Self::default();

        for settings in config.ranked_providers() {
            let backend = build_backend(settings);
            registry.register_with_policy(
                backend,
                settings.priority,
                Duration::from_secs(settings.timeout_secs),
                settings.retry_count,
                settings.retry_backoff_ms,
            );
        }

        Ok(registry)
    }

    /// Register a backend with the default retry policy (for tests and
    /// hand-assembled setups)
    pub fn register(&mut self, backend: Arc<dyn TranslationBackend>, priority: u32) {
        self.register_with_policy(backend, priority, Duration::from_secs(30), 2, 500);
    }

    /// Register a backend with an explicit retry policy
    pub fn register_with_policy(
        &mut self,
        backend: Arc<dyn TranslationBackend>,
        priority: u32,
        timeout: Duration,
        retry_count: u32,
        retry_backoff_ms: u64,
    ) {
        self.providers.push(RegisteredProvider {
            backend,
            priority,
            timeout,
            retry_count,
            retry_backoff_ms,
        });
        self.providers.sort_by_key(|p| p.priority);
    }

    /// Whether any backend is registered
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Select the backend for a language pair.
    ///
    /// An explicit name overrides the ranking but still fails if the named
    /// backend does not serve the pair; there is no silent fallback past an
    /// explicit choice.
    pub fn select(
        &self,
        source: Language,
        target: Language,
        name_override: Option<&str>,
    ) -> Result<&RegisteredProvider, TranslationError> {
        if let Some(name) = name_override {
            let provider = self
                .providers
                .iter()
                .find(|p| p.name() == name)
                .ok_or_else(|| {
                    TranslationError::Validation(format!("Unknown provider: {}", name))
                })?;

            if !provider.backend.supports_pair(source, target) {
                return Err(TranslationError::UnsupportedLanguagePair {
                    source_language: source,
                    target_language: target,
                });
            }
            return Ok(provider);
        }

        self.providers
            .iter()
            .find(|p| p.backend.supports_pair(source, target))
            .ok_or(TranslationError::UnsupportedLanguagePair {
                source_language: source,
                target_language: target,
            })
    }

    /// Select the preferred backend that offers language detection
    pub fn select_detector(&self) -> Option<&RegisteredProvider> {
        self.providers
            .iter()
            .find(|p| p.backend.capabilities().supports_detection)
    }

    /// Summaries of all registered backends in preference order
    pub fn provider_info(&self) -> Vec<ProviderInfo> {
        self.providers
            .iter()
            .map(|p| ProviderInfo {
                name: p.name().to_string(),
                priority: p.priority,
                supported_languages: p.backend.capabilities().supported_languages.clone(),
            })
            .collect()
    }
}

fn build_backend(settings: &ProviderSettings) -> Arc<dyn TranslationBackend> {
    let timeout = Duration::from_secs(settings.timeout_secs);
    match settings.kind {
        ProviderKind::DeepL => Arc::new(DeepLProvider::new(
            settings.api_key.clone(),
            settings.endpoint.clone(),
            timeout,
        )),
        ProviderKind::Google => Arc::new(GoogleProvider::new(
            settings.api_key.clone(),
            settings.endpoint.clone(),
            timeout,
        )),
    }
}
