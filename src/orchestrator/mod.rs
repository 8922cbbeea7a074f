/*!
 * Translation orchestration.
 *
 * The `Translator` facade ties the layers together: it validates requests,
 * consults the cache, picks a backend through the registry, enforces the
 * per-provider timeout and retry policy, assesses quality, and stores the
 * outcome back into the cache.
 *
 * Concurrent requests for the same uncached (text, source, target) triple
 * are coalesced onto a single in-flight provider call; waiters share its
 * outcome instead of issuing duplicate calls.
 */

use anyhow::Result;
use futures::stream::{self, StreamExt};
use log::{info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::cache::{CacheStats, ProviderUsage, TranslationCache};
use crate::config::EngineConfig;
use crate::errors::{ProviderError, TranslationError};
use crate::language::{Language, ALL_LANGUAGES};
use crate::quality::{self, QualityAssessment};

pub mod batch;
pub mod registry;

pub use batch::{BatchFailure, BatchResult, BatchStatus, BatchTranslationJob};
pub use registry::{ProviderInfo, ProviderRegistry, RegisteredProvider};

/// Outcome of a single translation request
#[derive(Debug, Clone)]
pub struct TranslationResult {
    /// Translated text
    pub translated_text: String,
    /// Provider that produced the translation (or is credited by the cache)
    pub provider: String,
    /// Quality snapshot
    pub quality: QualityAssessment,
    /// Whether the result was served from the cache
    pub from_cache: bool,
}

/// Outcome of a multilingual fill
#[derive(Debug, Clone)]
pub struct MultilingualFill {
    /// The content map with previously missing languages filled in
    pub content: HashMap<Language, String>,
    /// The language whose text was used as the source
    pub source_language: Language,
    /// Languages that could not be filled, with the reason
    pub failures: Vec<(Language, String)>,
}

/// Key identifying one in-flight provider call
type FlightKey = (String, Language, Language, String);

/// Translation orchestrator
pub struct Translator {
    registry: ProviderRegistry,
    cache: TranslationCache,
    max_concurrent_requests: usize,
    retention: chrono::Duration,
    in_flight: Mutex<HashMap<FlightKey, Arc<OnceCell<TranslationResult>>>>,
}

impl Translator {
    /// Build a translator from configuration
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;

        let registry = ProviderRegistry::from_config(config)?;
        let cache = TranslationCache::from_config(&config.cache)?;

        Ok(Self::with_parts(
            registry,
            cache,
            config.max_concurrent_requests,
            config.cache.retention_horizon(),
        ))
    }

    /// Assemble a translator from pre-built parts (for tests and embedding)
    pub fn with_parts(
        registry: ProviderRegistry,
        cache: TranslationCache,
        max_concurrent_requests: usize,
        retention: chrono::Duration,
    ) -> Self {
        Self {
            registry,
            cache,
            max_concurrent_requests: max_concurrent_requests.max(1),
            retention,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Translate a single text.
    ///
    /// A provider is selected first, so unsupported pairs fail before any
    /// cache I/O. Then the cache is consulted; on a miss the selected
    /// backend is called with the configured timeout and retry policy, the
    /// result is quality-assessed and stored, and `from_cache` is false. An
    /// explicit provider name overrides the ranking without fallback.
    pub async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
        provider_override: Option<&str>,
    ) -> Result<TranslationResult, TranslationError> {
        validate_text(text)?;
        validate_pair(source, target)?;

        // Selection happens before the cache is touched: an unsupported pair
        // or unknown override fails without any persistence side effects, and
        // a stale entry for a pair no longer served is never returned.
        let provider = self.registry.select(source, target, provider_override)?;

        if let Some(hit) = self.cache.lookup(text, source, target).await? {
            return Ok(TranslationResult {
                translated_text: hit.translated_text,
                provider: hit.provider,
                quality: hit.quality,
                from_cache: true,
            });
        }

        // Coalesce concurrent misses for the same key onto one call
        let key: FlightKey = (
            text.to_string(),
            source,
            target,
            provider.name().to_string(),
        );
        let cell = {
            let mut in_flight = self.in_flight.lock();
            in_flight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let result = cell
            .get_or_try_init(|| self.translate_via_provider(text, source, target, provider))
            .await
            .cloned();

        let mut in_flight = self.in_flight.lock();
        if let Some(existing) = in_flight.get(&key) {
            if Arc::ptr_eq(existing, &cell) {
                in_flight.remove(&key);
            }
        }

        result
    }

    /// Translate a set of texts into a set of target languages.
    ///
    /// Validation is fail-fast and happens before any I/O. Afterwards,
    /// failure granularity is the (text, target) pair: a provider batch call
    /// that fails is retried entry by entry, so one poisoned text costs only
    /// its own pairs.
    pub async fn translate_batch(
        &self,
        texts: &[String],
        source: Language,
        targets: &[Language],
        provider_override: Option<&str>,
    ) -> Result<BatchTranslationJob, TranslationError> {
        if texts.is_empty() {
            return Err(TranslationError::Validation(
                "Batch contains no source texts".to_string(),
            ));
        }
        if let Some(index) = texts.iter().position(|t| t.trim().is_empty()) {
            return Err(TranslationError::Validation(format!(
                "Source text at index {} is empty",
                index
            )));
        }
        if targets.is_empty() {
            return Err(TranslationError::Validation(
                "Batch names no target languages".to_string(),
            ));
        }
        if targets.contains(&source) {
            return Err(TranslationError::Validation(
                "Target languages include the source language".to_string(),
            ));
        }

        let mut job = BatchTranslationJob::new(source, targets.to_vec(), texts.to_vec());
        job.status = BatchStatus::InProgress;
        info!(
            "Starting batch job {}: {} texts x {} targets",
            job.id,
            texts.len(),
            targets.len()
        );

        let outcomes: Vec<Vec<(usize, Language, Result<TranslationResult, String>)>> =
            stream::iter(
                targets
                    .iter()
                    .copied()
                    .map(|target| self.translate_all_for_target(texts, source, target, provider_override)),
            )
            .buffer_unordered(self.max_concurrent_requests)
            .collect()
            .await;

        for pairs in outcomes {
            for (text_index, target_language, outcome) in pairs {
                match outcome {
                    Ok(result) => job.results.push(BatchResult {
                        text_index,
                        target_language,
                        translated_text: result.translated_text,
                        provider: result.provider,
                        quality: result.quality,
                        from_cache: result.from_cache,
                    }),
                    Err(error) => job.failures.push(BatchFailure {
                        text_index,
                        target_language,
                        error,
                    }),
                }
            }
        }

        job.finalize();
        info!(
            "Batch job {} finished: {} ok, {} failed, status {}",
            job.id,
            job.results.len(),
            job.failures.len(),
            job.status
        );
        Ok(job)
    }

    /// Fill the missing target languages of a content map.
    ///
    /// English is the preferred source when present and non-empty, otherwise
    /// the first non-empty language in canonical order. Existing non-empty
    /// values are never overwritten, and a language that cannot be filled is
    /// reported rather than failing the whole call.
    pub async fn translate_multilingual(
        &self,
        content: &HashMap<Language, String>,
        targets: &[Language],
    ) -> Result<MultilingualFill, TranslationError> {
        let has_text =
            |lang: &Language| content.get(lang).map(|t| !t.trim().is_empty()).unwrap_or(false);

        let source = if has_text(&Language::En) {
            Language::En
        } else {
            ALL_LANGUAGES
                .iter()
                .copied()
                .find(|lang| has_text(lang))
                .ok_or_else(|| {
                    TranslationError::Validation(
                        "Content has no non-empty language to translate from".to_string(),
                    )
                })?
        };

        let source_text = content[&source].clone();
        let mut filled = content.clone();
        let mut failures = Vec::new();

        for &target in targets {
            if target == source || has_text(&target) {
                continue;
            }
            match self.translate(&source_text, source, target, None).await {
                Ok(result) => {
                    filled.insert(target, result.translated_text);
                }
                Err(e) => {
                    warn!("Could not fill {}: {}", target, e);
                    failures.push((target, e.to_string()));
                }
            }
        }

        Ok(MultilingualFill {
            content: filled,
            source_language: source,
            failures,
        })
    }

    /// Detect the language of a text using the preferred detecting backend
    pub async fn detect_language(&self, text: &str) -> Result<Language, TranslationError> {
        validate_text(text)?;

        let provider = self.registry.select_detector().ok_or_else(|| {
            TranslationError::Validation("No provider offers language detection".to_string())
        })?;

        self.call_with_retry(provider, || provider.backend.detect_language(text))
            .await
            .map_err(|e| TranslationError::provider(provider.name(), e))
    }

    /// Registered backends in preference order
    pub fn available_providers(&self) -> Vec<ProviderInfo> {
        self.registry.provider_info()
    }

    /// Cache usage totals grouped by provider
    pub async fn provider_usage(&self) -> Result<Vec<ProviderUsage>, TranslationError> {
        Ok(self.cache.usage_by_provider().await?)
    }

    /// Cache-wide statistics
    pub async fn cache_stats(&self) -> Result<CacheStats, TranslationError> {
        Ok(self.cache.stats().await?)
    }

    /// Sweep cache entries older than the given horizon, falling back to the
    /// configured retention when none is supplied. Returns the number of
    /// deleted entries.
    pub async fn clear_expired_cache(
        &self,
        horizon: Option<chrono::Duration>,
    ) -> Result<usize, TranslationError> {
        Ok(self
            .cache
            .purge_expired(horizon.unwrap_or(self.retention))
            .await?)
    }

    /// Drive one uncached translation through the selected backend
    async fn translate_via_provider(
        &self,
        text: &str,
        source: Language,
        target: Language,
        provider: &RegisteredProvider,
    ) -> Result<TranslationResult, TranslationError> {
        let translated = self
            .call_with_retry(provider, || provider.backend.translate(text, source, target))
            .await
            .map_err(|e| TranslationError::provider(provider.name(), e))?;

        let assessment = quality::assess(text, &translated, source, target);
        if let Err(e) = self
            .cache
            .store(text, source, target, &translated, provider.name(), &assessment)
            .await
        {
            // A broken cache must not take down a finished translation
            warn!("Failed to cache translation: {}", e);
        }

        Ok(TranslationResult {
            translated_text: translated,
            provider: provider.name().to_string(),
            quality: assessment,
            from_cache: false,
        })
    }

    /// Translate every text into one target language.
    ///
    /// Cache hits are taken per text; the remaining misses go out as one
    /// provider batch call. If that call fails (or comes back malformed),
    /// each miss is retried individually so failures stay per-pair.
    async fn translate_all_for_target(
        &self,
        texts: &[String],
        source: Language,
        target: Language,
        provider_override: Option<&str>,
    ) -> Vec<(usize, Language, Result<TranslationResult, String>)> {
        let provider = match self.registry.select(source, target, provider_override) {
            Ok(p) => p,
            Err(e) => {
                let message = e.to_string();
                return (0..texts.len())
                    .map(|i| (i, target, Err(message.clone())))
                    .collect();
            }
        };

        let mut slots: Vec<Option<Result<TranslationResult, String>>> = vec![None; texts.len()];
        let mut misses: Vec<usize> = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            match self.cache.lookup(text, source, target).await {
                Ok(Some(hit)) => {
                    slots[i] = Some(Ok(TranslationResult {
                        translated_text: hit.translated_text,
                        provider: hit.provider,
                        quality: hit.quality,
                        from_cache: true,
                    }));
                }
                Ok(None) => misses.push(i),
                Err(e) => {
                    warn!("Cache lookup failed, treating as miss: {}", e);
                    misses.push(i);
                }
            }
        }

        if !misses.is_empty() {
            let miss_texts: Vec<String> = misses.iter().map(|&i| texts[i].clone()).collect();

            let batch_outcome = self
                .call_with_retry(provider, || {
                    provider.backend.batch_translate(&miss_texts, source, target)
                })
                .await;

            let translations = match batch_outcome {
                Ok(translations) if translations.len() == miss_texts.len() => Some(translations),
                Ok(translations) => {
                    warn!(
                        "Provider '{}' returned {} translations for {} texts, retrying individually",
                        provider.name(),
                        translations.len(),
                        miss_texts.len()
                    );
                    None
                }
                Err(e) => {
                    warn!(
                        "Batch call to '{}' failed, retrying entries individually: {}",
                        provider.name(),
                        e
                    );
                    None
                }
            };

            match translations {
                Some(translations) => {
                    for (&i, translated) in misses.iter().zip(translations) {
                        let assessment =
                            quality::assess(&texts[i], &translated, source, target);
                        if let Err(e) = self
                            .cache
                            .store(&texts[i], source, target, &translated, provider.name(), &assessment)
                            .await
                        {
                            warn!("Failed to cache translation: {}", e);
                        }
                        slots[i] = Some(Ok(TranslationResult {
                            translated_text: translated,
                            provider: provider.name().to_string(),
                            quality: assessment,
                            from_cache: false,
                        }));
                    }
                }
                None => {
                    for &i in &misses {
                        let outcome = self
                            .translate(&texts[i], source, target, provider_override)
                            .await
                            .map_err(|e| e.to_string());
                        slots[i] = Some(outcome);
                    }
                }
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                (
                    i,
                    target,
                    slot.unwrap_or_else(|| Err("Pair was not processed".to_string())),
                )
            })
            .collect()
    }

    /// Run a provider call under the provider's timeout, retrying transient
    /// failures with exponential backoff
    async fn call_with_retry<T, F, Fut>(
        &self,
        provider: &RegisteredProvider,
        op: F,
    ) -> Result<T, ProviderError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let max_attempts = provider.retry_count + 1;
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let outcome = match tokio::time::timeout(provider.timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(format!(
                    "request exceeded {:?}",
                    provider.timeout
                ))),
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let backoff = provider.retry_backoff_ms * (1u64 << (attempt - 1));
                    warn!(
                        "Provider '{}' attempt {}/{} failed: {}. Retrying in {} ms",
                        provider.name(),
                        attempt,
                        max_attempts,
                        e,
                        backoff
                    );
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn validate_text(text: &str) -> Result<(), TranslationError> {
    if text.trim().is_empty() {
        return Err(TranslationError::Validation(
            "Source text is empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_pair(source: Language, target: Language) -> Result<(), TranslationError> {
    if source == target {
        return Err(TranslationError::Validation(format!(
            "Source and target language are both {}",
            source
        )));
    }
    Ok(())
}
