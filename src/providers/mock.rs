/*!
 * Mock backend implementations for testing.
 *
 * This module provides mock backends that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds with translated text
 * - `MockProvider::intermittent(n)` - Fails every nth request
 * - `MockProvider::failing()` - Always fails with an error
 *
 * The call counter is shared across clones so tests can assert how many
 * provider calls the orchestrator actually issued.
 */

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::language::{Language, ALL_LANGUAGES};
use crate::providers::{ProviderCapabilities, TranslationBackend};

/// Behavior mode for the mock backend
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a marked-up translation
    Working,
    /// Always fails with a server error
    Failing,
    /// Always fails with an authentication error (not retryable)
    Unauthorized,
    /// Fails only for the given source texts, succeeds for the rest
    FailingFor(HashSet<String>),
    /// Fails intermittently (every nth request)
    Intermittent { fail_every: usize },
    /// Returns an empty translation
    Empty,
    /// Returns the source text verbatim
    Identity,
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock backend for testing orchestrator behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    name: String,
    behavior: MockBehavior,
    /// Shared across clones
    request_count: Arc<AtomicUsize>,
    capabilities: ProviderCapabilities,
    /// Language reported by detect_language
    detection: Language,
}

impl MockProvider {
    /// Create a new mock backend with the specified behavior
    pub fn new(name: impl Into<String>, behavior: MockBehavior) -> Self {
        Self {
            name: name.into(),
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            capabilities: ProviderCapabilities {
                supported_languages: ALL_LANGUAGES.to_vec(),
                supports_detection: true,
                max_batch_size: 64,
            },
            detection: Language::En,
        }
    }

    /// Create a working mock backend that always succeeds
    pub fn working() -> Self {
        Self::new("mock", MockBehavior::Working)
    }

    /// Create a failing mock backend that always errors
    pub fn failing() -> Self {
        Self::new("mock", MockBehavior::Failing)
    }

    /// Create a mock backend that always rejects the credentials
    pub fn unauthorized() -> Self {
        Self::new("mock", MockBehavior::Unauthorized)
    }

    /// Create a mock that fails only for the given source texts
    pub fn failing_for<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = texts.into_iter().map(Into::into).collect();
        Self::new("mock", MockBehavior::FailingFor(set))
    }

    /// Create an intermittently failing mock backend. A zero interval is
    /// clamped to 1, which fails every call.
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(
            "mock",
            MockBehavior::Intermittent {
                fail_every: fail_every.max(1),
            },
        )
    }

    /// Create a mock that returns empty translations
    pub fn empty() -> Self {
        Self::new("mock", MockBehavior::Empty)
    }

    /// Create a mock that echoes the source text back
    pub fn identity() -> Self {
        Self::new("mock", MockBehavior::Identity)
    }

    /// Create a mock that sleeps before answering
    pub fn slow(delay_ms: u64) -> Self {
        Self::new("mock", MockBehavior::Slow { delay_ms })
    }

    /// Restrict the languages this mock claims to support
    pub fn with_languages(mut self, languages: Vec<Language>) -> Self {
        self.capabilities.supported_languages = languages;
        self
    }

    /// Set the language reported by detect_language
    pub fn with_detection(mut self, language: Language) -> Self {
        self.detection = language;
        self
    }

    /// Number of provider calls issued so far, shared across clones
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Deterministic translation used by the working behaviors
    pub fn translated(text: &str, target: Language) -> String {
        format!("[{}] {}", target.code(), text)
    }

    fn translate_one(
        &self,
        count: usize,
        text: &str,
        target: Language,
    ) -> Result<String, ProviderError> {
        match &self.behavior {
            MockBehavior::Working => Ok(Self::translated(text, target)),

            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),

            MockBehavior::Unauthorized => Err(ProviderError::AuthenticationError(
                "Simulated bad credentials".to_string(),
            )),

            MockBehavior::FailingFor(texts) => {
                if texts.contains(text) {
                    Err(ProviderError::ApiError {
                        status_code: 500,
                        message: format!("Simulated failure for '{}'", text),
                    })
                } else {
                    Ok(Self::translated(text, target))
                }
            }

            MockBehavior::Intermittent { fail_every } => {
                let interval = (*fail_every).max(1);
                if count % interval == interval - 1 {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                    })
                } else {
                    Ok(Self::translated(text, target))
                }
            }

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Identity => Ok(text.to_string()),

            MockBehavior::Slow { .. } => Ok(Self::translated(text, target)),
        }
    }
}

#[async_trait]
impl TranslationBackend for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn translate(
        &self,
        text: &str,
        _source: Language,
        target: Language,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        if let MockBehavior::Slow { delay_ms } = &self.behavior {
            tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
        }

        self.translate_one(count, text, target)
    }

    async fn batch_translate(
        &self,
        texts: &[String],
        _source: Language,
        target: Language,
    ) -> Result<Vec<String>, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        if let MockBehavior::Slow { delay_ms } = &self.behavior {
            tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
        }

        // Whole-call semantics: one bad entry fails the batch.
        texts
            .iter()
            .map(|text| self.translate_one(count, text, target))
            .collect()
    }

    async fn detect_language(&self, _text: &str) -> Result<Language, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),
            _ => Ok(self.detection),
        }
    }
}
