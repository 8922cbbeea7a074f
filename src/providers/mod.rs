/*!
 * Provider adapters for external translation services.
 *
 * This module contains client implementations for the supported backends:
 * - DeepL: DeepL REST API
 * - Google: Google Cloud Translation v2 API
 *
 * Adapters are thin wire clients. They normalize heterogeneous request and
 * response formats onto one trait and map transport and API failures onto
 * `ProviderError`. Retry, timeout enforcement, caching, and quality
 * assessment all live in the orchestrator, never here.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;
use crate::language::Language;

/// Static description of what a backend can do
#[derive(Debug, Clone)]
pub struct ProviderCapabilities {
    /// Languages the backend accepts on either side of a pair
    pub supported_languages: Vec<Language>,

    /// Whether the backend offers language detection
    pub supports_detection: bool,

    /// Maximum number of texts accepted in one batch call
    pub max_batch_size: usize,
}

impl ProviderCapabilities {
    /// Whether the backend can translate from `source` to `target`
    pub fn supports_pair(&self, source: Language, target: Language) -> bool {
        source != target
            && self.supported_languages.contains(&source)
            && self.supported_languages.contains(&target)
    }
}

/// Common trait for all translation backends
///
/// This trait defines the interface that all adapter implementations must
/// follow, allowing the orchestrator to use them interchangeably.
#[async_trait]
pub trait TranslationBackend: Send + Sync + Debug {
    /// Stable lowercase identifier, recorded in cache rows and logs
    fn name(&self) -> &str;

    /// Static capabilities of this backend
    fn capabilities(&self) -> &ProviderCapabilities;

    /// Whether this backend can translate the given pair
    fn supports_pair(&self, source: Language, target: Language) -> bool {
        self.capabilities().supports_pair(source, target)
    }

    /// Translate a single text
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or an error
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, ProviderError>;

    /// Translate several texts in one call, preserving order.
    ///
    /// The whole call succeeds or fails as a unit; per-text recovery is the
    /// orchestrator's job.
    async fn batch_translate(
        &self,
        texts: &[String],
        source: Language,
        target: Language,
    ) -> Result<Vec<String>, ProviderError>;

    /// Detect the language of a text
    async fn detect_language(&self, text: &str) -> Result<Language, ProviderError>;
}

/// Map a reqwest transport failure onto the matching provider error
pub(crate) fn transport_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout(error.to_string())
    } else if error.is_connect() {
        ProviderError::ConnectionError(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

/// Map a non-success HTTP status plus body onto the matching provider error
pub(crate) fn status_error(status: reqwest::StatusCode, body: String) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationError(body),
        429 => ProviderError::RateLimitExceeded(body),
        code => ProviderError::ApiError {
            status_code: code,
            message: body,
        },
    }
}

pub mod deepl;
pub mod google;
pub mod mock;

pub use deepl::DeepLProvider;
pub use google::GoogleProvider;
pub use mock::{MockBehavior, MockProvider};
