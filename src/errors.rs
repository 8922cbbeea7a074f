/*!
 * Error types for the babelcache engine.
 *
 * This module contains custom error types for different parts of the engine,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

use crate::language::Language;

/// Errors that can occur when talking to an external translation backend
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when sending an API request fails at the transport level
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Request exceeded its time budget
    #[error("timeout: {0}")]
    Timeout(String),
}

impl ProviderError {
    /// Whether the orchestrator may retry the call.
    ///
    /// Transport failures, timeouts, rate limits, and server-side (5xx)
    /// statuses are transient; client errors and auth failures are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::RequestFailed(_)
            | ProviderError::ConnectionError(_)
            | ProviderError::RateLimitExceeded(_)
            | ProviderError::Timeout(_) => true,
            ProviderError::ApiError { status_code, .. } => *status_code >= 500,
            ProviderError::ParseError(_) | ProviderError::AuthenticationError(_) => false,
        }
    }
}

/// Errors from the persistence layer beneath the translation cache.
///
/// Kept distinct from translation failures so callers can choose to serve an
/// absent result instead of failing the request outright.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Underlying storage could not be read or written
    #[error("Cache storage error: {0}")]
    Storage(String),

    /// Persisted data could not be encoded or decoded
    #[error("Cache serialization error: {0}")]
    Serialization(String),

    /// The blocking storage task panicked or was cancelled
    #[error("Cache task failed: {0}")]
    TaskFailed(String),
}

impl From<rusqlite::Error> for CacheError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Storage(error.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Errors surfaced by the translation orchestrator
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The selected backend failed; always attributable to one named provider
    #[error("Provider '{provider}' failed: {source}")]
    Provider {
        /// Name of the provider that failed
        provider: String,
        /// Underlying provider error
        #[source]
        source: ProviderError,
    },

    /// No enabled adapter declares support for the requested pair
    #[error("No enabled provider supports translating {source_language} to {target_language}")]
    UnsupportedLanguagePair {
        /// Requested source language
        source_language: Language,
        /// Requested target language
        target_language: Language,
    },

    /// Input rejected before any I/O was attempted
    #[error("Validation error: {0}")]
    Validation(String),

    /// The cache could not be read or written
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

impl TranslationError {
    /// Wrap a provider error with the name of the provider that raised it
    pub fn provider(name: impl Into<String>, source: ProviderError) -> Self {
        Self::Provider {
            provider: name.into(),
            source,
        }
    }
}
