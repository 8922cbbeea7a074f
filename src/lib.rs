/*!
 * # babelcache - Translation orchestration and caching engine
 *
 * A Rust library that coordinates external machine-translation providers
 * behind one interface, with a durable result cache and deterministic
 * quality assessment.
 *
 * ## Features
 *
 * - Pluggable provider adapters behind a uniform trait:
 *   - DeepL REST API
 *   - Google Cloud Translation v2 API
 * - Durable SQLite-backed cache keyed by (text, source, target), with
 *   usage accounting, expiry sweeps, and per-provider totals
 * - Deterministic quality scoring with a single human-review choke point
 * - Batch fan-out with per-pair failure granularity and bounded concurrency
 * - Coalescing of concurrent identical requests onto one provider call
 * - Preference-ranked provider selection with explicit overrides
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `config`: Engine configuration (providers, cache, concurrency)
 * - `language`: Canonical language code set and detection-tag normalization
 * - `quality`: Deterministic quality assessment
 * - `cache`: Durable translation cache:
 *   - `cache::connection`: Async-safe SQLite access
 *   - `cache::schema`: Table definitions and migrations
 *   - `cache::store`: Cache operations and accounting
 * - `providers`: Wire adapters for the translation backends
 * - `orchestrator`: The `Translator` facade, registry, and batch jobs
 * - `errors`: Custom error types for the engine
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod cache;
pub mod config;
pub mod errors;
pub mod language;
pub mod orchestrator;
pub mod providers;
pub mod quality;

// Re-export main types for easier usage
pub use cache::{CacheStats, CachedTranslation, ProviderUsage, TranslationCache};
pub use config::{CacheConfig, EngineConfig, ProviderKind, ProviderSettings};
pub use errors::{CacheError, ProviderError, TranslationError};
pub use language::{Language, ALL_LANGUAGES};
pub use orchestrator::{
    BatchStatus, BatchTranslationJob, MultilingualFill, ProviderRegistry, TranslationResult,
    Translator,
};
pub use quality::{QualityAssessment, QualityBand};
