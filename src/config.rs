/*!
 * Engine configuration.
 *
 * This module handles loading, validating, and saving the engine
 * configuration: which translation backends are enabled, their credentials
 * and preference ranks, cache location and retention, and concurrency limits.
 *
 * Provider settings are read once at process start; the provider registry
 * built from them is immutable for the lifetime of the orchestrator.
 */

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Kind of external translation backend
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// DeepL REST API
    #[default]
    DeepL,
    /// Google Cloud Translation v2 API
    Google,
}

impl ProviderKind {
    /// Lowercase provider identifier used in cache records and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeepL => "deepl",
            Self::Google => "google",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "deepl" => Ok(Self::DeepL),
            "google" => Ok(Self::Google),
            _ => Err(anyhow!("Invalid provider kind: {}", s)),
        }
    }
}

/// Configuration for one translation backend
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderSettings {
    /// Which backend this entry configures
    pub kind: ProviderKind,

    /// API key; entries without a key are skipped at registry construction
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL; empty selects the backend's public endpoint
    #[serde(default = "String::new")]
    pub endpoint: String,

    /// Whether this backend may be selected
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Preference rank; lower is preferred
    #[serde(default)]
    pub priority: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum retry attempts applied by the orchestrator
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl ProviderSettings {
    /// Create settings for a backend with defaults and the given key
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            endpoint: String::new(),
            enabled: true,
            priority: 0,
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }

    /// Set the preference rank (lower is preferred)
    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }
}

/// Cache storage configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    /// Path to the SQLite database file; None selects the default location
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Days after which cached translations expire
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            retention_days: default_retention_days(),
        }
    }
}

impl CacheConfig {
    /// Retention horizon as a chrono duration
    pub fn retention_horizon(&self) -> chrono::Duration {
        chrono::Duration::days(self.retention_days)
    }
}

/// Top-level engine configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    /// Configured translation backends
    #[serde(default)]
    pub providers: Vec<ProviderSettings>,

    /// Cache storage settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Upper bound on concurrently issued provider calls within one batch
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            cache: CacheConfig::default(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_requests == 0 {
            return Err(anyhow!("max_concurrent_requests must be at least 1"));
        }

        if self.cache.retention_days <= 0 {
            return Err(anyhow!("cache.retention_days must be positive"));
        }

        for settings in &self.providers {
            if settings.enabled && settings.api_key.trim().is_empty() {
                return Err(anyhow!(
                    "API key is required for enabled provider '{}'",
                    settings.kind
                ));
            }
        }

        Ok(())
    }

    /// Enabled provider settings in preference order (lowest priority first)
    pub fn ranked_providers(&self) -> Vec<&ProviderSettings> {
        let mut ranked: Vec<&ProviderSettings> = self
            .providers
            .iter()
            .filter(|p| p.enabled && !p.api_key.trim().is_empty())
            .collect();
        ranked.sort_by_key(|p| p.priority);
        ranked
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_retention_days() -> i64 {
    90
}

fn default_max_concurrent_requests() -> usize {
    4
}
