/*!
 * Cache record types.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::language::Language;
use crate::quality::QualityAssessment;

/// One persisted translation with its usage accounting and the quality
/// snapshot taken when it was produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedTranslation {
    /// Row id
    pub id: i64,
    /// Original source text
    pub source_text: String,
    /// Source language
    pub source_language: Language,
    /// Target language
    pub target_language: Language,
    /// Translated text
    pub translated_text: String,
    /// Name of the provider that produced the translation
    pub provider: String,
    /// Quality snapshot frozen at store time, never re-evaluated on reads
    pub quality: QualityAssessment,
    /// When the entry was stored (reset on replace)
    pub created_at: DateTime<Utc>,
    /// When the entry was last served
    pub last_used_at: DateTime<Utc>,
    /// Number of times the entry has been served, including the initial store
    pub use_count: i64,
}

/// Aggregated cache usage for one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderUsage {
    /// Provider name
    pub provider: String,
    /// Number of cache entries attributed to the provider
    pub entry_count: i64,
    /// Sum of use counts across those entries
    pub total_uses: i64,
}

/// Cache-wide statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cached translations
    pub entry_count: i64,
    /// Sum of use counts across all entries
    pub total_uses: i64,
    /// Database file size in bytes
    pub file_size_bytes: u64,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Entries: {}, Uses: {}, Size: {} KB",
            self.entry_count,
            self.total_uses,
            self.file_size_bytes / 1024
        )
    }
}

/// SHA-256 hex digest of a source text.
///
/// Keys the cache on a fixed-width column instead of arbitrarily long text.
pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
