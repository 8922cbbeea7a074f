/*!
 * Durable translation cache.
 *
 * Persists finished translations keyed by the (source text, source language,
 * target language) triple, together with the provider that produced them, a
 * frozen quality snapshot, and usage accounting. Lookups bump the usage
 * counters atomically; stores replace any existing entry for the triple and
 * reset its accounting.
 */

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use rusqlite::{params, OptionalExtension};
use std::path::Path;

use crate::config::CacheConfig;
use crate::errors::CacheError;
use crate::language::Language;
use crate::quality::QualityAssessment;

use super::connection::CacheConnection;
use super::models::{hash_text, CacheStats, CachedTranslation, ProviderUsage};

/// Raw row as stored, before language codes and timestamps are parsed
struct RawRow {
    id: i64,
    source_text: String,
    source_language: String,
    target_language: String,
    translated_text: String,
    provider: String,
    quality_score: f64,
    quality_confidence: f64,
    needs_review: bool,
    quality_issues: String,
    created_at: String,
    last_used_at: String,
    use_count: i64,
}

impl RawRow {
    fn into_record(self) -> Result<CachedTranslation, CacheError> {
        let issues: Vec<String> = serde_json::from_str(&self.quality_issues)?;

        Ok(CachedTranslation {
            id: self.id,
            source_text: self.source_text,
            source_language: parse_language(&self.source_language)?,
            target_language: parse_language(&self.target_language)?,
            translated_text: self.translated_text,
            provider: self.provider,
            quality: QualityAssessment {
                score: self.quality_score,
                confidence: self.quality_confidence,
                needs_review: self.needs_review,
                issues,
            },
            created_at: parse_timestamp(&self.created_at)?,
            last_used_at: parse_timestamp(&self.last_used_at)?,
            use_count: self.use_count,
        })
    }
}

fn parse_language(code: &str) -> Result<Language, CacheError> {
    code.parse()
        .map_err(|_| CacheError::Serialization(format!("Invalid language code in row: {}", code)))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, CacheError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CacheError::Serialization(format!("Invalid timestamp in row: {}", e)))
}

const SELECT_COLUMNS: &str = "id, source_text, source_language, target_language, \
     translated_text, provider, quality_score, quality_confidence, \
     needs_review, quality_issues, created_at, last_used_at, use_count";

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id: row.get(0)?,
        source_text: row.get(1)?,
        source_language: row.get(2)?,
        target_language: row.get(3)?,
        translated_text: row.get(4)?,
        provider: row.get(5)?,
        quality_score: row.get(6)?,
        quality_confidence: row.get(7)?,
        needs_review: row.get(8)?,
        quality_issues: row.get(9)?,
        created_at: row.get(10)?,
        last_used_at: row.get(11)?,
        use_count: row.get(12)?,
    })
}

/// Durable translation cache backed by SQLite
#[derive(Clone)]
pub struct TranslationCache {
    connection: CacheConnection,
}

impl TranslationCache {
    /// Open or create a cache at the given path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, CacheError> {
        Ok(Self {
            connection: CacheConnection::new(db_path)?,
        })
    }

    /// Create an in-memory cache (for testing)
    pub fn new_in_memory() -> Result<Self, CacheError> {
        Ok(Self {
            connection: CacheConnection::new_in_memory()?,
        })
    }

    /// Open a cache as directed by the configuration; a missing path selects
    /// an in-memory cache
    pub fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        match &config.db_path {
            Some(path) => Self::new(path),
            None => Self::new_in_memory(),
        }
    }

    /// Look up a cached translation for the key triple.
    ///
    /// A hit bumps use_count and last_used_at before returning; the returned
    /// record reflects the bumped values. The read and the bump run inside
    /// one closure while the connection mutex is held, so concurrent lookups
    /// of the same entry each count exactly once.
    pub async fn lookup(
        &self,
        source_text: &str,
        source: Language,
        target: Language,
    ) -> Result<Option<CachedTranslation>, CacheError> {
        let hash = hash_text(source_text);
        let source_code = source.code().to_string();
        let target_code = target.code().to_string();

        let found = self
            .connection
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM translation_cache
                     WHERE source_text_hash = ?1 AND source_language = ?2 AND target_language = ?3",
                    SELECT_COLUMNS
                ))?;

                let row = stmt
                    .query_row(params![hash, source_code, target_code], map_row)
                    .optional()?;

                match row {
                    Some(mut raw) => {
                        let now = Utc::now().to_rfc3339();
                        conn.execute(
                            "UPDATE translation_cache
                             SET use_count = use_count + 1, last_used_at = ?1
                             WHERE id = ?2",
                            params![now, raw.id],
                        )?;
                        raw.use_count += 1;
                        raw.last_used_at = now;
                        Ok(Some(raw))
                    }
                    None => Ok(None),
                }
            })
            .await?;

        found.map(RawRow::into_record).transpose()
    }

    /// Store a translation for the key triple, replacing any existing entry.
    ///
    /// A replace is last-write-wins: the new provider and quality snapshot
    /// overwrite the old ones, created_at restarts the expiry clock, and
    /// use_count resets to 1.
    pub async fn store(
        &self,
        source_text: &str,
        source: Language,
        target: Language,
        translated_text: &str,
        provider: &str,
        quality: &QualityAssessment,
    ) -> Result<(), CacheError> {
        let hash = hash_text(source_text);
        let source_text = source_text.to_string();
        let source_code = source.code().to_string();
        let target_code = target.code().to_string();
        let translated_text = translated_text.to_string();
        debug!(
            "Caching translation {} -> {} via {}",
            source_code, target_code, provider
        );
        let provider = provider.to_string();
        let score = quality.score;
        let confidence = quality.confidence;
        let needs_review = quality.needs_review;
        let issues = serde_json::to_string(&quality.issues)?;

        self.connection
            .execute_async(move |conn| {
                let now = Utc::now().to_rfc3339();
                conn.execute(
                    "INSERT INTO translation_cache
                     (source_text_hash, source_text, source_language, target_language,
                      translated_text, provider, quality_score, quality_confidence,
                      needs_review, quality_issues, created_at, last_used_at, use_count)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11, 1)
                     ON CONFLICT(source_text_hash, source_language, target_language) DO UPDATE SET
                        source_text = excluded.source_text,
                        translated_text = excluded.translated_text,
                        provider = excluded.provider,
                        quality_score = excluded.quality_score,
                        quality_confidence = excluded.quality_confidence,
                        needs_review = excluded.needs_review,
                        quality_issues = excluded.quality_issues,
                        created_at = excluded.created_at,
                        last_used_at = excluded.last_used_at,
                        use_count = 1",
                    params![
                        hash,
                        source_text,
                        source_code,
                        target_code,
                        translated_text,
                        provider,
                        score,
                        confidence,
                        needs_review,
                        issues,
                        now,
                    ],
                )?;
                Ok(())
            })
            .await?;

        Ok(())
    }

    /// Delete entries whose created_at is older than the horizon.
    ///
    /// Lookups never filter on age, so expiry only happens when this sweep
    /// runs. Returns the number of deleted entries.
    pub async fn purge_expired(&self, horizon: Duration) -> Result<usize, CacheError> {
        let cutoff = (Utc::now() - horizon).to_rfc3339();

        let deleted = self
            .connection
            .execute_async(move |conn| {
                let deleted = conn.execute(
                    "DELETE FROM translation_cache WHERE created_at < ?1",
                    params![cutoff],
                )?;
                Ok(deleted)
            })
            .await?;

        if deleted > 0 {
            info!("Purged {} expired cache entries", deleted);
        }
        Ok(deleted)
    }

    /// Usage totals grouped by provider, ordered by provider name
    pub async fn usage_by_provider(&self) -> Result<Vec<ProviderUsage>, CacheError> {
        self.connection
            .execute_async(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT provider, COUNT(*), SUM(use_count)
                     FROM translation_cache
                     GROUP BY provider
                     ORDER BY provider",
                )?;

                let rows = stmt.query_map([], |row| {
                    Ok(ProviderUsage {
                        provider: row.get(0)?,
                        entry_count: row.get(1)?,
                        total_uses: row.get(2)?,
                    })
                })?;

                let mut usage = Vec::new();
                for row in rows {
                    usage.push(row?);
                }
                Ok(usage)
            })
            .await
    }

    /// Cache-wide statistics
    pub async fn stats(&self) -> Result<CacheStats, CacheError> {
        let file_size_bytes = self.connection.file_size_bytes();

        self.connection
            .execute_async(move |conn| {
                let (entry_count, total_uses): (i64, i64) = conn.query_row(
                    "SELECT COUNT(*), COALESCE(SUM(use_count), 0) FROM translation_cache",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?;

                Ok(CacheStats {
                    entry_count,
                    total_uses,
                    file_size_bytes,
                })
            })
            .await
    }

    /// Delete all cached translations
    pub async fn clear(&self) -> Result<(), CacheError> {
        self.connection
            .execute_async(|conn| {
                conn.execute("DELETE FROM translation_cache", [])?;
                Ok(())
            })
            .await
    }
}
