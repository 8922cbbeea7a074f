/*!
 * Batch job model.
 *
 * A batch job fans a set of source texts out to a set of target languages.
 * Failure granularity is the (text, target language) pair: one provider
 * hiccup never discards sibling results. The job's terminal status is
 * derived from its result and failure sets, never set directly.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::language::Language;
use crate::quality::QualityAssessment;

/// Lifecycle status of a batch job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Created but not yet started
    Pending,
    /// Translation in progress
    InProgress,
    /// Every pair resolved and at least one produced a translation
    Completed,
    /// Every pair failed
    Failed,
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BatchStatus::Pending => "pending",
            BatchStatus::InProgress => "in_progress",
            BatchStatus::Completed => "completed",
            BatchStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for BatchStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "pending" => Ok(BatchStatus::Pending),
            "in_progress" => Ok(BatchStatus::InProgress),
            "completed" => Ok(BatchStatus::Completed),
            "failed" => Ok(BatchStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid batch status: {}", s)),
        }
    }
}

/// One successfully translated (text, target) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// Index into the job's source_texts
    pub text_index: usize,
    /// Target language of this pair
    pub target_language: Language,
    /// Translated text
    pub translated_text: String,
    /// Provider that produced the translation (or is credited by the cache)
    pub provider: String,
    /// Quality snapshot for the translation
    pub quality: QualityAssessment,
    /// Whether the pair was served from the cache
    pub from_cache: bool,
}

/// One failed (text, target) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    /// Index into the job's source_texts
    pub text_index: usize,
    /// Target language of this pair
    pub target_language: Language,
    /// Human-readable failure reason
    pub error: String,
}

/// A batch translation job and its accumulated outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchTranslationJob {
    /// Job identifier
    pub id: Uuid,
    /// Lifecycle status
    pub status: BatchStatus,
    /// Language of all source texts
    pub source_language: Language,
    /// Requested target languages
    pub target_languages: Vec<Language>,
    /// Texts to translate
    pub source_texts: Vec<String>,
    /// Successful pairs
    pub results: Vec<BatchResult>,
    /// Failed pairs
    pub failures: Vec<BatchFailure>,
    /// When the job was created
    pub created_at: DateTime<Utc>,
    /// When the job reached a terminal status
    pub completed_at: Option<DateTime<Utc>>,
}

impl BatchTranslationJob {
    /// Create a pending job
    pub fn new(
        source_language: Language,
        target_languages: Vec<Language>,
        source_texts: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: BatchStatus::Pending,
            source_language,
            target_languages,
            source_texts,
            results: Vec::new(),
            failures: Vec::new(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Total number of (text, target) pairs the job covers
    pub fn expected_pairs(&self) -> usize {
        self.source_texts.len() * self.target_languages.len()
    }

    /// Derive the terminal status from the result and failure sets and stamp
    /// the completion time.
    ///
    /// A job completes as long as any pair succeeded; per-pair failures live
    /// in `failures` and never demote the status. Only a job where every
    /// pair failed is marked failed.
    pub fn finalize(&mut self) {
        self.status = if self.results.is_empty() {
            BatchStatus::Failed
        } else {
            BatchStatus::Completed
        };
        self.completed_at = Some(Utc::now());
    }

    /// Successful translations for one target language, ordered by text index
    pub fn results_for(&self, target: Language) -> Vec<&BatchResult> {
        let mut results: Vec<&BatchResult> = self
            .results
            .iter()
            .filter(|r| r.target_language == target)
            .collect();
        results.sort_by_key(|r| r.text_index);
        results
    }
}
