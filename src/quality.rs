/*!
 * Quality assessment for machine translations.
 *
 * Provides a deterministic trust score for a (source, translation, source
 * language, target language) tuple. Pure functions: no I/O, no persisted
 * state. The assessment is computed once per provider call and snapshotted
 * into the cache alongside the translation.
 */

use serde::{Deserialize, Serialize};

use crate::language::{contains_cjk, Language};

/// Score threshold below which a translation must be routed to human review
pub const REVIEW_THRESHOLD: f64 = 0.7;

/// Minimum acceptable translated/source character-length ratio
pub const MIN_LENGTH_RATIO: f64 = 0.3;

/// Maximum acceptable translated/source character-length ratio
pub const MAX_LENGTH_RATIO: f64 = 3.0;

/// Penalty applied when the translation equals the source verbatim
const UNTRANSLATED_PENALTY: f64 = 0.4;

/// Penalty applied when the length ratio falls outside the accepted band
const LENGTH_RATIO_PENALTY: f64 = 0.3;

/// Penalty applied when a Chinese-script target contains no CJK characters
const MISSING_CJK_PENALTY: f64 = 0.3;

/// Presentation band for a quality score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityBand {
    /// Score >= 0.8
    High,
    /// 0.6 <= score < 0.8
    Medium,
    /// Score < 0.6
    Low,
}

/// Snapshot of a quality assessment for one translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    /// Trust score in [0, 1]
    pub score: f64,

    /// Secondary confidence figure in [0, 1]; defaults near the score but
    /// can be supplied by an adapter that reports its own confidence
    pub confidence: f64,

    /// Whether the translation must be routed for human review
    pub needs_review: bool,

    /// Ordered list of named defects found by the checks
    pub issues: Vec<String>,
}

impl QualityAssessment {
    /// Presentation band for this assessment
    pub fn band(&self) -> QualityBand {
        if self.score >= 0.8 {
            QualityBand::High
        } else if self.score >= 0.6 {
            QualityBand::Medium
        } else {
            QualityBand::Low
        }
    }

    /// Replace the default confidence with a provider-reported figure
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }
}

/// Assess the trustworthiness of a machine translation.
///
/// Ordered checks, each may append an issue and reduce the score from a
/// starting value of 1.0:
/// 1. empty translation (terminal: score 0)
/// 2. translation equals the source verbatim
/// 3. character-length ratio outside [0.3, 3.0]
/// 4. Chinese-script target with no CJK code points
pub fn assess(
    source_text: &str,
    translated_text: &str,
    source_language: Language,
    target_language: Language,
) -> QualityAssessment {
    let mut score: f64 = 1.0;
    let mut issues: Vec<String> = Vec::new();

    if translated_text.is_empty() {
        return QualityAssessment {
            score: 0.0,
            confidence: 0.0,
            needs_review: true,
            issues: vec!["Empty translation".to_string()],
        };
    }

    if translated_text == source_text && source_language != target_language {
        issues.push("Text appears untranslated".to_string());
        score -= UNTRANSLATED_PENALTY;
    }

    let source_len = source_text.chars().count();
    if source_len > 0 {
        let ratio = translated_text.chars().count() as f64 / source_len as f64;
        if !(MIN_LENGTH_RATIO..=MAX_LENGTH_RATIO).contains(&ratio) {
            issues.push("Unusual length ratio".to_string());
            score -= LENGTH_RATIO_PENALTY;
        }
    }

    if target_language.is_chinese_script() && !contains_cjk(translated_text) {
        issues.push("No Chinese characters in Chinese translation".to_string());
        score -= MISSING_CJK_PENALTY;
    }

    let score = score.clamp(0.0, 1.0);
    QualityAssessment {
        score,
        confidence: score,
        needs_review: score < REVIEW_THRESHOLD || !issues.is_empty(),
        issues,
    }
}

/// Single choke-point for the human-review decision.
///
/// Every component must consult this before treating a machine translation
/// as final.
pub fn should_use_human_review(assessment: &QualityAssessment) -> bool {
    assessment.needs_review || assessment.score < REVIEW_THRESHOLD
}
