/*!
 * Unit tests for the quality assessor
 */

use babelcache::language::Language;
use babelcache::quality::{self, QualityBand, MAX_LENGTH_RATIO, MIN_LENGTH_RATIO, REVIEW_THRESHOLD};

#[test]
fn test_assess_issuesAndScore_shouldMoveTogether() {
    // Every assessment with issues scores below a clean one
    let clean = quality::assess("Hello world", "Bonjour le monde", Language::En, Language::Fr);
    let flagged = quality::assess("Hello world", "Hello world", Language::En, Language::Fr);

    assert!(clean.issues.is_empty());
    assert!(!flagged.issues.is_empty());
    assert!(flagged.score < clean.score);
}

#[test]
fn test_assess_penalties_shouldStack() {
    // Untranslated copy into a Chinese target trips both checks
    let double = quality::assess("Hello world", "Hello world", Language::En, Language::ZhCn);
    let single = quality::assess("Hello world", "Hello world", Language::En, Language::Fr);

    assert_eq!(double.issues.len(), 2);
    assert_eq!(single.issues.len(), 1);
    assert!(double.score < single.score);
}

#[test]
fn test_assess_scoreBelowThreshold_shouldNeedReview() {
    let flagged = quality::assess("Hello world", "Hello world", Language::En, Language::ZhCn);
    assert!(flagged.score < REVIEW_THRESHOLD);
    assert!(flagged.needs_review);
    assert!(quality::should_use_human_review(&flagged));
}

#[test]
fn test_assess_ratioBoundaries_shouldBeInclusive() {
    // 10 chars -> 3 chars is ratio 0.3, on the boundary and accepted
    let at_min = quality::assess("aaaaaaaaaa", "bbb", Language::En, Language::Fr);
    assert!(!at_min.issues.contains(&"Unusual length ratio".to_string()));

    // 10 chars -> 30 chars is ratio 3.0, also accepted
    let at_max = quality::assess("aaaaaaaaaa", &"b".repeat(30), Language::En, Language::Fr);
    assert!(!at_max.issues.contains(&"Unusual length ratio".to_string()));

    // One character past either boundary is flagged
    let below = quality::assess("aaaaaaaaaa", "bb", Language::En, Language::Fr);
    assert!(below.issues.contains(&"Unusual length ratio".to_string()));

    let above = quality::assess("aaaaaaaaaa", &"b".repeat(31), Language::En, Language::Fr);
    assert!(above.issues.contains(&"Unusual length ratio".to_string()));
}

#[test]
fn test_assess_ratio_shouldCountCharsNotBytes() {
    // 4 ideographs against 4 ASCII chars is ratio 1.0 even though the
    // byte lengths differ threefold
    let assessment = quality::assess("word", "你好世界", Language::En, Language::ZhCn);
    assert!(!assessment.issues.contains(&"Unusual length ratio".to_string()));
}

#[test]
fn test_assess_emptyTranslation_shouldShortCircuit() {
    let assessment = quality::assess("Hello", "", Language::En, Language::ZhCn);

    // Terminal check: no other issues are recorded
    assert_eq!(assessment.issues, vec!["Empty translation".to_string()]);
    assert_eq!(assessment.score, 0.0);
    assert_eq!(assessment.band(), QualityBand::Low);
}

#[test]
fn test_assess_chineseTargets_shouldAllRequireCjk() {
    for target in [Language::ZhCn, Language::ZhTw, Language::ZhHk] {
        let missing = quality::assess("Hello world", "Hello there", Language::En, target);
        assert!(
            missing
                .issues
                .contains(&"No Chinese characters in Chinese translation".to_string()),
            "expected CJK issue for {}",
            target
        );

        let present = quality::assess("Hello world", "你好世界", Language::En, target);
        assert!(present.issues.is_empty());
    }
}

#[test]
fn test_constants_shouldMatchDocumentedBands() {
    assert_eq!(REVIEW_THRESHOLD, 0.7);
    assert_eq!(MIN_LENGTH_RATIO, 0.3);
    assert_eq!(MAX_LENGTH_RATIO, 3.0);
}
