/*!
 * Tests for translation cache functionality
 */

use std::sync::Arc;

use babelcache::cache::{hash_text, TranslationCache};
use babelcache::language::Language;
use babelcache::quality::{self, QualityAssessment};

fn assessment_for(source: &str, translated: &str) -> QualityAssessment {
    quality::assess(source, translated, Language::En, Language::Fr)
}

#[tokio::test]
async fn test_cache_identityCycle_shouldFlipFromMissToHit() {
    let cache = TranslationCache::new_in_memory().unwrap();

    assert!(cache
        .lookup("Hello world", Language::En, Language::Fr)
        .await
        .unwrap()
        .is_none());

    cache
        .store(
            "Hello world",
            Language::En,
            Language::Fr,
            "Bonjour le monde",
            "deepl",
            &assessment_for("Hello world", "Bonjour le monde"),
        )
        .await
        .unwrap();

    let hit = cache
        .lookup("Hello world", Language::En, Language::Fr)
        .await
        .unwrap()
        .expect("Expected a hit after store");
    assert_eq!(hit.translated_text, "Bonjour le monde");
    assert_eq!(hit.use_count, 2);
}

#[tokio::test]
async fn test_cache_persistsAcrossReopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");

    {
        let cache = TranslationCache::new(&path).unwrap();
        cache
            .store(
                "Hello",
                Language::En,
                Language::Fr,
                "Bonjour",
                "deepl",
                &assessment_for("Hello", "Bonjour"),
            )
            .await
            .unwrap();
    }

    let reopened = TranslationCache::new(&path).unwrap();
    let hit = reopened
        .lookup("Hello", Language::En, Language::Fr)
        .await
        .unwrap()
        .expect("Entry should survive reopen");
    assert_eq!(hit.provider, "deepl");
    assert_eq!(hit.use_count, 2);
}

#[tokio::test]
async fn test_cache_concurrentLookups_shouldEachCountOnce() {
    let cache = Arc::new(TranslationCache::new_in_memory().unwrap());
    cache
        .store(
            "Hello",
            Language::En,
            Language::Fr,
            "Bonjour",
            "deepl",
            &assessment_for("Hello", "Bonjour"),
        )
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let cache = Arc::clone(&cache);
        handles.push(tokio::spawn(async move {
            cache.lookup("Hello", Language::En, Language::Fr).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap().unwrap();
    }

    let stats = cache.stats().await.unwrap();
    // Initial store plus ten lookups
    assert_eq!(stats.total_uses, 11);
}

#[tokio::test]
async fn test_cache_replace_shouldBeLastWriteWins() {
    let cache = TranslationCache::new_in_memory().unwrap();

    let flagged = quality::assess("Hello", "Hello", Language::En, Language::Fr);
    cache
        .store("Hello", Language::En, Language::Fr, "Hello", "deepl", &flagged)
        .await
        .unwrap();
    cache.lookup("Hello", Language::En, Language::Fr).await.unwrap();

    let clean = assessment_for("Hello", "Bonjour");
    cache
        .store("Hello", Language::En, Language::Fr, "Bonjour", "google", &clean)
        .await
        .unwrap();

    let hit = cache
        .lookup("Hello", Language::En, Language::Fr)
        .await
        .unwrap()
        .unwrap();

    // New text, provider, and quality snapshot; accounting reset
    assert_eq!(hit.translated_text, "Bonjour");
    assert_eq!(hit.provider, "google");
    assert!(!hit.quality.needs_review);
    assert!(hit.quality.issues.is_empty());
    assert_eq!(hit.use_count, 2);
}

#[tokio::test]
async fn test_cache_purgeBoundary_shouldKeepEntriesInsideHorizon() {
    let cache = TranslationCache::new_in_memory().unwrap();
    cache
        .store(
            "Hello",
            Language::En,
            Language::Fr,
            "Bonjour",
            "deepl",
            &assessment_for("Hello", "Bonjour"),
        )
        .await
        .unwrap();

    assert_eq!(cache.purge_expired(chrono::Duration::hours(1)).await.unwrap(), 0);
    assert_eq!(cache.purge_expired(chrono::Duration::zero()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_cache_usageByProvider_shouldOrderAndAggregate() {
    let cache = TranslationCache::new_in_memory().unwrap();
    for (text, provider) in [("a", "google"), ("b", "deepl"), ("c", "deepl")] {
        cache
            .store(
                text,
                Language::En,
                Language::Fr,
                "t",
                provider,
                &assessment_for(text, "t"),
            )
            .await
            .unwrap();
    }
    cache.lookup("b", Language::En, Language::Fr).await.unwrap();
    cache.lookup("b", Language::En, Language::Fr).await.unwrap();

    let usage = cache.usage_by_provider().await.unwrap();
    assert_eq!(usage.len(), 2);
    assert_eq!(usage[0].provider, "deepl");
    assert_eq!(usage[0].entry_count, 2);
    assert_eq!(usage[0].total_uses, 4);
    assert_eq!(usage[1].provider, "google");
    assert_eq!(usage[1].total_uses, 1);
}

#[tokio::test]
async fn test_cache_lookup_shouldNotCrossLanguageDirections() {
    let cache = TranslationCache::new_in_memory().unwrap();
    cache
        .store(
            "Hello",
            Language::En,
            Language::Fr,
            "Bonjour",
            "deepl",
            &assessment_for("Hello", "Bonjour"),
        )
        .await
        .unwrap();

    // Reversed direction is a different key
    assert!(cache
        .lookup("Hello", Language::Fr, Language::En)
        .await
        .unwrap()
        .is_none());
}

#[test]
fn test_hashText_shouldDifferForNearIdenticalTexts() {
    assert_ne!(hash_text("Hello world"), hash_text("Hello world "));
    assert_ne!(hash_text("Hello world"), hash_text("Hello World"));
}
