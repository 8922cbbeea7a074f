/*!
 * Tests for the translation orchestrator
 */

use std::collections::HashMap;
use std::sync::Arc;

use babelcache::cache::TranslationCache;
use babelcache::errors::TranslationError;
use babelcache::language::{Language, ALL_LANGUAGES};
use babelcache::orchestrator::{ProviderRegistry, Translator};
use babelcache::providers::MockProvider;
use babelcache::quality;

use crate::common::{register_fast, translator_with, translator_with_backends};

#[tokio::test]
async fn test_translate_cacheIdentity_shouldHoldAcrossRepeats() {
    let backend = MockProvider::working();
    let counter = backend.clone();
    let translator = translator_with(backend);

    let first = translator
        .translate("Hello world", Language::En, Language::Es, None)
        .await
        .unwrap();
    assert!(!first.from_cache);
    assert_eq!(first.provider, "mock");

    for _ in 0..3 {
        let repeat = translator
            .translate("Hello world", Language::En, Language::Es, None)
            .await
            .unwrap();
        assert!(repeat.from_cache);
        assert_eq!(repeat.translated_text, first.translated_text);
        assert_eq!(repeat.provider, first.provider);
    }

    // All repeats served from cache
    assert_eq!(counter.call_count(), 1);
}

#[tokio::test]
async fn test_translate_qualitySnapshot_shouldTravelThroughCache() {
    // Identity backend echoes the source, tripping the untranslated check
    let translator = translator_with(MockProvider::identity());

    let fresh = translator
        .translate("Hello world", Language::En, Language::Fr, None)
        .await
        .unwrap();
    assert!(fresh.quality.needs_review);

    let cached = translator
        .translate("Hello world", Language::En, Language::Fr, None)
        .await
        .unwrap();
    assert!(cached.from_cache);
    assert!(cached.quality.needs_review);
    assert_eq!(cached.quality.issues, fresh.quality.issues);
}

#[tokio::test]
async fn test_translate_providerPreference_shouldRankThenFallPastGaps() {
    let narrow = MockProvider::new("narrow", babelcache::providers::MockBehavior::Working)
        .with_languages(vec![Language::En, Language::Fr, Language::De]);
    let wide = MockProvider::new("wide", babelcache::providers::MockBehavior::Working);

    let translator = translator_with_backends(vec![(narrow, 0), (wide, 1)]);

    // Pair served by the preferred backend
    let fr = translator
        .translate("Hello", Language::En, Language::Fr, None)
        .await
        .unwrap();
    assert_eq!(fr.provider, "narrow");

    // Pair outside the preferred backend's set falls to the next rank
    let th = translator
        .translate("Hello", Language::En, Language::Th, None)
        .await
        .unwrap();
    assert_eq!(th.provider, "wide");
}

#[tokio::test]
async fn test_translate_withOverride_shouldNotFallBackOnFailure() {
    // The override names a failing backend even though a working one is ranked first
    let healthy = MockProvider::new("healthy", babelcache::providers::MockBehavior::Working);
    let broken = MockProvider::new("broken", babelcache::providers::MockBehavior::Failing);

    let translator = translator_with_backends(vec![(healthy, 0), (broken, 1)]);

    let result = translator
        .translate("Hello", Language::En, Language::Fr, Some("broken"))
        .await;

    match result {
        Err(TranslationError::Provider { provider, .. }) => assert_eq!(provider, "broken"),
        other => panic!("Expected provider error, got {:?}", other.is_ok()),
    }
}

#[tokio::test]
async fn test_translate_retryableFailure_shouldExhaustRetryBudget() {
    let backend = MockProvider::failing();
    let counter = backend.clone();
    let translator = translator_with(backend);

    let result = translator
        .translate("Hello", Language::En, Language::Fr, None)
        .await;
    assert!(result.is_err());

    // 500 is retryable: first attempt plus two retries
    assert_eq!(counter.call_count(), 3);
}

#[tokio::test]
async fn test_translate_nonRetryableFailure_shouldFailImmediately() {
    let backend = MockProvider::unauthorized();
    let counter = backend.clone();
    let translator = translator_with(backend);

    let result = translator
        .translate("Hello", Language::En, Language::Fr, None)
        .await;

    assert!(matches!(result, Err(TranslationError::Provider { .. })));
    // Auth errors are never retried
    assert_eq!(counter.call_count(), 1);
}

#[tokio::test]
async fn test_translate_unsupportedPair_shouldFailWithoutProviderCall() {
    let backend = MockProvider::working().with_languages(vec![Language::En, Language::Fr]);
    let counter = backend.clone();
    let translator = translator_with(backend);

    let result = translator
        .translate("Hello", Language::En, Language::Ja, None)
        .await;

    assert!(matches!(
        result,
        Err(TranslationError::UnsupportedLanguagePair {
            source_language: Language::En,
            target_language: Language::Ja,
        })
    ));
    assert_eq!(counter.call_count(), 0);
}

#[tokio::test]
async fn test_translate_unsupportedPair_shouldNotServeStaleCacheEntry() {
    // Entry cached back when some provider still served En -> Ja
    let cache = TranslationCache::new_in_memory().unwrap();
    let snapshot = quality::assess("Hello", "こんにちは", Language::En, Language::Ja);
    cache
        .store("Hello", Language::En, Language::Ja, "こんにちは", "mock", &snapshot)
        .await
        .unwrap();

    // Today's registry no longer covers the pair
    let backend = MockProvider::working().with_languages(vec![Language::En, Language::Fr]);
    let mut registry = ProviderRegistry::default();
    register_fast(&mut registry, Arc::new(backend), 0);
    let translator =
        Translator::with_parts(registry, cache.clone(), 4, chrono::Duration::days(30));

    let result = translator
        .translate("Hello", Language::En, Language::Ja, None)
        .await;
    assert!(matches!(
        result,
        Err(TranslationError::UnsupportedLanguagePair { .. })
    ));

    // The rejected request left the cache accounting untouched: the initial
    // store plus this one direct lookup
    let entry = cache
        .lookup("Hello", Language::En, Language::Ja)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.use_count, 2);
}

#[tokio::test]
async fn test_translate_coalescing_shouldShareOneCallAcrossWaiters() {
    let backend = MockProvider::slow(40);
    let counter = backend.clone();
    let translator = Arc::new(translator_with(backend));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let t = Arc::clone(&translator);
        handles.push(tokio::spawn(async move {
            t.translate("stampede", Language::En, Language::De, None).await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.translated_text, "[de] stampede");
    }
    assert_eq!(counter.call_count(), 1);

    // A later request finds the entry in the cache
    let later = translator
        .translate("stampede", Language::En, Language::De, None)
        .await
        .unwrap();
    assert!(later.from_cache);
    assert_eq!(counter.call_count(), 1);
}

#[tokio::test]
async fn test_translate_coalescing_shouldKeepDistinctKeysIndependent() {
    let backend = MockProvider::slow(20);
    let counter = backend.clone();
    let translator = Arc::new(translator_with(backend));

    let t1 = Arc::clone(&translator);
    let t2 = Arc::clone(&translator);
    let (a, b) = tokio::join!(
        t1.translate("alpha", Language::En, Language::Fr, None),
        t2.translate("beta", Language::En, Language::Fr, None),
    );
    a.unwrap();
    b.unwrap();

    // Different texts never coalesce
    assert_eq!(counter.call_count(), 2);
}

#[tokio::test]
async fn test_providerUsage_shouldCreditTheServingProvider() {
    let translator = translator_with(MockProvider::working());

    translator
        .translate("one", Language::En, Language::Fr, None)
        .await
        .unwrap();
    translator
        .translate("two", Language::En, Language::Fr, None)
        .await
        .unwrap();
    translator
        .translate("one", Language::En, Language::Fr, None)
        .await
        .unwrap();

    let usage = translator.provider_usage().await.unwrap();
    assert_eq!(usage.len(), 1);
    assert_eq!(usage[0].provider, "mock");
    assert_eq!(usage[0].entry_count, 2);
    // Two stores plus one cache hit
    assert_eq!(usage[0].total_uses, 3);
}

#[tokio::test]
async fn test_translateMultilingual_shouldFillOnlyMissingLanguages() {
    let translator = translator_with(MockProvider::working());

    let mut content = HashMap::new();
    content.insert(Language::Ja, "こんにちは".to_string());
    content.insert(Language::Ko, "".to_string()); // empty counts as missing

    let fill = translator
        .translate_multilingual(&content, &ALL_LANGUAGES)
        .await
        .unwrap();

    // No English present, so the first non-empty language in canonical
    // order (Japanese) becomes the source
    assert_eq!(fill.source_language, Language::Ja);
    assert_eq!(fill.content[&Language::Ja], "こんにちは");
    assert_eq!(fill.content[&Language::Ko], "[ko] こんにちは");
    assert_eq!(fill.content[&Language::En], "[en] こんにちは");
    assert!(fill.failures.is_empty());
}

#[tokio::test]
async fn test_translateMultilingual_shouldFailSoftPerLanguage() {
    // Backend only speaks four languages; the rest of the fill fails per
    // language without sinking the call
    let backend = MockProvider::working().with_languages(vec![
        Language::En,
        Language::Fr,
        Language::De,
        Language::Es,
    ]);
    let translator = translator_with(backend);

    let mut content = HashMap::new();
    content.insert(Language::En, "Hello".to_string());

    let fill = translator
        .translate_multilingual(&content, &[Language::Fr, Language::De, Language::Ja])
        .await
        .unwrap();

    assert_eq!(fill.content[&Language::Fr], "[fr] Hello");
    assert_eq!(fill.content[&Language::De], "[de] Hello");
    assert!(!fill.content.contains_key(&Language::Ja));
    assert!(fill
        .failures
        .iter()
        .any(|(lang, _)| *lang == Language::Ja));
}

#[tokio::test]
async fn test_translateMultilingual_shouldOnlyTouchRequestedTargets() {
    let translator = translator_with(MockProvider::working());

    let mut content = HashMap::new();
    content.insert(Language::En, "Hello".to_string());
    content.insert(Language::De, "Hallo".to_string());

    let fill = translator
        .translate_multilingual(&content, &[Language::Fr, Language::De])
        .await
        .unwrap();

    // Requested gap filled, present target untouched, unrequested
    // languages left absent
    assert_eq!(fill.content[&Language::Fr], "[fr] Hello");
    assert_eq!(fill.content[&Language::De], "Hallo");
    assert!(!fill.content.contains_key(&Language::Es));
    assert_eq!(fill.content.len(), 3);
}

#[tokio::test]
async fn test_detectLanguage_withEmptyText_shouldFailValidation() {
    let translator = translator_with(MockProvider::working());
    let result = translator.detect_language("").await;
    assert!(matches!(result, Err(TranslationError::Validation(_))));
}

#[tokio::test]
async fn test_availableProviders_shouldListInPreferenceOrder() {
    let a = MockProvider::new("second", babelcache::providers::MockBehavior::Working);
    let b = MockProvider::new("first", babelcache::providers::MockBehavior::Working);
    let translator = translator_with_backends(vec![(a, 5), (b, 1)]);

    let providers = translator.available_providers();
    assert_eq!(providers.len(), 2);
    assert_eq!(providers[0].name, "first");
    assert_eq!(providers[1].name, "second");
}
