/*!
 * DeepL adapter.
 *
 * Speaks the DeepL v2 REST protocol: `Authorization: DeepL-Auth-Key` header,
 * JSON body with a `text` array, response shaped as
 * `{"translations": [{"detected_source_language", "text"}]}`.
 *
 * DeepL covers a narrower language set than the engine's canonical set; the
 * missing languages are excluded from the capabilities so the registry can
 * rank past this adapter for pairs it cannot serve.
 */

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::language::Language;
use crate::providers::{status_error, transport_error, ProviderCapabilities, TranslationBackend};
use async_trait::async_trait;

const DEFAULT_ENDPOINT: &str = "https://api.deepl.com/v2";

/// Languages DeepL serves. Thai, Vietnamese, and the two Traditional
/// Chinese variants are not offered.
const SUPPORTED: [Language; 12] = [
    Language::En,
    Language::Es,
    Language::Fr,
    Language::De,
    Language::It,
    Language::Pt,
    Language::Ru,
    Language::Ja,
    Language::Ko,
    Language::Ar,
    Language::Id,
    Language::ZhCn,
];

/// DeepL client
#[derive(Debug)]
pub struct DeepLProvider {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to public API)
    endpoint: String,
    capabilities: ProviderCapabilities,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a [String],
    /// Empty selects DeepL-side detection; omitted from the wire
    #[serde(skip_serializing_if = "String::is_empty")]
    source_lang: String,
    target_lang: String,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    detected_source_language: Option<String>,
    text: String,
}

impl DeepLProvider {
    /// Create a new DeepL client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            capabilities: ProviderCapabilities {
                supported_languages: SUPPORTED.to_vec(),
                supports_detection: true,
                max_batch_size: 50,
            },
        }
    }

    fn api_url(&self) -> String {
        if self.endpoint.is_empty() {
            format!("{}/translate", DEFAULT_ENDPOINT)
        } else {
            format!("{}/translate", self.endpoint.trim_end_matches('/'))
        }
    }

    /// DeepL's uppercase language code for a canonical language
    fn wire_code(language: Language) -> &'static str {
        match language {
            Language::ZhCn => "ZH",
            Language::En => "EN",
            Language::Es => "ES",
            Language::Fr => "FR",
            Language::De => "DE",
            Language::It => "IT",
            Language::Pt => "PT",
            Language::Ru => "RU",
            Language::Ja => "JA",
            Language::Ko => "KO",
            Language::Ar => "AR",
            Language::Id => "ID",
            // Unreachable through the capabilities check; mapped anyway so a
            // direct call fails at the API rather than panicking here.
            Language::Th => "TH",
            Language::Vi => "VI",
            Language::ZhTw => "ZH",
            Language::ZhHk => "ZH",
        }
    }

    async fn request(
        &self,
        texts: &[String],
        source: Language,
        target: Language,
    ) -> Result<TranslateResponse, ProviderError> {
        let body = TranslateRequest {
            text: texts,
            source_lang: Self::wire_code(source).to_string(),
            target_lang: Self::wire_code(target).to_string(),
        };

        let response = self
            .client
            .post(self.api_url())
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            log::error!("DeepL API error ({}): {}", status, error_text);
            return Err(status_error(status, error_text));
        }

        response
            .json::<TranslateResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl TranslationBackend for DeepLProvider {
    fn name(&self) -> &str {
        "deepl"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, ProviderError> {
        let texts = [text.to_string()];
        let mut response = self.request(&texts, source, target).await?;

        if response.translations.len() != 1 {
            return Err(ProviderError::ParseError(format!(
                "Expected 1 translation, got {}",
                response.translations.len()
            )));
        }
        Ok(response.translations.remove(0).text)
    }

    async fn batch_translate(
        &self,
        texts: &[String],
        source: Language,
        target: Language,
    ) -> Result<Vec<String>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self.request(texts, source, target).await?;
        if response.translations.len() != texts.len() {
            return Err(ProviderError::ParseError(format!(
                "Expected {} translations, got {}",
                texts.len(),
                response.translations.len()
            )));
        }
        Ok(response.translations.into_iter().map(|t| t.text).collect())
    }

    /// DeepL has no standalone detection endpoint; probe with a translation
    /// into English and read the detected source tag off the response.
    async fn detect_language(&self, text: &str) -> Result<Language, ProviderError> {
        let texts = [text.to_string()];
        let body = TranslateRequest {
            text: &texts,
            source_lang: String::new(),
            target_lang: "EN".to_string(),
        };

        let response = self
            .client
            .post(self.api_url())
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            return Err(status_error(status, error_text));
        }

        let parsed = response
            .json::<TranslateResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let tag = parsed
            .translations
            .first()
            .and_then(|t| t.detected_source_language.as_deref())
            .ok_or_else(|| {
                ProviderError::ParseError("Response carried no detected language".to_string())
            })?;

        Language::from_detection_tag(tag)
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}
