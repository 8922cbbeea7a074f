/*!
 * Google Cloud Translation adapter.
 *
 * Speaks the Translation v2 REST protocol: API key passed as a `key` query
 * parameter, JSON body with a `q` array, response nested under
 * `{"data": {"translations": [{"translatedText"}]}}`. Detection is a
 * separate `/detect` call.
 */

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::language::{Language, ALL_LANGUAGES};
use crate::providers::{status_error, transport_error, ProviderCapabilities, TranslationBackend};
use async_trait::async_trait;

const DEFAULT_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";

/// Google Cloud Translation client
#[derive(Debug)]
pub struct GoogleProvider {
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
    q: &'a [String],
    source: String,
    target: String,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    q: &'a [String],
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    data: DetectData,
}

#[derive(Debug, Deserialize)]
struct DetectData {
    detections: Vec<Vec<Detection>>,
}

#[derive(Debug, Deserialize)]
struct Detection {
    language: String,
}

impl GoogleProvider {
    /// Create a new Google Translation client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            capabilities: ProviderCapabilities {
                supported_languages: ALL_LANGUAGES.to_vec(),
                supports_detection: true,
                max_batch_size: 128,
            },
        }
    }

    fn base_url(&self) -> String {
        if self.endpoint.is_empty() {
            DEFAULT_ENDPOINT.to_string()
        } else {
            self.endpoint.trim_end_matches('/').to_string()
        }
    }

    async fn request(
        &self,
        texts: &[String],
        source: Language,
        target: Language,
    ) -> Result<TranslateResponse, ProviderError> {
        let body = TranslateRequest {
            q: texts,
            source: source.code().to_string(),
            target: target.code().to_string(),
            format: "text",
        };

        let response = self
            .client
            .post(self.base_url())
            .query(&[("key", self.api_key.as_str())])
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
            log::error!("Google Translation API error ({}): {}", status, error_text);
            return Err(status_error(status, error_text));
        }

        response
            .json::<TranslateResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl TranslationBackend for GoogleProvider {
    fn name(&self) -> &str {
        "google"
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

        if response.data.translations.len() != 1 {
            return Err(ProviderError::ParseError(format!(
                "Expected 1 translation, got {}",
                response.data.translations.len()
            )));
        }
        Ok(response.data.translations.remove(0).translated_text)
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
        if response.data.translations.len() != texts.len() {
            return Err(ProviderError::ParseError(format!(
                "Expected {} translations, got {}",
                texts.len(),
                response.data.translations.len()
            )));
        }
        Ok(response
            .data
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect())
    }

    async fn detect_language(&self, text: &str) -> Result<Language, ProviderError> {
        let texts = [text.to_string()];
        let body = DetectRequest { q: &texts };

        let response = self
            .client
            .post(format!("{}/detect", self.base_url()))
            .query(&[("key", self.api_key.as_str())])
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
            .json::<DetectResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let tag = parsed
            .data
            .detections
            .first()
            .and_then(|candidates| candidates.first())
            .map(|d| d.language.as_str())
            .ok_or_else(|| {
                ProviderError::ParseError("Response carried no detections".to_string())
            })?;

        Language::from_detection_tag(tag)
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}
