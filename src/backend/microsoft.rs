//! Microsoft Translator (Azure Translator v3 REST API)
//!
//! Available whenever a subscription key is configured. Supports batching natively: a
//! single request carries up to [`MicrosoftTranslatorBackend::MAX_BATCH_SIZE`] texts.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{BackendKind, Capabilities, TranslationBackend};
use crate::error::{TranslateError, TranslateResult};

const SERVICE: &str = "Microsoft Translator";

#[derive(Debug, Deserialize)]
struct TranslateItem {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
}

#[derive(Clone)]
pub struct MicrosoftTranslatorBackend {
    subscription_key: String,
    region: Option<String>,
    client: reqwest::Client,
    base_url: String,
}

impl MicrosoftTranslatorBackend {
    pub const MAX_BATCH_SIZE: usize = 100;

    pub fn new(
        subscription_key: String,
        region: Option<String>,
        client: reqwest::Client,
    ) -> TranslateResult<Self> {
        if subscription_key.trim().is_empty() {
            return Err(TranslateError::Config(
                "Microsoft Translator key cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            subscription_key,
            region,
            client,
            base_url: "https://api.cognitive.microsofttranslator.com/translate".to_string(),
        })
    }

    /// Point the backend at a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn translate_chunk(
        &self,
        texts: &[String],
        source: &str,
        target: &str,
    ) -> TranslateResult<Vec<String>> {
        let body: Vec<_> = texts.iter().map(|text| json!({ "Text": text })).collect();

        let mut request = self
            .client
            .post(&self.base_url)
            .query(&[("api-version", "3.0"), ("from", source), ("to", target)])
            .header("Ocp-Apim-Subscription-Key", &self.subscription_key)
            .json(&body);
        if let Some(region) = &self.region {
            request = request.header("Ocp-Apim-Subscription-Region", region);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TranslateError::invalid_response(
                SERVICE,
                format!("HTTP {}: {}", status, error_text),
            ));
        }

        let raw = response.text().await?;
        let translations = parse_response(&raw)?;
        if translations.len() != texts.len() {
            return Err(TranslateError::invalid_response(
                SERVICE,
                format!(
                    "expected {} translations, got {}",
                    texts.len(),
                    translations.len()
                ),
            ));
        }
        Ok(translations)
    }
}

/// Pull the first translation of every item out of a v3 response body
pub(crate) fn parse_response(raw: &str) -> TranslateResult<Vec<String>> {
    let items: Vec<TranslateItem> = serde_json::from_str(raw)
        .map_err(|e| TranslateError::invalid_response(SERVICE, e.to_string()))?;
    items
        .into_iter()
        .map(|item| {
            item.translations
                .into_iter()
                .next()
                .map(|t| t.text)
                .ok_or_else(|| TranslateError::invalid_response(SERVICE, "empty translations"))
        })
        .collect()
}

impl std::fmt::Debug for MicrosoftTranslatorBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MicrosoftTranslatorBackend")
            .field("subscription_key", &"***")
            .field("region", &self.region)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl TranslationBackend for MicrosoftTranslatorBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Microsoft
    }

    fn name(&self) -> &str {
        SERVICE
    }

    fn is_available(&self) -> bool {
        true
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::BATCH
    }

    async fn translate(&self, text: &str, source: &str, target: &str) -> TranslateResult<String> {
        let results = self
            .translate_chunk(&[text.to_string()], source, target)
            .await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| TranslateError::invalid_response(SERVICE, "no translation returned"))
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        source: &str,
        target: &str,
    ) -> TranslateResult<Vec<String>> {
        let mut all_results = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(Self::MAX_BATCH_SIZE) {
            debug!("{}: translating chunk of {}", SERVICE, chunk.len());
            all_results.extend(self.translate_chunk(chunk, source, target).await?);
        }
        Ok(all_results)
    }
}
