//! Generic online translation
//!
//! Plain HTTP services tried in order until one produces a usable result, meaning
//! non-empty and different from the input. The backend is only offered to the engine
//! while the host reports connectivity.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use super::{
    BackendKind, Capabilities, Connectivity, TranslationBackend, is_usable_translation,
};
use crate::error::{TranslateError, TranslateResult};

/// One HTTP translation service
#[derive(Clone)]
pub enum OnlineService {
    /// Google Cloud Translation API v2; requires an API key, supports batching
    GoogleCloud { api_key: String },
    /// Public `translate_a/single` endpoint used by the browser extension client
    GoogleGtx,
    LibreTranslate { url: String },
    MyMemory,
}

impl OnlineService {
    pub fn name(&self) -> &'static str {
        match self {
            OnlineService::GoogleCloud { .. } => "Google Cloud Translation",
            OnlineService::GoogleGtx => "Google gtx",
            OnlineService::LibreTranslate { .. } => "LibreTranslate",
            OnlineService::MyMemory => "MyMemory",
        }
    }
}

impl std::fmt::Debug for OnlineService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OnlineService::GoogleCloud { .. } => f
                .debug_struct("GoogleCloud")
                .field("api_key", &"***")
                .finish(),
            OnlineService::GoogleGtx => f.write_str("GoogleGtx"),
            OnlineService::LibreTranslate { url } => {
                f.debug_struct("LibreTranslate").field("url", url).finish()
            }
            OnlineService::MyMemory => f.write_str("MyMemory"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OnlineBackend {
    client: reqwest::Client,
    services: Vec<OnlineService>,
    connectivity: Connectivity,
}

impl OnlineBackend {
    /// Google Cloud accepts up to 128 texts per request
    const MAX_BATCH_SIZE: usize = 128;

    /// Google Cloud rejects strings longer than this
    const MAX_CHARS_PER_STRING: usize = 30_000;

    /// MyMemory's free tier refuses longer queries
    const MYMEMORY_MAX_CHARS: usize = 500;

    const GOOGLE_CLOUD_URL: &'static str =
        "https://translation.googleapis.com/language/translate/v2";
    const GOOGLE_GTX_URL: &'static str = "https://translate.googleapis.com/translate_a/single";
    const MYMEMORY_URL: &'static str = "https://api.mymemory.translated.net/get";

    pub fn new(
        client: reqwest::Client,
        services: Vec<OnlineService>,
        connectivity: Connectivity,
    ) -> Self {
        Self {
            client,
            services,
            connectivity,
        }
    }

    /// The default service chain: Google Cloud when a key is known, then the keyless
    /// services.
    pub fn default_services(
        google_api_key: Option<String>,
        libretranslate_url: String,
    ) -> Vec<OnlineService> {
        let mut services = Vec::new();
        if let Some(api_key) = google_api_key.filter(|key| !key.trim().is_empty()) {
            services.push(OnlineService::GoogleCloud { api_key });
        }
        services.push(OnlineService::GoogleGtx);
        services.push(OnlineService::LibreTranslate {
            url: libretranslate_url,
        });
        services.push(OnlineService::MyMemory);
        services
    }

    fn cloud_key(&self) -> Option<&str> {
        self.services.iter().find_map(|service| match service {
            OnlineService::GoogleCloud { api_key } => Some(api_key.as_str()),
            _ => None,
        })
    }

    async fn call(
        &self,
        service: &OnlineService,
        text: &str,
        source: &str,
        target: &str,
    ) -> TranslateResult<String> {
        match service {
            OnlineService::GoogleCloud { api_key } => {
                let results = self
                    .google_cloud_chunk(api_key, &[text.to_string()], source, target)
                    .await?;
                results.into_iter().next().ok_or_else(|| {
                    TranslateError::invalid_response(service.name(), "no translation returned")
                })
            }
            OnlineService::GoogleGtx => {
                let response = self
                    .client
                    .get(Self::GOOGLE_GTX_URL)
                    .query(&[
                        ("client", "gtx"),
                        ("sl", source),
                        ("tl", target),
                        ("dt", "t"),
                        ("q", text),
                    ])
                    .send()
                    .await?
                    .error_for_status()?;
                let body: Value = response.json().await?;
                parse_gtx(&body)
            }
            OnlineService::LibreTranslate { url } => {
                let response = self
                    .client
                    .post(url)
                    .json(&json!({
                        "q": text,
                        "source": source,
                        "target": target,
                        "format": "text"
                    }))
                    .send()
                    .await?
                    .error_for_status()?;
                let body: Value = response.json().await?;
                parse_libre(&body)
            }
            OnlineService::MyMemory => {
                if text.chars().count() > Self::MYMEMORY_MAX_CHARS {
                    return Err(TranslateError::invalid_response(
                        service.name(),
                        "text too long",
                    ));
                }
                let langpair = format!("{}|{}", source, target);
                let response = self
                    .client
                    .get(Self::MYMEMORY_URL)
                    .query(&[("q", text), ("langpair", langpair.as_str())])
                    .header(reqwest::header::USER_AGENT, "VillageStay-App")
                    .send()
                    .await?
                    .error_for_status()?;
                let body: Value = response.json().await?;
                parse_mymemory(&body)
            }
        }
    }

    async fn google_cloud_chunk(
        &self,
        api_key: &str,
        texts: &[String],
        source: &str,
        target: &str,
    ) -> TranslateResult<Vec<String>> {
        const NAME: &str = "Google Cloud Translation";

        if let Some(i) = texts
            .iter()
            .position(|text| text.len() > Self::MAX_CHARS_PER_STRING)
        {
            return Err(TranslateError::invalid_response(
                NAME,
                format!(
                    "text at index {} exceeds {} characters",
                    i,
                    Self::MAX_CHARS_PER_STRING
                ),
            ));
        }

        let body = json!({
            "q": texts,
            "source": source,
            "target": target,
            "format": "text"
        });
        let response = self
            .client
            .post(Self::GOOGLE_CLOUD_URL)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(if status.is_client_error() {
                TranslateError::Config(format!("API client error ({}): {}", status, error_text))
            } else {
                TranslateError::invalid_response(
                    NAME,
                    format!("API server error ({}): {}", status, error_text),
                )
            });
        }

        let body: Value = response.json().await?;
        let results = parse_google_cloud(&body)?;
        if results.len() != texts.len() {
            return Err(TranslateError::invalid_response(
                NAME,
                format!("expected {} translations, got {}", texts.len(), results.len()),
            ));
        }
        Ok(results)
    }

    async fn translate_each(
        &self,
        texts: &[String],
        source: &str,
        target: &str,
    ) -> TranslateResult<Vec<String>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.translate(text, source, target).await?);
        }
        Ok(results)
    }
}

pub(crate) fn parse_google_cloud(body: &Value) -> TranslateResult<Vec<String>> {
    const NAME: &str = "Google Cloud Translation";
    let translations = body["data"]["translations"].as_array().ok_or_else(|| {
        TranslateError::invalid_response(NAME, "missing 'data.translations' array")
    })?;
    translations
        .iter()
        .map(|t| {
            t["translatedText"]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| {
                    TranslateError::invalid_response(NAME, "missing 'translatedText' field")
                })
        })
        .collect()
}

/// The gtx endpoint answers with nested arrays; the first element lists the translated
/// segments, each of which starts with its translated text.
pub(crate) fn parse_gtx(body: &Value) -> TranslateResult<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::invalid_response("Google gtx", "missing segment list"))?;
    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();
    if translated.is_empty() {
        return Err(TranslateError::invalid_response("Google gtx", "empty translation"));
    }
    Ok(translated)
}

pub(crate) fn parse_libre(body: &Value) -> TranslateResult<String> {
    body["translatedText"]
        .as_str()
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or_else(|| TranslateError::invalid_response("LibreTranslate", "missing translatedText"))
}

pub(crate) fn parse_mymemory(body: &Value) -> TranslateResult<String> {
    const NAME: &str = "MyMemory";
    // responseStatus arrives as a number or a string depending on the error path
    let status = match &body["responseStatus"] {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    };
    if status != Some(200) {
        return Err(TranslateError::invalid_response(
            NAME,
            format!("status {:?}", body["responseStatus"]),
        ));
    }
    let text = body["responseData"]["translatedText"]
        .as_str()
        .ok_or_else(|| TranslateError::invalid_response(NAME, "missing translatedText"))?;
    if text.contains("MYMEMORY WARNING") {
        return Err(TranslateError::invalid_response(NAME, "quota warning"));
    }
    Ok(text.to_string())
}

#[async_trait]
impl TranslationBackend for OnlineBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Online
    }

    fn name(&self) -> &str {
        "Direct API"
    }

    fn is_available(&self) -> bool {
        self.connectivity.is_online() && !self.services.is_empty()
    }

    fn capabilities(&self) -> Capabilities {
        if self.cloud_key().is_some() {
            Capabilities::BATCH
        } else {
            Capabilities::TEXT
        }
    }

    async fn translate(&self, text: &str, source: &str, target: &str) -> TranslateResult<String> {
        if !self.connectivity.is_online() {
            return Err(TranslateError::Unavailable {
                backend: self.name().to_string(),
            });
        }
        for service in &self.services {
            match self.call(service, text, source, target).await {
                Ok(translation) if is_usable_translation(&translation, text) => {
                    return Ok(translation);
                }
                Ok(_) => debug!("{} returned the input unchanged", service.name()),
                Err(e) => debug!("{} failed: {}", service.name(), e),
            }
        }
        Err(TranslateError::Backend(
            "all online services failed".to_string(),
        ))
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        source: &str,
        target: &str,
    ) -> TranslateResult<Vec<String>> {
        let Some(api_key) = self.cloud_key() else {
            return self.translate_each(texts, source, target).await;
        };

        let mut all_results = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(Self::MAX_BATCH_SIZE) {
            match self.google_cloud_chunk(api_key, chunk, source, target).await {
                Ok(results) => all_results.extend(results),
                Err(e) => {
                    debug!("Google Cloud batch failed, translating one by one: {}", e);
                    all_results.extend(self.translate_each(chunk, source, target).await?);
                }
            }
        }
        Ok(all_results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(services: Vec<OnlineService>) -> OnlineBackend {
        OnlineBackend::new(reqwest::Client::new(), services, Connectivity::default())
    }

    #[test]
    fn test_default_services_without_key() {
        let services =
            OnlineBackend::default_services(None, "https://libre.example/translate".into());
        let names: Vec<_> = services.iter().map(OnlineService::name).collect();
        assert_eq!(names, vec!["Google gtx", "LibreTranslate", "MyMemory"]);
    }

    #[test]
    fn test_default_services_with_key() {
        let services = OnlineBackend::default_services(
            Some("secret".into()),
            "https://libre.example/translate".into(),
        );
        assert_eq!(services[0].name(), "Google Cloud Translation");
        assert_eq!(services.len(), 4);
        let debug_str = format!("{:?}", services[0]);
        assert!(!debug_str.contains("secret"));
    }

    #[test]
    fn test_blank_key_is_ignored() {
        let services = OnlineBackend::default_services(Some("  ".into()), "u".into());
        assert_eq!(services[0].name(), "Google gtx");
    }

    #[test]
    fn test_capabilities_follow_cloud_key() {
        assert_eq!(
            backend(vec![OnlineService::GoogleGtx]).capabilities(),
            Capabilities::TEXT
        );
        assert_eq!(
            backend(vec![OnlineService::GoogleCloud {
                api_key: "k".into()
            }])
            .capabilities(),
            Capabilities::BATCH
        );
    }

    #[test]
    fn test_availability_follows_connectivity() {
        let connectivity = Connectivity::default();
        let online = OnlineBackend::new(
            reqwest::Client::new(),
            vec![OnlineService::MyMemory],
            connectivity.clone(),
        );
        assert!(online.is_available());
        connectivity.set_online(false);
        assert!(!online.is_available());
        assert!(!backend(Vec::new()).is_available());
    }

    #[tokio::test]
    async fn test_offline_translate_fails_fast() {
        let connectivity = Connectivity::new(false);
        let backend = OnlineBackend::new(
            reqwest::Client::new(),
            vec![OnlineService::GoogleGtx],
            connectivity,
        );
        let result = backend.translate("Welcome", "en", "hi").await;
        assert!(matches!(result, Err(TranslateError::Unavailable { .. })));
    }

    #[test]
    fn test_parse_google_cloud() {
        let body = json!({
            "data": { "translations": [
                { "translatedText": "स्वागत" },
                { "translatedText": "गांव" }
            ]}
        });
        assert_eq!(parse_google_cloud(&body).unwrap(), vec!["स्वागत", "गांव"]);
        assert!(parse_google_cloud(&json!({ "error": {} })).is_err());
    }

    #[test]
    fn test_parse_gtx_joins_segments() {
        let body = json!([
            [
                ["नमस्ते। ", "Hello. ", null, null, 10],
                ["स्वागत", "Welcome", null, null, 10]
            ],
            null,
            "en"
        ]);
        assert_eq!(parse_gtx(&body).unwrap(), "नमस्ते। स्वागत");
        assert!(parse_gtx(&json!({})).is_err());
        assert!(parse_gtx(&json!([[]])).is_err());
    }

    #[test]
    fn test_parse_libre() {
        assert_eq!(
            parse_libre(&json!({ "translatedText": "गांव" })).unwrap(),
            "गांव"
        );
        assert!(parse_libre(&json!({ "error": "bad" })).is_err());
        assert!(parse_libre(&json!({ "translatedText": "" })).is_err());
    }

    #[test]
    fn test_parse_mymemory() {
        let ok = json!({
            "responseData": { "translatedText": "होस्ट" },
            "responseStatus": 200
        });
        assert_eq!(parse_mymemory(&ok).unwrap(), "होस्ट");

        let string_status = json!({
            "responseData": { "translatedText": "होस्ट" },
            "responseStatus": "200"
        });
        assert!(parse_mymemory(&string_status).is_ok());

        let warning = json!({
            "responseData": {
                "translatedText": "MYMEMORY WARNING: YOU USED ALL AVAILABLE FREE TRANSLATIONS"
            },
            "responseStatus": 200
        });
        assert!(parse_mymemory(&warning).is_err());

        let failed = json!({ "responseData": null, "responseStatus": 403 });
        assert!(parse_mymemory(&failed).is_err());
    }

    #[tokio::test]
    #[ignore] // Run with: cargo test --ignored
    async fn test_real_gtx_translation() {
        let backend = backend(vec![OnlineService::GoogleGtx]);
        let result = backend.translate("Welcome", "en", "hi").await.unwrap();
        assert!(!result.is_empty());
        assert_ne!(result, "Welcome");
    }
}
