//! Engine configuration
//!
//! Configuration comes from an optional JSON file and is then overlaid with environment
//! variables, so API keys never need to be written to disk:
//!
//! | Variable                        | Field                |
//! |---------------------------------|----------------------|
//! | `GOOGLE_TRANSLATE_API_KEY`      | `google_api_key`     |
//! | `MICROSOFT_TRANSLATOR_KEY`      | `microsoft_key`      |
//! | `MICROSOFT_TRANSLATOR_REGION`   | `microsoft_region`   |
//! | `MICROSOFT_TRANSLATOR_ENDPOINT` | `microsoft_endpoint` |
//! | `LIBRETRANSLATE_URL`            | `libretranslate_url` |
//! | `VILLAGESTAY_SOURCE_LANGUAGE`   | `source_language`    |
//! | `VILLAGESTAY_FALLBACK_POLICY`   | `fallback_policy`    |

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{TranslateError, TranslateResult};
use crate::languages::normalize_language;

/// What the engine does when the selected backend fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Only the highest-priority available backend is tried; on failure the original text
    /// is returned.
    #[default]
    FirstAvailable,
    /// Every available backend is tried in priority order until one succeeds.
    TryEach,
}

impl std::str::FromStr for FallbackPolicy {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "first-available" => Ok(FallbackPolicy::FirstAvailable),
            "try-each" => Ok(FallbackPolicy::TryEach),
            other => Err(TranslateError::Config(format!(
                "unknown fallback policy '{}', expected 'first-available' or 'try-each'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Language the page content is authored in
    pub source_language: String,
    /// Target used when probing native translation support at start-up
    pub probe_language: String,
    pub fallback_policy: FallbackPolicy,
    /// Maximum number of texts handed to a batching backend in one call
    pub batch_chunk_size: usize,
    pub request_timeout_secs: u64,
    pub google_api_key: Option<String>,
    pub microsoft_key: Option<String>,
    pub microsoft_region: Option<String>,
    /// Custom-domain or sovereign-cloud endpoint; the global endpoint when unset
    pub microsoft_endpoint: Option<String>,
    pub libretranslate_url: String,
    pub offline_dictionary: bool,
    /// Key under which the selected language is persisted
    pub preference_key: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source_language: "en".to_string(),
            probe_language: "hi".to_string(),
            fallback_policy: FallbackPolicy::FirstAvailable,
            batch_chunk_size: 50,
            request_timeout_secs: 30,
            google_api_key: None,
            microsoft_key: None,
            microsoft_region: None,
            microsoft_endpoint: None,
            libretranslate_url: "https://libretranslate.de/translate".to_string(),
            offline_dictionary: true,
            preference_key: "villagestay_language".to_string(),
        }
    }
}

impl TranslationConfig {
    /// Defaults overlaid with environment variables
    pub fn from_env() -> TranslateResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Read a JSON file, then overlay environment variables
    pub fn from_file(path: impl AsRef<Path>) -> TranslateResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let mut config: Self = serde_json::from_str(&raw)?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> TranslateResult<()> {
        if let Some(key) = non_empty_env("GOOGLE_TRANSLATE_API_KEY") {
            self.google_api_key = Some(key);
        }
        if let Some(key) = non_empty_env("MICROSOFT_TRANSLATOR_KEY") {
            self.microsoft_key = Some(key);
        }
        if let Some(region) = non_empty_env("MICROSOFT_TRANSLATOR_REGION") {
            self.microsoft_region = Some(region);
        }
        if let Some(endpoint) = non_empty_env("MICROSOFT_TRANSLATOR_ENDPOINT") {
            self.microsoft_endpoint = Some(endpoint);
        }
        if let Some(url) = non_empty_env("LIBRETRANSLATE_URL") {
            self.libretranslate_url = url;
        }
        if let Some(lang) = non_empty_env("VILLAGESTAY_SOURCE_LANGUAGE") {
            self.source_language = normalize_language(&lang)?;
        }
        if let Some(policy) = non_empty_env("VILLAGESTAY_FALLBACK_POLICY") {
            self.fallback_policy = policy.parse()?;
        }
        Ok(())
    }

    pub fn validate(&self) -> TranslateResult<()> {
        if self.batch_chunk_size == 0 {
            return Err(TranslateError::Config(
                "batch_chunk_size must be at least 1".to_string(),
            ));
        }
        normalize_language(&self.source_language)?;
        normalize_language(&self.probe_language)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
