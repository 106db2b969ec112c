//! Translation engine
//!
//! The engine owns the backend list and the cache, and hides backend selection from its
//! callers. Every public translate operation fails open: when nothing can translate a
//! string the caller gets the string back unchanged, and the reason goes to the log.
//!
//! ```ignore
//! use std::sync::Arc;
//! use villagestay_translate::backend::BackendKind;
//! use villagestay_translate::engine::TranslationEngine;
//! use villagestay_translate::mock::{MockBackend, MockMode};
//!
//! let engine = TranslationEngine::builder()
//!     .backend(Arc::new(MockBackend::new(BackendKind::Native, MockMode::Suffix)))
//!     .build();
//! engine.initialize().await;
//! assert_eq!(engine.translate("Welcome", "hi").await, "Welcome_hi");
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info, warn};

use crate::backend::{
    BackendKind, Connectivity, GoogleTranslateWidget, MicrosoftTranslatorBackend,
    NativeBackend, NativeTranslationApi, OfflineDictionary, OnlineBackend, TranslationBackend,
    WidgetHost, is_usable_translation,
};
use crate::cache::TranslationCache;
use crate::config::{FallbackPolicy, TranslationConfig};
use crate::error::{TranslateError, TranslateResult};
use crate::languages::widget_language_list;
use crate::status::EngineStatus;

static NON_LINGUISTIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s\W]*$").expect("valid regex"));
static ADDRESS_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@|http|www\.|\.com").expect("valid regex"));

/// Whether a string is worth sending to a backend at all
///
/// Single characters, numbers, punctuation-only strings, e-mail addresses and URLs are
/// shown as they are.
pub fn is_translatable(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.chars().count() >= 2
        && !NON_LINGUISTIC.is_match(trimmed)
        && !ADDRESS_LIKE.is_match(trimmed)
}

fn unusable(backend: &dyn TranslationBackend) -> TranslateError {
    TranslateError::invalid_response(backend.name(), "empty or untranslated result")
}

fn log_failure(backend: &dyn TranslationBackend, text: &str, e: &TranslateError) {
    // absent backends are routine, only misbehaving ones warn
    if e.is_unavailable() {
        debug!("{} skipped for '{}': {}", backend.name(), text, e);
    } else {
        warn!("{} failed for '{}': {}", backend.name(), text, e);
    }
}

/// Host capabilities handed to [`TranslationEngine::from_config`]
#[derive(Clone, Default)]
pub struct HostEnvironment {
    pub native: Option<Arc<dyn NativeTranslationApi>>,
    pub widget: Option<Arc<dyn WidgetHost>>,
    pub connectivity: Connectivity,
}

/// Result of a batch translation
#[derive(Debug)]
pub struct BatchOutcome {
    /// Same length and order as the input; untranslated items carry their original text
    pub translations: Vec<String>,
    /// First failure encountered, if any item could not be translated because of it
    pub error: Option<TranslateError>,
}

impl BatchOutcome {
    fn unchanged(texts: &[String]) -> Self {
        Self {
            translations: texts.to_vec(),
            error: None,
        }
    }
}

pub struct EngineBuilder {
    backends: Vec<Arc<dyn TranslationBackend>>,
    source_language: String,
    probe_language: String,
    policy: FallbackPolicy,
    batch_chunk_size: usize,
}

impl EngineBuilder {
    fn new() -> Self {
        let defaults = TranslationConfig::default();
        Self {
            backends: Vec::new(),
            source_language: defaults.source_language,
            probe_language: defaults.probe_language,
            policy: defaults.fallback_policy,
            batch_chunk_size: defaults.batch_chunk_size,
        }
    }

    pub fn with_config(mut self, config: &TranslationConfig) -> Self {
        self.source_language = config.source_language.clone();
        self.probe_language = config.probe_language.clone();
        self.policy = config.fallback_policy;
        self.batch_chunk_size = config.batch_chunk_size.max(1);
        self
    }

    pub fn backend(mut self, backend: Arc<dyn TranslationBackend>) -> Self {
        self.backends.push(backend);
        self
    }

    pub fn fallback_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn batch_chunk_size(mut self, size: usize) -> Self {
        self.batch_chunk_size = size.max(1);
        self
    }

    pub fn build(mut self) -> TranslationEngine {
        // stable: backends of the same kind keep their registration order
        self.backends.sort_by_key(|backend| backend.kind().priority());
        TranslationEngine {
            backends: self.backends,
            cache: TranslationCache::new(),
            source_language: self.source_language,
            probe_language: self.probe_language,
            policy: self.policy,
            batch_chunk_size: self.batch_chunk_size,
            initialized: AtomicBool::new(false),
        }
    }
}

pub struct TranslationEngine {
    backends: Vec<Arc<dyn TranslationBackend>>,
    cache: TranslationCache,
    source_language: String,
    probe_language: String,
    policy: FallbackPolicy,
    batch_chunk_size: usize,
    initialized: AtomicBool,
}

impl TranslationEngine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Build the standard backend chain from configuration and host hooks
    pub fn from_config(config: &TranslationConfig, host: HostEnvironment) -> TranslateResult<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        let mut builder = Self::builder().with_config(config);
        if let Some(api) = host.native {
            builder = builder.backend(Arc::new(NativeBackend::new(api)));
        }
        if let Some(dom) = host.widget {
            builder = builder.backend(Arc::new(GoogleTranslateWidget::new(
                dom,
                widget_language_list(&config.source_language),
            )));
        }
        if let Some(key) = &config.microsoft_key {
            let mut microsoft = MicrosoftTranslatorBackend::new(
                key.clone(),
                config.microsoft_region.clone(),
                client.clone(),
            )?;
            if let Some(endpoint) = &config.microsoft_endpoint {
                microsoft = microsoft.with_base_url(endpoint.clone());
            }
            builder = builder.backend(Arc::new(microsoft));
        }
        builder = builder.backend(Arc::new(OnlineBackend::new(
            client,
            OnlineBackend::default_services(
                config.google_api_key.clone(),
                config.libretranslate_url.clone(),
            ),
            host.connectivity,
        )));
        if config.offline_dictionary {
            builder = builder.backend(Arc::new(OfflineDictionary::bundled()?));
        }
        Ok(builder.build())
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn backends(&self) -> &[Arc<dyn TranslationBackend>] {
        &self.backends
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Run every backend's asynchronous probe and mark the engine initialized
    pub async fn initialize(&self) {
        info!("Initializing translation engine");
        for backend in &self.backends {
            backend.probe(&self.source_language, &self.probe_language).await;
        }
        self.initialized.store(true, Ordering::SeqCst);
        info!(
            "Translation engine initialized: {:?}",
            self.get_status().available_methods
        );
    }

    /// Re-probe availability and return the fresh status
    pub async fn refresh(&self) -> EngineStatus {
        self.initialize().await;
        self.get_status()
    }

    /// Synchronous snapshot of backend availability
    pub fn get_status(&self) -> EngineStatus {
        let mut status = EngineStatus {
            is_initialized: self.is_initialized(),
            cache_size: self.cache.len(),
            ..EngineStatus::default()
        };
        for backend in &self.backends {
            status.active_translators += backend.active_translators();
            if !backend.is_available() {
                continue;
            }
            status.available_methods.push(backend.name().to_string());
            match backend.kind() {
                BackendKind::Native => status.native_translation = true,
                BackendKind::GoogleWidget => status.google_widget = true,
                BackendKind::Microsoft => status.microsoft_translator = true,
                BackendKind::Online => status.online = true,
                BackendKind::Offline => status.offline_dictionary = true,
            }
        }
        status
    }

    fn passes_through(&self, target: &str) -> bool {
        target == self.source_language
    }

    fn text_candidates(&self) -> Vec<Arc<dyn TranslationBackend>> {
        self.backends
            .iter()
            .filter(|backend| backend.capabilities().text && backend.is_available())
            .cloned()
            .collect()
    }

    /// Translate one string; never fails
    pub async fn translate(&self, text: &str, target: &str) -> String {
        if self.passes_through(target) || text.trim().is_empty() {
            return text.to_string();
        }
        if let Some(cached) = self.cache.get(text, target) {
            debug!("Cache hit for '{}' ({})", text, target);
            return cached;
        }
        if !is_translatable(text) {
            return text.to_string();
        }

        match self.dispatch_single(text, target).await {
            Ok(translation) => {
                self.cache.insert(text, target, translation.clone());
                translation
            }
            Err(e) => {
                warn!("Keeping original text for '{}': {}", text, e);
                text.to_string()
            }
        }
    }

    async fn dispatch_single(&self, text: &str, target: &str) -> TranslateResult<String> {
        let mut first_error = None;
        for backend in self.text_candidates() {
            let error = match backend.translate(text, &self.source_language, target).await {
                Ok(translation) if is_usable_translation(&translation, text) => {
                    debug!("Translated with {}: '{}' → '{}'", backend.name(), text, translation);
                    return Ok(translation);
                }
                Ok(_) => unusable(backend.as_ref()),
                Err(e) => e,
            };
            log_failure(backend.as_ref(), text, &error);
            first_error.get_or_insert(error);
            if self.policy == FallbackPolicy::FirstAvailable {
                break;
            }
        }
        Err(first_error.unwrap_or(TranslateError::NoBackend))
    }

    /// Translate many strings; output has the input's length and order
    pub async fn translate_batch(&self, texts: &[String], target: &str) -> Vec<String> {
        self.translate_batch_detailed(texts, target)
            .await
            .translations
    }

    /// Like [`translate_batch`](Self::translate_batch), also reporting the first failure
    pub async fn translate_batch_detailed(&self, texts: &[String], target: &str) -> BatchOutcome {
        if texts.is_empty() || self.passes_through(target) {
            return BatchOutcome::unchanged(texts);
        }

        let mut resolved: HashMap<&str, String> = HashMap::new();
        let mut pending: Vec<&str> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for text in texts {
            let text = text.as_str();
            if !seen.insert(text) || text.trim().is_empty() {
                continue;
            }
            if let Some(cached) = self.cache.get(text, target) {
                resolved.insert(text, cached);
            } else if is_translatable(text) {
                pending.push(text);
            }
        }
        debug!(
            "Batch of {} texts: {} unique, {} cached, {} to translate",
            texts.len(),
            seen.len(),
            resolved.len(),
            pending.len()
        );

        let mut error = None;
        if !pending.is_empty() {
            let (results, dispatch_error) = self.dispatch_batch(&pending, target).await;
            for (&text, result) in pending.iter().zip(results) {
                if let Some(translation) = result {
                    self.cache.insert(text, target, translation.clone());
                    resolved.insert(text, translation);
                }
            }
            if let Some(e) = &dispatch_error {
                warn!("Batch translation incomplete: {}", e);
            }
            error = dispatch_error;
        }

        let translations = texts
            .iter()
            .map(|text| {
                resolved
                    .get(text.as_str())
                    .cloned()
                    .unwrap_or_else(|| text.clone())
            })
            .collect();
        BatchOutcome {
            translations,
            error,
        }
    }

    /// Returns one slot per pending text; `None` where every tried backend failed
    async fn dispatch_batch(
        &self,
        pending: &[&str],
        target: &str,
    ) -> (Vec<Option<String>>, Option<TranslateError>) {
        let mut results: Vec<Option<String>> = vec![None; pending.len()];
        let candidates = self.text_candidates();
        if candidates.is_empty() {
            return (results, Some(TranslateError::NoBackend));
        }

        let mut first_error = None;
        for backend in candidates {
            let missing: Vec<usize> = (0..pending.len())
                .filter(|&i| results[i].is_none())
                .collect();
            if missing.is_empty() {
                break;
            }

            if backend.capabilities().batch && missing.len() > 1 {
                for chunk in missing.chunks(self.batch_chunk_size) {
                    let chunk_texts: Vec<String> =
                        chunk.iter().map(|&i| pending[i].to_string()).collect();
                    match backend
                        .translate_batch(&chunk_texts, &self.source_language, target)
                        .await
                    {
                        Ok(translated) if translated.len() == chunk.len() => {
                            for (&i, translation) in chunk.iter().zip(translated) {
                                if is_usable_translation(&translation, pending[i]) {
                                    results[i] = Some(translation);
                                } else {
                                    let error = unusable(backend.as_ref());
                                    log_failure(backend.as_ref(), pending[i], &error);
                                    first_error.get_or_insert(error);
                                }
                            }
                        }
                        Ok(translated) => {
                            first_error.get_or_insert(TranslateError::invalid_response(
                                backend.name(),
                                format!(
                                    "expected {} translations, got {}",
                                    chunk.len(),
                                    translated.len()
                                ),
                            ));
                        }
                        Err(e) => {
                            warn!("{} batch failed: {}", backend.name(), e);
                            first_error.get_or_insert(e);
                        }
                    }
                }
            } else {
                for &i in &missing {
                    match backend
                        .translate(pending[i], &self.source_language, target)
                        .await
                    {
                        Ok(translation) if is_usable_translation(&translation, pending[i]) => {
                            results[i] = Some(translation)
                        }
                        Ok(_) => {
                            let error = unusable(backend.as_ref());
                            log_failure(backend.as_ref(), pending[i], &error);
                            first_error.get_or_insert(error);
                        }
                        Err(e) => {
                            log_failure(backend.as_ref(), pending[i], &e);
                            first_error.get_or_insert(e);
                        }
                    }
                }
            }

            if self.policy == FallbackPolicy::FirstAvailable {
                break;
            }
        }

        if results.iter().all(Option::is_some) {
            first_error = None;
        }
        (results, first_error)
    }

    fn page_backend(&self) -> Option<&Arc<dyn TranslationBackend>> {
        self.backends
            .iter()
            .find(|backend| backend.capabilities().page && backend.is_available())
    }

    /// Ask the page-level backend to translate the whole document
    pub async fn translate_page(&self, target: &str) -> bool {
        let Some(backend) = self.page_backend() else {
            debug!("No page-level translation backend available");
            return false;
        };
        match backend.translate_page(target).await {
            Ok(()) => {
                info!("Page translated to {} with {}", target, backend.name());
                true
            }
            Err(e) => {
                warn!("Page translation failed: {}", e);
                false
            }
        }
    }

    /// Restore the untranslated document through the page-level backend
    pub async fn reset_page(&self) -> bool {
        let Some(backend) = self.page_backend() else {
            return false;
        };
        match backend.reset_page().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Resetting page translation failed: {}", e);
                false
            }
        }
    }
}

impl std::fmt::Debug for TranslationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.backends.iter().map(|b| b.name()).collect();
        f.debug_struct("TranslationEngine")
            .field("backends", &names)
            .field("source_language", &self.source_language)
            .field("policy", &self.policy)
            .field("cache_size", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBackend, MockMode, MockWidgetHost};

    fn mock(kind: BackendKind, mode: MockMode) -> Arc<MockBackend> {
        Arc::new(MockBackend::new(kind, mode))
    }

    fn mappings(entries: &[(&str, &str, &str)]) -> MockMode {
        MockMode::Mappings(
            entries
                .iter()
                .map(|&(text, target, translation)| {
                    ((text.to_string(), target.to_string()), translation.to_string())
                })
                .collect(),
        )
    }

    async fn engine_with(backends: Vec<Arc<MockBackend>>) -> TranslationEngine {
        let mut builder = TranslationEngine::builder();
        for backend in backends {
            builder = builder.backend(backend);
        }
        let engine = builder.build();
        engine.initialize().await;
        engine
    }

    #[test]
    fn test_is_translatable() {
        assert!(is_translatable("Welcome"));
        assert!(is_translatable("स्वागत"));
        assert!(!is_translatable("a"));
        assert!(!is_translatable("  42  "));
        assert!(!is_translatable("12:30"));
        assert!(!is_translatable("--- !!"));
        assert!(!is_translatable("host@villagestay.in"));
        assert!(!is_translatable("https://villagestay.in"));
        assert!(!is_translatable("visit www.example.org"));
    }

    #[tokio::test]
    async fn test_source_language_is_identity() {
        let native = mock(BackendKind::Native, MockMode::Suffix);
        let engine = engine_with(vec![native.clone()]).await;
        assert_eq!(engine.translate("Welcome", "en").await, "Welcome");
        assert_eq!(native.calls(), 0);
        assert!(engine.cache().is_empty());
        assert_eq!(engine.cache().stats().misses, 0);
    }

    #[tokio::test]
    async fn test_empty_text_is_identity() {
        let native = mock(BackendKind::Native, MockMode::Suffix);
        let engine = engine_with(vec![native.clone()]).await;
        assert_eq!(engine.translate("", "hi").await, "");
        assert_eq!(engine.translate("   ", "hi").await, "   ");
        assert_eq!(native.calls(), 0);
    }

    #[tokio::test]
    async fn test_second_call_is_cache_hit() {
        let native = mock(BackendKind::Native, MockMode::Suffix);
        let engine = engine_with(vec![native.clone()]).await;
        let first = engine.translate("Welcome", "hi").await;
        let second = engine.translate("Welcome", "hi").await;
        assert_eq!(first, "Welcome_hi");
        assert_eq!(first, second);
        assert_eq!(native.calls(), 1);
        assert_eq!(engine.cache().get("Welcome", "hi").as_deref(), Some("Welcome_hi"));
    }

    #[tokio::test]
    async fn test_priority_order_picks_highest() {
        let online = mock(BackendKind::Online, MockMode::Suffix);
        let microsoft = mock(BackendKind::Microsoft, MockMode::NoOp);
        let native = mock(BackendKind::Native, MockMode::Suffix);
        // registration order must not matter
        let engine = engine_with(vec![online.clone(), microsoft.clone(), native.clone()]).await;
        engine.translate("Village", "ta").await;
        assert_eq!(native.calls(), 1);
        assert_eq!(microsoft.calls(), 0);
        assert_eq!(online.calls(), 0);
        assert_eq!(
            engine.get_status().available_methods,
            vec!["Mock Native", "Mock Microsoft", "Mock Online"]
        );
    }

    #[tokio::test]
    async fn test_unavailable_backends_are_skipped() {
        let native = mock(BackendKind::Native, MockMode::Suffix);
        native.set_available(false);
        let online = mock(BackendKind::Online, MockMode::Suffix);
        let engine = engine_with(vec![native.clone(), online.clone()]).await;
        assert_eq!(engine.translate("Village", "ta").await, "Village_ta");
        assert_eq!(native.calls(), 0);
        assert_eq!(online.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_backend_returns_original() {
        let engine = engine_with(Vec::new()).await;
        assert_eq!(engine.translate("Welcome", "hi").await, "Welcome");
        let status = engine.get_status();
        assert!(status.available_methods.is_empty());
        assert!(engine.cache().is_empty());
    }

    #[tokio::test]
    async fn test_failure_returns_original_and_is_not_cached() {
        let native = mock(BackendKind::Native, MockMode::Error("boom".into()));
        let online = mock(BackendKind::Online, MockMode::Suffix);
        let engine = engine_with(vec![native.clone(), online.clone()]).await;
        assert_eq!(engine.translate("Welcome", "hi").await, "Welcome");
        // first-available: the lower tier is not consulted
        assert_eq!(online.calls(), 0);
        assert!(engine.cache().is_empty());
        // and the next call tries again
        engine.translate("Welcome", "hi").await;
        assert_eq!(native.calls(), 2);
    }

    #[tokio::test]
    async fn test_try_each_policy_falls_through() {
        let native = mock(BackendKind::Native, MockMode::Error("boom".into()));
        let online = mock(BackendKind::Online, MockMode::Suffix);
        let engine = TranslationEngine::builder()
            .backend(native.clone())
            .backend(online.clone())
            .fallback_policy(FallbackPolicy::TryEach)
            .build();
        engine.initialize().await;
        assert_eq!(engine.translate("Welcome", "hi").await, "Welcome_hi");
        assert_eq!(native.calls(), 1);
        assert_eq!(online.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_result_keeps_original() {
        let native = mock(BackendKind::Native, mappings(&[("Welcome", "hi", "")]));
        let online = mock(BackendKind::Online, MockMode::Suffix);
        let engine = engine_with(vec![native.clone(), online.clone()]).await;
        assert_eq!(engine.translate("Welcome", "hi").await, "Welcome");
        assert!(engine.cache().get("Welcome", "hi").is_none());
        assert_eq!(online.calls(), 0);
    }

    #[tokio::test]
    async fn test_unchanged_result_is_not_cached() {
        let native = mock(BackendKind::Native, MockMode::NoOp);
        let engine = engine_with(vec![native.clone()]).await;
        assert_eq!(engine.translate("Village", "hi").await, "Village");
        assert!(engine.cache().get("Village", "hi").is_none());
        engine.translate("Village", "hi").await;
        assert_eq!(native.calls(), 2);
    }

    #[tokio::test]
    async fn test_try_each_moves_past_empty_result() {
        let native = mock(BackendKind::Native, mappings(&[("Welcome", "hi", "")]));
        let online = mock(BackendKind::Online, MockMode::Suffix);
        let engine = TranslationEngine::builder()
            .backend(native.clone())
            .backend(online.clone())
            .fallback_policy(FallbackPolicy::TryEach)
            .build();
        engine.initialize().await;
        assert_eq!(engine.translate("Welcome", "hi").await, "Welcome_hi");
        assert_eq!(online.calls(), 1);
        assert_eq!(engine.cache().get("Welcome", "hi").as_deref(), Some("Welcome_hi"));
    }

    #[tokio::test]
    async fn test_batch_rejects_blank_and_unchanged_items() {
        let microsoft = Arc::new(
            MockBackend::new(
                BackendKind::Microsoft,
                mappings(&[("Price", "hi", ""), ("Guest", "hi", "Guest")]),
            )
            .with_batching(),
        );
        let engine = engine_with(vec![microsoft.clone()]).await;
        let texts = vec!["Price".to_string(), "Date".to_string(), "Guest".to_string()];
        let outcome = engine.translate_batch_detailed(&texts, "hi").await;
        assert_eq!(outcome.translations, vec!["Price", "Date_hi", "Guest"]);
        assert!(matches!(outcome.error, Some(TranslateError::InvalidResponse { .. })));
        assert!(engine.cache().get("Price", "hi").is_none());
        assert!(engine.cache().get("Guest", "hi").is_none());
        assert_eq!(engine.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_non_linguistic_text_skips_backend() {
        let native = mock(BackendKind::Native, MockMode::Suffix);
        let engine = engine_with(vec![native.clone()]).await;
        assert_eq!(engine.translate("2024", "hi").await, "2024");
        assert_eq!(engine.translate("info@villagestay.in", "hi").await, "info@villagestay.in");
        assert_eq!(native.calls(), 0);
    }

    #[tokio::test]
    async fn test_widget_is_never_used_for_text() {
        let host = Arc::new(MockWidgetHost::new());
        let widget = Arc::new(GoogleTranslateWidget::new(host.clone(), "hi"));
        let online = mock(BackendKind::Online, MockMode::Suffix);
        let engine = TranslationEngine::builder()
            .backend(widget)
            .backend(online.clone())
            .build();
        engine.initialize().await;
        host.fire_load_callback();

        assert!(engine.get_status().google_widget);
        assert_eq!(engine.translate("Welcome", "hi").await, "Welcome_hi");
        assert_eq!(online.calls(), 1);
    }

    #[tokio::test]
    async fn test_unloaded_widget_falls_through_to_online() {
        let host = Arc::new(MockWidgetHost::new());
        let widget = Arc::new(GoogleTranslateWidget::new(host.clone(), "hi"));
        let online = mock(BackendKind::Online, MockMode::Suffix);
        let engine = TranslationEngine::builder()
            .backend(widget)
            .backend(online.clone())
            .build();
        engine.initialize().await;

        // the script was injected but its load callback never fires
        assert_eq!(host.scripts_injected(), 1);
        assert!(!engine.get_status().google_widget);
        assert_eq!(engine.translate("Welcome", "hi").await, "Welcome_hi");
        assert_eq!(online.calls(), 1);
        assert!(!engine.translate_page("hi").await);
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_duplicates() {
        let native = mock(BackendKind::Native, MockMode::Suffix);
        let engine = engine_with(vec![native.clone()]).await;
        let texts: Vec<String> = ["Host", "Guest", "Host", "Village", "Guest"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let results = engine.translate_batch(&texts, "hi").await;
        assert_eq!(
            results,
            vec!["Host_hi", "Guest_hi", "Host_hi", "Village_hi", "Guest_hi"]
        );
        assert_eq!(native.calls(), 3);
        assert_eq!(native.requested_texts(), vec!["Host", "Guest", "Village"]);
    }

    #[tokio::test]
    async fn test_batch_uses_single_call_for_batching_backend() {
        let microsoft = Arc::new(
            MockBackend::new(BackendKind::Microsoft, MockMode::Suffix).with_batching(),
        );
        let engine = engine_with(vec![microsoft.clone()]).await;
        let texts: Vec<String> = ["Price", "Date", "Price"].iter().map(|s| s.to_string()).collect();
        let results = engine.translate_batch(&texts, "bn").await;
        assert_eq!(results, vec!["Price_bn", "Date_bn", "Price_bn"]);
        assert_eq!(microsoft.batch_calls(), 1);
        assert_eq!(microsoft.calls(), 0);
    }

    #[tokio::test]
    async fn test_batch_chunks_large_inputs() {
        let microsoft = Arc::new(
            MockBackend::new(BackendKind::Microsoft, MockMode::Suffix).with_batching(),
        );
        let engine = TranslationEngine::builder()
            .backend(microsoft.clone())
            .batch_chunk_size(2)
            .build();
        engine.initialize().await;
        let texts: Vec<String> = (0..5).map(|i| format!("Room {}", i)).collect();
        let results = engine.translate_batch(&texts, "hi").await;
        assert_eq!(results.len(), 5);
        assert_eq!(results[4], "Room 4_hi");
        assert_eq!(microsoft.batch_calls(), 3);
    }

    #[tokio::test]
    async fn test_batch_reuses_cache() {
        let native = mock(BackendKind::Native, MockMode::Suffix);
        let engine = engine_with(vec![native.clone()]).await;
        engine.translate("Host", "hi").await;
        let texts = vec!["Host".to_string(), "Guest".to_string()];
        let results = engine.translate_batch(&texts, "hi").await;
        assert_eq!(results, vec!["Host_hi", "Guest_hi"]);
        assert_eq!(native.requested_texts(), vec!["Host", "Guest"]);
    }

    #[tokio::test]
    async fn test_batch_partial_failure_keeps_originals() {
        let failing = ["Price".to_string()].into_iter().collect();
        let native = mock(BackendKind::Native, MockMode::FailOn(failing));
        let engine = engine_with(vec![native.clone()]).await;
        let texts = vec!["Price".to_string(), "Date".to_string(), "Price".to_string()];
        let outcome = engine.translate_batch_detailed(&texts, "hi").await;
        assert_eq!(outcome.translations, vec!["Price", "Date_hi", "Price"]);
        assert!(matches!(outcome.error, Some(TranslateError::Backend(_))));
        assert!(engine.cache().get("Price", "hi").is_none());
    }

    #[tokio::test]
    async fn test_batch_without_backend_reports_error() {
        let engine = engine_with(Vec::new()).await;
        let texts = vec!["Welcome".to_string(), "42".to_string()];
        let outcome = engine.translate_batch_detailed(&texts, "hi").await;
        assert_eq!(outcome.translations, texts);
        assert!(matches!(outcome.error, Some(TranslateError::NoBackend)));
    }

    #[tokio::test]
    async fn test_batch_identity_cases() {
        let native = mock(BackendKind::Native, MockMode::Suffix);
        let engine = engine_with(vec![native.clone()]).await;
        let texts = vec!["Welcome".to_string()];
        assert_eq!(engine.translate_batch(&texts, "en").await, texts);
        assert!(engine.translate_batch(&[], "hi").await.is_empty());
        assert_eq!(native.calls(), 0);
    }

    #[tokio::test]
    async fn test_try_each_batch_fills_gaps_from_lower_tier() {
        let failing = ["Price".to_string()].into_iter().collect();
        let native = mock(BackendKind::Native, MockMode::FailOn(failing));
        let offline = mock(BackendKind::Offline, mappings(&[("Price", "hi", "कीमत")]));
        let engine = TranslationEngine::builder()
            .backend(native.clone())
            .backend(offline.clone())
            .fallback_policy(FallbackPolicy::TryEach)
            .build();
        engine.initialize().await;
        let texts = vec!["Price".to_string(), "Date".to_string()];
        let outcome = engine.translate_batch_detailed(&texts, "hi").await;
        assert_eq!(outcome.translations, vec!["कीमत", "Date_hi"]);
        assert!(outcome.error.is_none());
        assert_eq!(offline.requested_texts(), vec!["Price"]);
    }

    #[tokio::test]
    async fn test_status_before_and_after_initialize() {
        let native = mock(BackendKind::Native, MockMode::Suffix);
        let engine = TranslationEngine::builder().backend(native).build();
        assert!(!engine.get_status().is_initialized);
        let status = engine.refresh().await;
        assert!(status.is_initialized);
        assert!(status.native_translation);
        assert!(!status.online);
    }

    #[tokio::test]
    async fn test_page_translation_through_widget() {
        let host = Arc::new(MockWidgetHost::new());
        let widget = Arc::new(GoogleTranslateWidget::new(host.clone(), "hi,ta"));
        let engine = TranslationEngine::builder().backend(widget).build();
        engine.initialize().await;
        assert!(!engine.translate_page("hi").await);

        host.fire_load_callback();
        assert!(engine.translate_page("ta").await);
        assert_eq!(host.selected_value().as_deref(), Some("ta"));
        assert!(engine.reset_page().await);
        assert_eq!(host.selected_value().as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_from_config_builds_standard_chain() {
        let config = TranslationConfig {
            microsoft_key: Some("key".to_string()),
            ..TranslationConfig::default()
        };
        let host = HostEnvironment {
            widget: Some(Arc::new(MockWidgetHost::new())),
            ..HostEnvironment::default()
        };
        let engine = TranslationEngine::from_config(&config, host).unwrap();
        let kinds: Vec<BackendKind> = engine.backends().iter().map(|b| b.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                BackendKind::GoogleWidget,
                BackendKind::Microsoft,
                BackendKind::Online,
                BackendKind::Offline
            ]
        );
    }

    #[tokio::test]
    async fn test_from_config_offline_only() {
        let config = TranslationConfig::default();
        let host = HostEnvironment {
            connectivity: Connectivity::new(false),
            ..HostEnvironment::default()
        };
        let engine = TranslationEngine::from_config(&config, host).unwrap();
        engine.initialize().await;
        assert_eq!(engine.translate("Book Now", "hi").await, "अभी बुक करें");
        assert_eq!(engine.translate("Sunset trek", "hi").await, "Sunset trek");
        let status = engine.get_status();
        assert!(!status.online);
        assert_eq!(status.available_methods, vec!["Offline Dictionary"]);
    }
}
