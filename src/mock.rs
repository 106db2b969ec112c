//! Deterministic stand-ins for backends and host hooks
//!
//! Used by the test suite and by the CLI's `--mock` flag, so the whole pipeline can run
//! without a browser, API keys or network access.
//!
//! # Example
//!
//! ```ignore
//! use villagestay_translate::backend::{BackendKind, TranslationBackend};
//! use villagestay_translate::mock::{MockBackend, MockMode};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockBackend::new(BackendKind::Native, MockMode::Suffix);
//!     let result = mock.translate("hello", "en", "fr").await.unwrap();
//!     assert_eq!(result, "hello_fr");
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::backend::widget::{LoadCallback, SELECTOR};
use crate::backend::{
    BackendKind, Capabilities, NativeTranslationApi, NativeTranslator, TranslationBackend,
    TranslatorAvailability, WidgetHost,
};
use crate::error::{TranslateError, TranslateResult};

/// How a [`MockBackend`] answers
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append the target code: "hello" → "hello_fr"
    Suffix,

    /// (text, target) → translation, falling back to `Suffix` for unknown pairs
    Mappings(HashMap<(String, String), String>),

    /// Fail for the listed texts, `Suffix` for everything else
    FailOn(HashSet<String>),

    /// Fail every call
    Error(String),

    /// Return the input unchanged
    NoOp,
}

pub struct MockBackend {
    kind: BackendKind,
    name: String,
    mode: MockMode,
    delay_ms: u64,
    batching: bool,
    available: AtomicBool,
    calls: AtomicUsize,
    batch_calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new(kind: BackendKind, mode: MockMode) -> Self {
        Self {
            kind,
            name: format!("Mock {:?}", kind),
            mode,
            delay_ms: 0,
            batching: false,
            available: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
            batch_calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Simulated latency applied to every call
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Advertise native batching
    pub fn with_batching(mut self) -> Self {
        self.batching = true;
        self
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    /// Number of single-text calls
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Number of native batch calls
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::Relaxed)
    }

    /// Every text this backend was asked to translate, in call order
    pub fn requested_texts(&self) -> Vec<String> {
        self.requested
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn apply_delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    fn record(&self, texts: &[String]) {
        self.requested
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend(texts.iter().cloned());
    }

    fn apply_translation(&self, text: &str, target: &str) -> TranslateResult<String> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::FailOn(failing) if failing.contains(text) => Err(
                TranslateError::Backend(format!("mock failure for '{}'", text)),
            ),
            MockMode::FailOn(_) => Ok(format!("{}_{}", text, target)),
            MockMode::Error(msg) => Err(TranslateError::Backend(msg.clone())),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    fn capabilities(&self) -> Capabilities {
        if self.batching {
            Capabilities::BATCH
        } else {
            Capabilities::TEXT
        }
    }

    async fn translate(&self, text: &str, _source: &str, target: &str) -> TranslateResult<String> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.record(&[text.to_string()]);
        self.apply_delay().await;
        self.apply_translation(text, target)
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        source: &str,
        target: &str,
    ) -> TranslateResult<Vec<String>> {
        if !self.batching {
            let mut results = Vec::with_capacity(texts.len());
            for text in texts {
                results.push(self.translate(text, source, target).await?);
            }
            return Ok(results);
        }

        self.batch_calls.fetch_add(1, Ordering::Relaxed);
        self.record(texts);
        // delay is per batch, not per string
        self.apply_delay().await;
        texts
            .iter()
            .map(|text| self.apply_translation(text, target))
            .collect()
    }
}

/// Native translator that appends the target code
pub struct MockNativeTranslator {
    target: String,
}

#[async_trait]
impl NativeTranslator for MockNativeTranslator {
    async fn translate(&self, text: &str) -> TranslateResult<String> {
        Ok(format!("{}_{}", text, self.target))
    }
}

pub struct MockNativeApi {
    availability: Mutex<TranslatorAvailability>,
    created: AtomicUsize,
}

impl MockNativeApi {
    pub fn new(availability: TranslatorAvailability) -> Self {
        Self {
            availability: Mutex::new(availability),
            created: AtomicUsize::new(0),
        }
    }

    pub fn set_availability(&self, availability: TranslatorAvailability) {
        *self
            .availability
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = availability;
    }

    pub fn translators_created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl NativeTranslationApi for MockNativeApi {
    async fn can_translate(&self, _source: &str, _target: &str) -> TranslatorAvailability {
        *self
            .availability
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn create_translator(
        &self,
        _source: &str,
        target: &str,
    ) -> TranslateResult<Arc<dyn NativeTranslator>> {
        self.created.fetch_add(1, Ordering::Relaxed);
        Ok(Arc::new(MockNativeTranslator {
            target: target.to_string(),
        }))
    }
}

#[derive(Default)]
struct DomState {
    elements: HashSet<String>,
    callbacks: HashMap<String, LoadCallback>,
    selector_present: bool,
    selected: Option<String>,
    change_events: usize,
    containers_created: usize,
    scripts_injected: usize,
}

/// In-memory document for the Google widget
///
/// The injected script does nothing until [`fire_load_callback`](Self::fire_load_callback)
/// is called, which mounts the selector and runs the registered callback the way the
/// real widget script does.
#[derive(Default)]
pub struct MockWidgetHost {
    state: Mutex<DomState>,
}

impl MockWidgetHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, DomState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Simulate the widget script finishing its load
    pub fn fire_load_callback(&self) {
        let mut state = self.state();
        state.selector_present = true;
        if let Some(callback) = state.callbacks.get(crate::backend::widget::LOAD_CALLBACK) {
            callback();
        }
    }

    /// Simulate the widget unmounting its selector
    pub fn remove_selector(&self) {
        self.state().selector_present = false;
    }

    pub fn selected_value(&self) -> Option<String> {
        self.state().selected.clone()
    }

    pub fn change_events(&self) -> usize {
        self.state().change_events
    }

    pub fn containers_created(&self) -> usize {
        self.state().containers_created
    }

    pub fn scripts_injected(&self) -> usize {
        self.state().scripts_injected
    }
}

impl WidgetHost for MockWidgetHost {
    fn element_exists(&self, id: &str) -> bool {
        self.state().elements.contains(id)
    }

    fn create_hidden_container(&self, id: &str) {
        let mut state = self.state();
        state.elements.insert(id.to_string());
        state.containers_created += 1;
    }

    fn inject_script(&self, id: &str, _src: &str) {
        let mut state = self.state();
        state.elements.insert(id.to_string());
        state.scripts_injected += 1;
    }

    fn register_load_callback(&self, name: &str, callback: LoadCallback) {
        self.state().callbacks.insert(name.to_string(), callback);
    }

    fn query_selector(&self, selector: &str) -> bool {
        selector == SELECTOR && self.state().selector_present
    }

    fn set_select_value(&self, selector: &str, value: &str) -> TranslateResult<()> {
        let mut state = self.state();
        if selector != SELECTOR || !state.selector_present {
            return Err(TranslateError::WidgetNotReady(format!(
                "{} not found",
                selector
            )));
        }
        state.selected = Some(value.to_string());
        state.change_events += 1;
        Ok(())
    }
}
