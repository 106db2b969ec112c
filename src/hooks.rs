//! Component-level translation state
//!
//! [`TranslatedContent`] and [`TranslatedItems`] keep a piece of content, its translated
//! form and a loading/error state in sync with the context's current language. Call
//! `refresh()` whenever the component renders; it only does work when the content, the
//! language or one of the declared dependencies changed since the previous run.
//!
//! Results that arrive after [`unmount`](TranslatedContent::unmount) are dropped.
//! Overlapping refreshes are not ordered: the last one to finish wins.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::context::TranslationContext;

/// Content handed to [`TranslatedContent`]
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationRequest {
    Text(String),
    /// Only non-empty string fields are translated
    Record(Map<String, Value>),
}

impl TranslationRequest {
    pub fn is_empty(&self) -> bool {
        match self {
            TranslationRequest::Text(text) => text.is_empty(),
            TranslationRequest::Record(fields) => fields.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TranslationRequest::Text(text) => Some(text),
            TranslationRequest::Record(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<&Map<String, Value>> {
        match self {
            TranslationRequest::Record(fields) => Some(fields),
            TranslationRequest::Text(_) => None,
        }
    }

    fn texts(&self) -> Vec<String> {
        match self {
            TranslationRequest::Text(text) => vec![text.clone()],
            TranslationRequest::Record(fields) => fields
                .values()
                .filter_map(Value::as_str)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    fn rebuild(&self, lookup: &HashMap<&str, &str>) -> Self {
        match self {
            TranslationRequest::Text(text) => TranslationRequest::Text(
                lookup
                    .get(text.as_str())
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| text.clone()),
            ),
            TranslationRequest::Record(fields) => TranslationRequest::Record(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), translate_value(value, lookup)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for TranslationRequest {
    fn from(text: &str) -> Self {
        TranslationRequest::Text(text.to_string())
    }
}

impl From<String> for TranslationRequest {
    fn from(text: String) -> Self {
        TranslationRequest::Text(text)
    }
}

impl From<Map<String, Value>> for TranslationRequest {
    fn from(fields: Map<String, Value>) -> Self {
        TranslationRequest::Record(fields)
    }
}

fn translate_value(value: &Value, lookup: &HashMap<&str, &str>) -> Value {
    match value {
        Value::String(text) => match lookup.get(text.as_str()) {
            Some(translated) => Value::String(translated.to_string()),
            None => value.clone(),
        },
        other => other.clone(),
    }
}

/// What a component renders from
#[derive(Debug, Clone, PartialEq)]
pub struct HookState<T> {
    pub translated: T,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Current language differs from the source and the last run had no error
    pub is_translated: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct RunKey<T> {
    content: T,
    language: String,
    dependencies: Vec<String>,
}

#[derive(Debug)]
struct HookInner<T> {
    content: T,
    dependencies: Vec<String>,
    translated: T,
    is_loading: bool,
    error: Option<String>,
    language: String,
    last_run: Option<RunKey<T>>,
}

impl<T: Clone + PartialEq> HookInner<T> {
    fn new(content: T, language: String) -> Self {
        Self {
            translated: content.clone(),
            content,
            dependencies: Vec::new(),
            is_loading: false,
            error: None,
            language,
            last_run: None,
        }
    }

    /// Records the run and returns the content to translate, or `None` if nothing changed
    fn begin(&mut self, language: &str) -> Option<T> {
        let key = RunKey {
            content: self.content.clone(),
            language: language.to_string(),
            dependencies: self.dependencies.clone(),
        };
        if self.last_run.as_ref() == Some(&key) {
            return None;
        }
        self.last_run = Some(key);
        self.language = language.to_string();
        Some(self.content.clone())
    }

    fn finish(&mut self, translated: T, error: Option<String>) {
        self.translated = translated;
        self.error = error;
        self.is_loading = false;
    }

    fn snapshot(&self, source_language: &str) -> HookState<T> {
        HookState {
            translated: self.translated.clone(),
            is_loading: self.is_loading,
            error: self.error.clone(),
            is_translated: self.language != source_language && self.error.is_none(),
        }
    }
}

enum Run<T> {
    /// Unmounted, or nothing changed since the previous run
    Skipped,
    Settled,
    Translate(T, String),
}

/// Shared plumbing of both hooks
struct Hook<T> {
    ctx: Arc<TranslationContext>,
    inner: Mutex<HookInner<T>>,
    mounted: AtomicBool,
}

impl<T: Clone + PartialEq> Hook<T> {
    fn new(ctx: Arc<TranslationContext>, content: T) -> Self {
        let language = ctx.current_language();
        Self {
            ctx,
            inner: Mutex::new(HookInner::new(content, language)),
            mounted: AtomicBool::new(true),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HookInner<T>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    fn start(&self, is_empty: impl Fn(&T) -> bool) -> Run<T> {
        if !self.is_mounted() {
            return Run::Skipped;
        }
        let language = self.ctx.current_language();
        let mut inner = self.lock();
        let Some(content) = inner.begin(&language) else {
            return Run::Skipped;
        };
        // nothing to translate: show the content as is
        if language == self.ctx.source_language() || is_empty(&content) {
            inner.finish(content, None);
            return Run::Settled;
        }
        inner.is_loading = true;
        inner.error = None;
        Run::Translate(content, language)
    }

    fn complete(&self, translated: T, error: Option<String>) {
        if !self.is_mounted() {
            debug!("Dropping translation result for unmounted component");
            return;
        }
        self.lock().finish(translated, error);
    }

    fn snapshot(&self) -> HookState<T> {
        self.lock().snapshot(self.ctx.source_language())
    }
}

/// Translated view of a string or a flat record
pub struct TranslatedContent {
    hook: Hook<TranslationRequest>,
}

impl TranslatedContent {
    pub fn new(ctx: Arc<TranslationContext>, content: impl Into<TranslationRequest>) -> Self {
        Self {
            hook: Hook::new(ctx, content.into()),
        }
    }

    pub fn with_dependencies(self, dependencies: Vec<String>) -> Self {
        self.hook.lock().dependencies = dependencies;
        self
    }

    pub fn set_content(&self, content: impl Into<TranslationRequest>) {
        self.hook.lock().content = content.into();
    }

    pub fn set_dependencies(&self, dependencies: Vec<String>) {
        self.hook.lock().dependencies = dependencies;
    }

    /// Bring the translated value up to date; returns whether a run happened
    pub async fn refresh(&self) -> bool {
        let (content, language) = match self.hook.start(TranslationRequest::is_empty) {
            Run::Skipped => return false,
            Run::Settled => return true,
            Run::Translate(content, language) => (content, language),
        };

        let texts = content.texts();
        let outcome = self.hook.ctx.translate_batch_detailed(&texts, &language).await;
        match outcome.error {
            Some(e) => {
                warn!("Content translation failed: {}", e);
                self.hook.complete(content, Some(e.to_string()));
            }
            None => {
                let lookup: HashMap<&str, &str> = texts
                    .iter()
                    .map(String::as_str)
                    .zip(outcome.translations.iter().map(String::as_str))
                    .collect();
                self.hook.complete(content.rebuild(&lookup), None);
            }
        }
        true
    }

    pub fn snapshot(&self) -> HookState<TranslationRequest> {
        self.hook.snapshot()
    }

    /// Stop accepting results; in-flight translations are discarded when they land
    pub fn unmount(&self) {
        self.hook.mounted.store(false, Ordering::SeqCst);
    }
}

/// Translated view of a list of JSON objects
///
/// All configured text fields across the list are deduplicated and translated with a
/// single batch call. Missing or non-string fields pass through.
pub struct TranslatedItems {
    hook: Hook<Vec<Value>>,
    text_keys: Vec<String>,
}

impl TranslatedItems {
    pub fn new<K: Into<String>>(
        ctx: Arc<TranslationContext>,
        items: Vec<Value>,
        text_keys: impl IntoIterator<Item = K>,
    ) -> Self {
        Self {
            hook: Hook::new(ctx, items),
            text_keys: text_keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_dependencies(self, dependencies: Vec<String>) -> Self {
        self.hook.lock().dependencies = dependencies;
        self
    }

    pub fn set_items(&self, items: Vec<Value>) {
        self.hook.lock().content = items;
    }

    pub fn set_dependencies(&self, dependencies: Vec<String>) {
        self.hook.lock().dependencies = dependencies;
    }

    fn unique_texts(&self, items: &[Value]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut texts = Vec::new();
        for item in items {
            for key in &self.text_keys {
                if let Some(text) = item.get(key).and_then(Value::as_str) {
                    if !text.is_empty() && seen.insert(text) {
                        texts.push(text.to_string());
                    }
                }
            }
        }
        texts
    }

    fn rebuild(&self, items: &[Value], lookup: &HashMap<&str, &str>) -> Vec<Value> {
        items
            .iter()
            .map(|item| {
                let mut item = item.clone();
                if let Value::Object(fields) = &mut item {
                    for key in &self.text_keys {
                        if let Some(value) = fields.get_mut(key) {
                            *value = translate_value(value, lookup);
                        }
                    }
                }
                item
            })
            .collect()
    }

    /// Bring the translated items up to date; returns whether a run happened
    pub async fn refresh(&self) -> bool {
        let (items, language) = match self.hook.start(Vec::is_empty) {
            Run::Skipped => return false,
            Run::Settled => return true,
            Run::Translate(items, language) => (items, language),
        };

        let texts = self.unique_texts(&items);
        let outcome = self.hook.ctx.translate_batch_detailed(&texts, &language).await;
        match outcome.error {
            Some(e) => {
                warn!("Item translation failed: {}", e);
                self.hook.complete(items, Some(e.to_string()));
            }
            None => {
                let lookup: HashMap<&str, &str> = texts
                    .iter()
                    .map(String::as_str)
                    .zip(outcome.translations.iter().map(String::as_str))
                    .collect();
                let translated = self.rebuild(&items, &lookup);
                self.hook.complete(translated, None);
            }
        }
        true
    }

    pub fn snapshot(&self) -> HookState<Vec<Value>> {
        self.hook.snapshot()
    }

    pub fn unmount(&self) {
        self.hook.mounted.store(false, Ordering::SeqCst);
    }
}
