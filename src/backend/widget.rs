//! Google Translate widget adapter
//!
//! The widget is a third-party script that, once loaded, renders a hidden `<select>`
//! (`.goog-te-combo`). Changing that select translates the whole document. The adapter
//! never polls or times out: the only thing that marks it loaded is the script's own
//! load callback, delivered through [`WidgetHost::register_load_callback`].
//!
//! Every operation is best-effort. Failures are logged and reported as `false`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{BackendKind, Capabilities, TranslationBackend};
use crate::error::{TranslateError, TranslateResult};

pub const CONTAINER_ID: &str = "google_translate_element";
pub const SCRIPT_ID: &str = "google-translate-script";
pub const SELECTOR: &str = ".goog-te-combo";
pub const LOAD_CALLBACK: &str = "googleTranslateElementInit";
pub const SCRIPT_URL: &str =
    "https://translate.google.com/translate_a/element.js?cb=googleTranslateElementInit";

pub type LoadCallback = Box<dyn Fn() + Send + Sync>;

/// The document the widget lives in
pub trait WidgetHost: Send + Sync {
    fn element_exists(&self, id: &str) -> bool;

    fn create_hidden_container(&self, id: &str);

    /// Insert an async `<script>` tag with the given id
    fn inject_script(&self, id: &str, src: &str);

    /// Register the global the widget script invokes once it has finished loading
    fn register_load_callback(&self, name: &str, callback: LoadCallback);

    /// Whether `selector` currently matches an element
    fn query_selector(&self, selector: &str) -> bool;

    /// Set the value of the select matched by `selector` and dispatch a `change` event
    fn set_select_value(&self, selector: &str, value: &str) -> TranslateResult<()>;
}

pub struct GoogleTranslateWidget {
    host: Arc<dyn WidgetHost>,
    loaded: Arc<AtomicBool>,
    initialized: AtomicBool,
    current_language: Mutex<String>,
    included_languages: String,
}

impl GoogleTranslateWidget {
    pub fn new(host: Arc<dyn WidgetHost>, included_languages: impl Into<String>) -> Self {
        Self {
            host,
            loaded: Arc::new(AtomicBool::new(false)),
            initialized: AtomicBool::new(false),
            current_language: Mutex::new(String::new()),
            included_languages: included_languages.into(),
        }
    }

    /// Languages the widget is configured to offer
    pub fn included_languages(&self) -> &str {
        &self.included_languages
    }

    /// Create the hidden container, register the load callback and inject the script.
    ///
    /// Safe to call repeatedly; only the first call touches the host.
    pub fn initialize(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }

        if !self.host.element_exists(CONTAINER_ID) {
            self.host.create_hidden_container(CONTAINER_ID);
        }

        let loaded = Arc::clone(&self.loaded);
        self.host.register_load_callback(
            LOAD_CALLBACK,
            Box::new(move || {
                loaded.store(true, Ordering::SeqCst);
                info!("Google Translate widget loaded");
            }),
        );

        if !self.host.element_exists(SCRIPT_ID) {
            self.host.inject_script(SCRIPT_ID, SCRIPT_URL);
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    /// Loaded and the selector is in the document right now; the widget can unmount
    /// between navigations.
    pub fn is_available(&self) -> bool {
        self.is_loaded() && self.host.query_selector(SELECTOR)
    }

    pub fn change_language(&self, code: &str) -> bool {
        if !self.is_loaded() {
            debug!("Google Translate not loaded yet");
            return false;
        }
        if !self.host.query_selector(SELECTOR) {
            warn!("Google Translate selector {} not found", SELECTOR);
            return false;
        }
        match self.host.set_select_value(SELECTOR, code) {
            Ok(()) => {
                *self
                    .current_language
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = code.to_string();
                true
            }
            Err(e) => {
                warn!("Google Translate language change failed: {}", e);
                false
            }
        }
    }

    /// An empty selection is the widget's "show the original" value
    pub fn reset_to_original(&self) -> bool {
        self.change_language("")
    }

    pub fn current_language(&self) -> String {
        self.current_language
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl TranslationBackend for GoogleTranslateWidget {
    fn kind(&self) -> BackendKind {
        BackendKind::GoogleWidget
    }

    fn name(&self) -> &str {
        "Google Translate Widget"
    }

    fn is_available(&self) -> bool {
        GoogleTranslateWidget::is_available(self)
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::PAGE
    }

    async fn probe(&self, _source: &str, _probe_target: &str) {
        self.initialize();
    }

    async fn translate(
        &self,
        _text: &str,
        _source: &str,
        _target: &str,
    ) -> TranslateResult<String> {
        Err(TranslateError::Unsupported {
            backend: self.name().to_string(),
            operation: "text translation",
        })
    }

    async fn translate_page(&self, target: &str) -> TranslateResult<()> {
        if self.change_language(target) {
            Ok(())
        } else {
            Err(TranslateError::WidgetNotReady(format!(
                "could not switch to '{}'",
                target
            )))
        }
    }

    async fn reset_page(&self) -> TranslateResult<()> {
        if self.reset_to_original() {
            Ok(())
        } else {
            Err(TranslateError::WidgetNotReady(
                "could not restore the original page".to_string(),
            ))
        }
    }
}
