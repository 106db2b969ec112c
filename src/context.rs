//! Application-wide translation context
//!
//! Holds the current language and the page-translation mode on top of a shared
//! [`TranslationEngine`]. Nothing here returns an error: every failure is logged and the
//! caller sees original content.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::engine::{BatchOutcome, TranslationEngine};
use crate::languages::{Language, SUPPORTED_LANGUAGES, find_language};
use crate::preferences::PreferenceStore;
use crate::status::{EngineStatus, StatusTier};

/// What [`TranslationContext::change_language`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LanguageChange {
    /// Code not in the supported table; nothing changed
    Unsupported,
    /// The page-level widget switched the whole document
    PageTranslated,
    /// No page-level backend; element content must be translated individually
    ElementTranslation,
    /// The widget restored the original document
    Restored,
    /// No page-level backend; element content must be restored by the caller
    RestoreElements,
}

impl LanguageChange {
    pub fn changed(self) -> bool {
        self != LanguageChange::Unsupported
    }
}

/// Clears the translating flag however `change_language` exits
struct TranslatingFlag<'a>(&'a AtomicBool);

impl<'a> TranslatingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for TranslatingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct TranslationContext {
    engine: Arc<TranslationEngine>,
    preferences: Arc<dyn PreferenceStore>,
    current_language: RwLock<String>,
    page_translation: AtomicBool,
    is_translating: AtomicBool,
}

impl TranslationContext {
    /// Initialize the engine if needed and restore the saved language
    pub async fn new(
        engine: Arc<TranslationEngine>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        if !engine.is_initialized() {
            engine.initialize().await;
        }

        let source = engine.source_language().to_string();
        let current = match preferences.load_language() {
            Ok(Some(code)) if find_language(&code).is_some() => {
                info!("Restored saved language '{}'", code);
                code
            }
            Ok(Some(code)) => {
                warn!("Ignoring unsupported saved language '{}'", code);
                source
            }
            Ok(None) => source,
            Err(e) => {
                warn!("Could not load language preference: {}", e);
                source
            }
        };

        Self {
            engine,
            preferences,
            current_language: RwLock::new(current),
            page_translation: AtomicBool::new(false),
            is_translating: AtomicBool::new(false),
        }
    }

    pub fn engine(&self) -> &Arc<TranslationEngine> {
        &self.engine
    }

    pub fn source_language(&self) -> &str {
        self.engine.source_language()
    }

    pub fn current_language(&self) -> String {
        self.current_language
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_translating(&self) -> bool {
        self.is_translating.load(Ordering::SeqCst)
    }

    /// Whether the last language change was handled by the page-level widget
    pub fn uses_page_translation(&self) -> bool {
        self.page_translation.load(Ordering::SeqCst)
    }

    pub fn supported_languages(&self) -> &'static [Language] {
        SUPPORTED_LANGUAGES
    }

    pub fn status(&self) -> EngineStatus {
        self.engine.get_status()
    }

    pub fn status_tier(&self) -> StatusTier {
        self.status().tier(self.uses_page_translation())
    }

    pub async fn change_language(&self, code: &str) -> LanguageChange {
        let Some(language) = find_language(code) else {
            warn!("Ignoring unsupported language '{}'", code);
            return LanguageChange::Unsupported;
        };

        let _translating = TranslatingFlag::raise(&self.is_translating);

        *self
            .current_language
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = code.to_string();
        if let Err(e) = self.preferences.save_language(code) {
            warn!("Could not save language preference: {}", e);
        }

        let change = if code != self.engine.source_language() {
            if self.engine.translate_page(code).await {
                LanguageChange::PageTranslated
            } else {
                LanguageChange::ElementTranslation
            }
        } else if self.engine.reset_page().await {
            LanguageChange::Restored
        } else {
            LanguageChange::RestoreElements
        };
        self.page_translation
            .store(change == LanguageChange::PageTranslated, Ordering::SeqCst);

        let status = self.engine.refresh().await;
        debug!("Available methods after language change: {:?}", status.available_methods);
        info!("Language changed to {} ({:?})", language.native_name, change);
        change
    }

    /// Translate into the current language
    pub async fn translate_text(&self, text: &str) -> String {
        let language = self.current_language();
        self.engine.translate(text, &language).await
    }

    pub async fn translate_text_to(&self, text: &str, language: &str) -> String {
        self.engine.translate(text, language).await
    }

    pub async fn translate_batch(&self, texts: &[String], language: &str) -> Vec<String> {
        self.engine.translate_batch(texts, language).await
    }

    pub async fn translate_batch_detailed(&self, texts: &[String], language: &str) -> BatchOutcome {
        self.engine.translate_batch_detailed(texts, language).await
    }
}

impl std::fmt::Debug for TranslationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationContext")
            .field("engine", &self.engine)
            .field("current_language", &self.current_language())
            .field("page_translation", &self.uses_page_translation())
            .finish()
    }
}
