//! Translation backends
//!
//! A backend is one concrete translation provider. The engine keeps a list of them sorted
//! by [`BackendKind::priority`] and asks each whether it is usable right now before
//! handing it work.
//!
//! | Kind            | Probe                                    | Text | Batch | Page |
//! |-----------------|------------------------------------------|------|-------|------|
//! | Native          | host `can_translate` for the probe pair  | yes  | no    | no   |
//! | Google widget   | script loaded and selector present       | no   | no    | yes  |
//! | Microsoft       | subscription key configured              | yes  | yes   | no   |
//! | Online          | connectivity signal reports online       | yes  | *     | no   |
//! | Offline         | always                                   | yes  | no    | no   |
//!
//! \* only when a Google Cloud API key is configured

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{TranslateError, TranslateResult};

pub mod microsoft;
pub mod native;
pub mod offline;
pub mod online;
pub mod widget;

pub use microsoft::MicrosoftTranslatorBackend;
pub use native::{NativeBackend, NativeTranslationApi, NativeTranslator, TranslatorAvailability};
pub use offline::OfflineDictionary;
pub use online::{OnlineBackend, OnlineService};
pub use widget::{GoogleTranslateWidget, WidgetHost};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    Native,
    GoogleWidget,
    Microsoft,
    Online,
    Offline,
}

impl BackendKind {
    /// Lower is tried first
    pub fn priority(self) -> u8 {
        match self {
            BackendKind::Native => 0,
            BackendKind::GoogleWidget => 1,
            BackendKind::Microsoft => 2,
            BackendKind::Online => 3,
            BackendKind::Offline => 4,
        }
    }
}

/// What a backend can be asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Returns translated text for a string
    pub text: bool,
    /// Accepts many strings in one call
    pub batch: bool,
    /// Translates the whole rendered document in place
    pub page: bool,
}

impl Capabilities {
    pub const TEXT: Capabilities = Capabilities {
        text: true,
        batch: false,
        page: false,
    };
    pub const BATCH: Capabilities = Capabilities {
        text: true,
        batch: true,
        page: false,
    };
    pub const PAGE: Capabilities = Capabilities {
        text: false,
        batch: false,
        page: true,
    };
}

/// One concrete translation provider
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Human readable name, reported in `available_methods`
    fn name(&self) -> &str;

    /// Synchronous capability probe; must be cheap and side-effect free
    fn is_available(&self) -> bool;

    fn capabilities(&self) -> Capabilities {
        Capabilities::TEXT
    }

    /// Refresh any availability state that can only be determined asynchronously
    async fn probe(&self, _source: &str, _probe_target: &str) {}

    async fn translate(&self, text: &str, source: &str, target: &str)
    -> TranslateResult<String>;

    /// Translate many strings; output order and length match the input.
    ///
    /// The default issues one `translate` call per text.
    async fn translate_batch(
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

    /// Switch whole-document translation to `target`
    async fn translate_page(&self, _target: &str) -> TranslateResult<()> {
        Err(TranslateError::Unsupported {
            backend: self.name().to_string(),
            operation: "page translation",
        })
    }

    /// Undo whole-document translation
    async fn reset_page(&self) -> TranslateResult<()> {
        Err(TranslateError::Unsupported {
            backend: self.name().to_string(),
            operation: "page translation",
        })
    }

    /// Number of live translator instances held by this backend
    fn active_translators(&self) -> usize {
        0
    }
}

/// Whether a backend answer can replace the original
///
/// Blank results and results equal to the input count as failures and are never cached.
pub fn is_usable_translation(translation: &str, original: &str) -> bool {
    let translation = translation.trim();
    !translation.is_empty() && translation != original.trim()
}

/// Online/offline signal supplied by the host
///
/// Clones share state, so the host can flip it while the engine holds a copy.
#[derive(Debug, Clone)]
pub struct Connectivity(Arc<AtomicBool>);

impl Connectivity {
    pub fn new(online: bool) -> Self {
        Self(Arc::new(AtomicBool::new(online)))
    }

    pub fn is_online(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set_online(&self, online: bool) {
        self.0.store(online, Ordering::Relaxed);
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(true)
    }
}
