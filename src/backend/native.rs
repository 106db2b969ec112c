//! Native in-process translation
//!
//! The host exposes whatever on-device translation the platform provides through
//! [`NativeTranslationApi`]. Availability is decided by an asynchronous `can_translate`
//! check, so [`NativeBackend::is_available`] reports the outcome of the last
//! [`probe`](TranslationBackend::probe) rather than asking the host every time.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, info};

use super::{BackendKind, TranslationBackend};
use crate::error::{TranslateError, TranslateResult};

/// Answer of the host's capability check for a language pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslatorAvailability {
    /// Model is present and can be used immediately
    Readily,
    /// Model must be downloaded first, but will work
    AfterDownload,
    No,
}

impl TranslatorAvailability {
    pub fn is_usable(self) -> bool {
        matches!(
            self,
            TranslatorAvailability::Readily | TranslatorAvailability::AfterDownload
        )
    }
}

/// A translator instance bound to one language pair
#[async_trait]
pub trait NativeTranslator: Send + Sync {
    async fn translate(&self, text: &str) -> TranslateResult<String>;
}

/// Host hook for platform translation
#[async_trait]
pub trait NativeTranslationApi: Send + Sync {
    async fn can_translate(&self, source: &str, target: &str) -> TranslatorAvailability;

    /// Create a translator; resolves once the instance is ready to use
    async fn create_translator(
        &self,
        source: &str,
        target: &str,
    ) -> TranslateResult<Arc<dyn NativeTranslator>>;
}

pub struct NativeBackend {
    api: Arc<dyn NativeTranslationApi>,
    supported: AtomicBool,
    // keyed by "source-target"
    translators: Mutex<HashMap<String, Arc<dyn NativeTranslator>>>,
}

impl NativeBackend {
    pub fn new(api: Arc<dyn NativeTranslationApi>) -> Self {
        Self {
            api,
            supported: AtomicBool::new(false),
            translators: Mutex::new(HashMap::new()),
        }
    }

    async fn translator_for(
        &self,
        source: &str,
        target: &str,
    ) -> TranslateResult<Arc<dyn NativeTranslator>> {
        let key = format!("{}-{}", source, target);
        let existing = self
            .translators
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
            .cloned();
        if let Some(translator) = existing {
            return Ok(translator);
        }

        debug!("Creating native translator for {}", key);
        let translator = self.api.create_translator(source, target).await?;
        // Two tasks may race to create the same pair; keep whichever landed first.
        let mut translators = self
            .translators
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(translators.entry(key).or_insert(translator).clone())
    }
}

#[async_trait]
impl TranslationBackend for NativeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }

    fn name(&self) -> &str {
        "Web Translation API"
    }

    fn is_available(&self) -> bool {
        self.supported.load(Ordering::Relaxed)
    }

    async fn probe(&self, source: &str, probe_target: &str) {
        let availability = self.api.can_translate(source, probe_target).await;
        let usable = availability.is_usable();
        self.supported.store(usable, Ordering::Relaxed);
        if usable {
            info!("Native translation available ({:?})", availability);
        } else {
            debug!("Native translation not available");
        }
    }

    async fn translate(&self, text: &str, source: &str, target: &str) -> TranslateResult<String> {
        if !self.is_available() {
            return Err(TranslateError::Unavailable {
                backend: self.name().to_string(),
            });
        }
        let translator = self.translator_for(source, target).await?;
        translator.translate(text).await
    }

    fn active_translators(&self) -> usize {
        self.translators
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockNativeApi;

    #[tokio::test]
    async fn test_unavailable_until_probed() {
        let api = Arc::new(MockNativeApi::new(TranslatorAvailability::Readily));
        let backend = NativeBackend::new(api);
        assert!(!backend.is_available());
        backend.probe("en", "hi").await;
        assert!(backend.is_available());
    }

    #[tokio::test]
    async fn test_after_download_counts_as_available() {
        let api = Arc::new(MockNativeApi::new(TranslatorAvailability::AfterDownload));
        let backend = NativeBackend::new(api);
        backend.probe("en", "hi").await;
        assert!(backend.is_available());
    }

    #[tokio::test]
    async fn test_probe_can_revoke_availability() {
        let api = Arc::new(MockNativeApi::new(TranslatorAvailability::Readily));
        let backend = NativeBackend::new(api.clone());
        backend.probe("en", "hi").await;
        api.set_availability(TranslatorAvailability::No);
        backend.probe("en", "hi").await;
        assert!(!backend.is_available());
    }

    #[tokio::test]
    async fn test_translators_are_reused_per_pair() {
        let api = Arc::new(MockNativeApi::new(TranslatorAvailability::Readily));
        let backend = NativeBackend::new(api.clone());
        backend.probe("en", "hi").await;

        let first = backend.translate("Village", "en", "hi").await.unwrap();
        let second = backend.translate("Host", "en", "hi").await.unwrap();
        backend.translate("Host", "en", "ta").await.unwrap();

        assert_eq!(first, "Village_hi");
        assert_eq!(second, "Host_hi");
        assert_eq!(backend.active_translators(), 2);
        assert_eq!(api.translators_created(), 2);
    }

    #[tokio::test]
    async fn test_translate_without_probe_fails() {
        let api = Arc::new(MockNativeApi::new(TranslatorAvailability::Readily));
        let backend = NativeBackend::new(api);
        let result = backend.translate("Village", "en", "hi").await;
        assert!(matches!(result, Err(TranslateError::Unavailable { .. })));
    }
}
