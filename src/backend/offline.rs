//! Offline dictionary of common interface terms
//!
//! Always available and lowest priority. Only exact (trimmed) matches hit; anything else
//! is an error so the engine keeps the original text.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{BackendKind, TranslationBackend};
use crate::error::{TranslateError, TranslateResult};

const BUNDLED: &str = include_str!("../../data/offline_dictionary.json");

#[derive(Debug, Clone, Default)]
pub struct OfflineDictionary {
    // language -> term -> translation
    entries: HashMap<String, HashMap<String, String>>,
}

impl OfflineDictionary {
    /// The dictionary shipped with the crate
    pub fn bundled() -> TranslateResult<Self> {
        Self::from_json(BUNDLED)
    }

    pub fn from_json(raw: &str) -> TranslateResult<Self> {
        Ok(Self {
            entries: serde_json::from_str(raw)?,
        })
    }

    pub fn lookup(&self, text: &str, language: &str) -> Option<&str> {
        self.entries
            .get(language)
            .and_then(|terms| terms.get(text.trim()))
            .map(String::as_str)
    }

    /// Whether `text` is one of the terms the dictionary knows in any language
    pub fn is_common_term(&self, text: &str) -> bool {
        self.entries
            .values()
            .any(|terms| terms.contains_key(text.trim()))
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[async_trait]
impl TranslationBackend for OfflineDictionary {
    fn kind(&self) -> BackendKind {
        BackendKind::Offline
    }

    fn name(&self) -> &str {
        "Offline Dictionary"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn translate(&self, text: &str, _source: &str, target: &str) -> TranslateResult<String> {
        if let Some(translation) = self.lookup(text, target) {
            return Ok(translation.to_string());
        }
        let reason = if self.is_common_term(text) {
            format!("'{}' has no offline entry for '{}'", text.trim(), target)
        } else {
            format!("no offline translation for '{}'", text.trim())
        };
        Err(TranslateError::Backend(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_dictionary_loads() {
        let dictionary = OfflineDictionary::bundled().unwrap();
        let mut languages: Vec<_> = dictionary.languages().collect();
        languages.sort();
        assert_eq!(languages, vec!["bn", "hi", "ta", "te"]);
        assert_eq!(dictionary.lookup("Book Now", "hi"), Some("अभी बुक करें"));
        assert_eq!(dictionary.lookup("Welcome", "ta"), Some("வரவேற்கிறோம்"));
    }

    #[test]
    fn test_lookup_trims_but_is_case_sensitive() {
        let dictionary = OfflineDictionary::bundled().unwrap();
        assert_eq!(dictionary.lookup("  Home ", "te"), Some("హోమ్"));
        assert_eq!(dictionary.lookup("home", "te"), None);
        assert_eq!(dictionary.lookup("Home", "ur"), None);
    }

    #[test]
    fn test_common_terms() {
        let dictionary = OfflineDictionary::bundled().unwrap();
        assert!(dictionary.is_common_term("Guests"));
        assert!(!dictionary.is_common_term("Mountain view cottage"));
    }

    #[tokio::test]
    async fn test_backend_miss_is_error() {
        let dictionary = OfflineDictionary::bundled().unwrap();
        assert_eq!(
            dictionary.translate("Price", "en", "bn").await.unwrap(),
            "দাম"
        );
        assert!(dictionary.translate("Sunset trek", "en", "bn").await.is_err());

        let missing_language = dictionary.translate("Price", "en", "ur").await.unwrap_err();
        assert!(missing_language.to_string().contains("no offline entry for 'ur'"));
    }

    #[test]
    fn test_custom_dictionary() {
        let dictionary =
            OfflineDictionary::from_json(r#"{ "mr": { "Village": "गाव" } }"#).unwrap();
        assert_eq!(dictionary.lookup("Village", "mr"), Some("गाव"));
        assert!(OfflineDictionary::from_json("[]").is_err());
    }
}
