//! Session-scoped translation cache
//!
//! Entries are keyed by the exact source text and the target language code. Nothing
//! expires: an entry stays valid for the life of the process, even across backend
//! changes.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
pub struct TranslationCache {
    // language -> source text -> translation
    entries: RwLock<HashMap<String, HashMap<String, String>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, text: &str, language: &str) -> Option<String> {
        let found = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(language)
            .and_then(|by_text| by_text.get(text))
            .cloned();
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    pub fn insert(&self, text: &str, language: &str, translation: String) {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(language.to_string())
            .or_default()
            .insert(text.to_string(), translation);
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .map(HashMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let cache = TranslationCache::new();
        cache.insert("Welcome", "hi", "स्वागत".to_string());
        assert_eq!(cache.get("Welcome", "hi").as_deref(), Some("स्वागत"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_key_includes_language() {
        let cache = TranslationCache::new();
        cache.insert("Welcome", "hi", "स्वागत".to_string());
        cache.insert("Welcome", "ta", "வரவேற்கிறோம்".to_string());
        assert_eq!(cache.get("Welcome", "ta").as_deref(), Some("வரவேற்கிறோம்"));
        assert!(cache.get("Welcome", "bn").is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_exact_match_only() {
        let cache = TranslationCache::new();
        cache.insert("Welcome", "hi", "स्वागत".to_string());
        assert!(cache.get("welcome", "hi").is_none());
        assert!(cache.get("Welcome ", "hi").is_none());
    }

    #[test]
    fn test_stats_count_hits_and_misses() {
        let cache = TranslationCache::new();
        cache.insert("Host", "hi", "होस्ट".to_string());
        cache.get("Host", "hi");
        cache.get("Host", "hi");
        cache.get("Guest", "hi");
        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_clear() {
        let cache = TranslationCache::new();
        cache.insert("Host", "hi", "होस्ट".to_string());
        cache.clear();
        assert!(cache.is_empty());
    }
}
