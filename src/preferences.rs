//! Persisted language preference

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::TranslateResult;

pub const DEFAULT_PREFERENCE_KEY: &str = "villagestay_language";

/// Where the selected language survives restarts
pub trait PreferenceStore: Send + Sync {
    fn load_language(&self) -> TranslateResult<Option<String>>;
    fn save_language(&self, code: &str) -> TranslateResult<()>;
}

/// Keeps the preference for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    language: Mutex<Option<String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(code: impl Into<String>) -> Self {
        Self {
            language: Mutex::new(Some(code.into())),
        }
    }
}

impl PreferenceStore for MemoryPreferences {
    fn load_language(&self) -> TranslateResult<Option<String>> {
        Ok(self
            .language
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn save_language(&self, code: &str) -> TranslateResult<()> {
        *self
            .language
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(code.to_string());
        Ok(())
    }
}

/// A flat JSON object on disk, one key per preference
///
/// Other keys in the file are preserved on save.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
    key: String,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_key(path, DEFAULT_PREFERENCE_KEY)
    }

    pub fn with_key(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> TranslateResult<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }
}

impl PreferenceStore for FilePreferences {
    fn load_language(&self) -> TranslateResult<Option<String>> {
        let entries = self.read_all()?;
        Ok(entries
            .get(&self.key)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn save_language(&self, code: &str) -> TranslateResult<()> {
        let mut entries = self.read_all()?;
        entries.insert(self.key.clone(), Value::String(code.to_string()));
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        debug!("Saved language '{}' to {}", code, self.path.display());
        Ok(())
    }
}
