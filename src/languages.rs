//! Supported languages
//!
//! The table is static and its order is the display order used by language pickers.

use icu_locale::Locale;
use serde::Serialize;

use crate::error::{TranslateError, TranslateResult};

/// A language the application can be displayed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
    pub flag: &'static str,
}

#[rustfmt::skip]
pub const SUPPORTED_LANGUAGES: &[Language] = &[
    Language { code: "en", name: "English", native_name: "English", flag: "🇺🇸" },
    Language { code: "hi", name: "Hindi", native_name: "हिन्दी", flag: "🇮🇳" },
    Language { code: "bn", name: "Bengali", native_name: "বাংলা", flag: "🇧🇩" },
    Language { code: "te", name: "Telugu", native_name: "తెలుగు", flag: "🇮🇳" },
    Language { code: "mr", name: "Marathi", native_name: "मराठी", flag: "🇮🇳" },
    Language { code: "ta", name: "Tamil", native_name: "தமிழ்", flag: "🇮🇳" },
    Language { code: "gu", name: "Gujarati", native_name: "ગુજરાતી", flag: "🇮🇳" },
    Language { code: "kn", name: "Kannada", native_name: "ಕನ್ನಡ", flag: "🇮🇳" },
    Language { code: "ml", name: "Malayalam", native_name: "മലയാളം", flag: "🇮🇳" },
    Language { code: "or", name: "Odia", native_name: "ଓଡ଼ିଆ", flag: "🇮🇳" },
    Language { code: "pa", name: "Punjabi", native_name: "ਪੰਜਾਬੀ", flag: "🇮🇳" },
    Language { code: "as", name: "Assamese", native_name: "অসমীয়া", flag: "🇮🇳" },
    Language { code: "ur", name: "Urdu", native_name: "اردو", flag: "🇵🇰" },
    Language { code: "ne", name: "Nepali", native_name: "नेपाली", flag: "🇳🇵" },
    Language { code: "si", name: "Sinhala", native_name: "සිංහල", flag: "🇱🇰" },
];

/// Look up a supported language by its code
pub fn find_language(code: &str) -> Option<&'static Language> {
    SUPPORTED_LANGUAGES.iter().find(|lang| lang.code == code)
}

pub fn is_supported(code: &str) -> bool {
    find_language(code).is_some()
}

/// Comma separated list of every non-source code, as the widget expects it
pub fn widget_language_list(source_language: &str) -> String {
    SUPPORTED_LANGUAGES
        .iter()
        .filter(|lang| lang.code != source_language)
        .map(|lang| lang.code)
        .collect::<Vec<_>>()
        .join(",")
}

/// Normalize a language tag to its bare language subtag
///
/// - `hi-IN` → `hi`
/// - `EN` → `en`
/// - `zh_Hant` → `zh`
pub fn normalize_language(tag: &str) -> TranslateResult<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        return Err(TranslateError::InvalidLanguage(
            "language code is empty".to_string(),
        ));
    }
    let locale: Locale = trimmed
        .replace('_', "-")
        .parse()
        .map_err(|_| TranslateError::InvalidLanguage(trimmed.to_string()))?;
    Ok(locale.id.language.as_str().to_string())
}
