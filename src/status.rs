//! Engine status snapshots and the user-facing tier indicator

use serde::Serialize;

/// Point-in-time view of which backends are usable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineStatus {
    pub is_initialized: bool,
    pub native_translation: bool,
    pub google_widget: bool,
    pub microsoft_translator: bool,
    pub online: bool,
    pub offline_dictionary: bool,
    /// Names of available backends, highest priority first
    pub available_methods: Vec<String>,
    pub cache_size: usize,
    pub active_translators: usize,
}

/// Which tier a status indicator should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusTier {
    /// Probes have not completed yet; not an error
    Loading,
    Native,
    /// Widget active and driving whole-page translation
    Page,
    Google,
    Microsoft,
    Online,
    Offline,
}

impl StatusTier {
    pub fn label(self) -> &'static str {
        match self {
            StatusTier::Loading => "Loading",
            StatusTier::Native => "Native",
            StatusTier::Page => "Page",
            StatusTier::Google => "Google",
            StatusTier::Microsoft => "Microsoft",
            StatusTier::Online => "Online",
            StatusTier::Offline => "Offline",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StatusTier::Loading => "Initializing translation engine...",
            StatusTier::Native => "Browser native translation (highest quality)",
            StatusTier::Page => "Page-level translation active",
            StatusTier::Google => "Google Translate integration",
            StatusTier::Microsoft => "Microsoft Translator",
            StatusTier::Online => "Online translation services",
            StatusTier::Offline => "No translation available",
        }
    }
}

impl std::fmt::Display for StatusTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl EngineStatus {
    pub fn tier(&self, page_translation: bool) -> StatusTier {
        if !self.is_initialized {
            StatusTier::Loading
        } else if self.native_translation {
            StatusTier::Native
        } else if self.google_widget {
            if page_translation {
                StatusTier::Page
            } else {
                StatusTier::Google
            }
        } else if self.microsoft_translator {
            StatusTier::Microsoft
        } else if self.online {
            StatusTier::Online
        } else {
            StatusTier::Offline
        }
    }
}
