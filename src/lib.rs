//! Translation orchestration for VillageStay
//!
//! This crate decides, at run time, how interface text gets translated into one of the
//! supported Indian and South Asian languages. It probes a prioritized list of backends,
//! caches results for the session, deduplicates batch work, and never lets a failure
//! reach the user interface: the worst case is the original English text.
//!
//! # Overview
//!
//! 1. **Backends** - native host translation, the Google page widget, Microsoft
//!    Translator, a chain of public web services and a bundled offline dictionary
//! 2. **Engine** - backend selection, session cache, batch deduplication and chunking
//! 3. **Context** - current language, persisted preference, page vs element mode
//! 4. **Hooks** - per-component translated state that follows the current language
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use villagestay_translate::{
//!     HostEnvironment, MemoryPreferences, TranslationConfig, TranslationContext,
//!     TranslationEngine,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TranslationConfig::from_env()?;
//!     let engine = TranslationEngine::from_config(&config, HostEnvironment::default())?;
//!     let ctx = TranslationContext::new(Arc::new(engine), Arc::new(MemoryPreferences::new())).await;
//!
//!     ctx.change_language("hi").await;
//!     println!("{}", ctx.translate_text("Book Now").await);
//!     Ok(())
//! }
//! ```
pub mod backend;
pub mod cache;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod languages;
pub mod mock;
pub mod preferences;
pub mod status;

pub use backend::{BackendKind, Capabilities, Connectivity, TranslationBackend};
pub use cache::{CacheStats, TranslationCache};
pub use config::{FallbackPolicy, TranslationConfig};
pub use context::{LanguageChange, TranslationContext};
pub use engine::{BatchOutcome, HostEnvironment, TranslationEngine, is_translatable};
pub use error::{TranslateError, TranslateResult};
pub use hooks::{HookState, TranslatedContent, TranslatedItems, TranslationRequest};
pub use languages::{Language, SUPPORTED_LANGUAGES, find_language, normalize_language};
pub use mock::{MockBackend, MockMode};
pub use preferences::{FilePreferences, MemoryPreferences, PreferenceStore};
pub use status::{EngineStatus, StatusTier};
