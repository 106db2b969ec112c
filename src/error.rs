use thiserror::Error;

/// Error types for the translation layer
///
/// None of these cross the [`TranslationContext`](crate::context::TranslationContext)
/// boundary: the engine turns every one of them into "show the original text" and a log
/// line. They exist so backends can say *why* they failed.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// No backend could be selected for the request
    #[error("no translation backend is available")]
    NoBackend,

    /// The backend was selected but reported itself unusable at call time
    #[error("{backend} is not available")]
    Unavailable { backend: String },

    /// The backend cannot perform this kind of request
    #[error("{backend} does not support {operation}")]
    Unsupported {
        backend: String,
        operation: &'static str,
    },

    /// The Google widget selector is missing or the script has not loaded
    #[error("translation widget not ready: {0}")]
    WidgetNotReady(String),

    /// Transport failure talking to a remote service
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A remote service answered, but not with a usable translation
    #[error("{service} returned an unusable response: {reason}")]
    InvalidResponse { service: String, reason: String },

    /// Backend-specific failure that does not fit elsewhere
    #[error("translation failed: {0}")]
    Backend(String),

    #[error("invalid language code: {0}")]
    InvalidLanguage(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("preference store error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TranslateError {
    pub fn invalid_response(service: &str, reason: impl Into<String>) -> Self {
        TranslateError::InvalidResponse {
            service: service.to_string(),
            reason: reason.into(),
        }
    }

    /// True for failures caused by a backend being absent rather than misbehaving
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            TranslateError::NoBackend
                | TranslateError::Unavailable { .. }
                | TranslateError::WidgetNotReady(_)
        )
    }
}

/// Result type for translation operations
pub type TranslateResult<T> = Result<T, TranslateError>;
