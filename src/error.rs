use thiserror::Error;

/// Failures surfaced by a clip request.
#[derive(Debug, Clone, Error)]
pub enum ClipError {
    /// Rejected locally before any request was made
    #[error("{0}")]
    Validation(String),

    /// The AI service was unreachable, rejected the call, or returned garbage
    #[error("AI service error: {0}")]
    Service(String),

    /// The response parsed but does not have the clip shape
    #[error("invalid response shape: {0}")]
    Format(String),
}

impl ClipError {
    pub fn service(cause: impl std::fmt::Display) -> Self {
        ClipError::Service(cause.to_string())
    }

    pub fn format(cause: impl std::fmt::Display) -> Self {
        ClipError::Format(cause.to_string())
    }
}

impl From<reqwest::Error> for ClipError {
    fn from(e: reqwest::Error) -> Self {
        ClipError::Service(e.to_string())
    }
}

/// Startup configuration problems; the binary refuses to run on any of these.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API key not set: export GEMINI_API_KEY (or API_KEY) before running")]
    MissingApiKey,

    #[error("failed to read config file {path}: {reason}")]
    Unreadable { path: String, reason: String },
}
