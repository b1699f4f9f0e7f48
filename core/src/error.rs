use thiserror::Error;

/// Failures reported by an agent session.
///
/// Provider failures are passed through unchanged; the core never retries
/// or downgrades them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The session was disposed by its owner. Capturing a turn on it is a
    /// programming error.
    #[error("session is disposed")]
    Disposed,
    /// The provider failed while producing the response.
    #[error("provider failure: {message}")]
    Provider { message: String },
    /// A recorded transcript could not be read or parsed.
    #[error("invalid transcript: {0}")]
    Transcript(String),
}

impl SessionError {
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Machine-readable error code (e.g. "session_disposed")
    pub fn code(&self) -> &'static str {
        match self {
            Self::Disposed => codes::SESSION_DISPOSED,
            Self::Provider { .. } => codes::PROVIDER_FAILURE,
            Self::Transcript(_) => codes::INVALID_TRANSCRIPT,
        }
    }
}

/// Failure of a single captured turn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl CaptureError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Session(err) => err.code(),
        }
    }
}

/// Error codes shared by the runtime and the CLI
pub mod codes {
    pub const SESSION_DISPOSED: &str = "session_disposed";
    pub const PROVIDER_FAILURE: &str = "provider_failure";
    pub const INVALID_TRANSCRIPT: &str = "invalid_transcript";
    pub const LOCAL_TOOLS_USED: &str = "local_tools_used";
    pub const CAPABILITY_REPORTED_UNAVAILABLE: &str = "capability_reported_unavailable";
    pub const FALLBACK_LANGUAGE_DETECTED: &str = "fallback_language_detected";
    pub const NO_SOURCES_CITED: &str = "no_sources_cited";
}
