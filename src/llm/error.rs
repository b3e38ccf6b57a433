//! Error types for completion generation.

use thiserror::Error;

/// Errors that can occur while generating a completion remotely.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The backend could not be reached at all.
    ///
    /// Raised before a request is attempted, when the availability probe
    /// fails.
    #[error("completion backend is not available")]
    BackendUnavailable,

    /// The HTTP request to the backend failed.
    #[cfg(feature = "ollama")]
    #[error("completion request failed")]
    Transport(#[from] reqwest::Error),

    /// A backend-specific failure, with the backend's own message.
    #[error("{0}")]
    Backend(String),
}

impl GenerationError {
    /// Returns `true` if the error was a request timeout.
    ///
    /// Timeouts are the one transport failure worth retrying; everything
    /// else is surfaced to the caller on the first attempt.
    pub fn is_timeout(&self) -> bool {
        match self {
            #[cfg(feature = "ollama")]
            GenerationError::Transport(err) => err.is_timeout(),
            _ => false,
        }
    }
}

/// A specialized `Result` type for completion generation.
pub type Result<T> = std::result::Result<T, GenerationError>;
