//! Error types for dubline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DublineError {
    // WAV container errors
    #[error("WAV encoding failed: {message}")]
    Encoding { message: String },

    // Stage errors: the external capability returned nothing usable
    #[error("Transcription error: {message}")]
    Transcription { message: String },

    #[error("Translation error: {message}")]
    Translation { message: String },

    #[error("Speech synthesis error: {message}")]
    Synthesis { message: String },

    // History persistence (never fatal to a pipeline run)
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    // Transport-level failure talking to a hosted service
    #[error("{service} request failed: {message}")]
    Capability { service: String, message: String },

    // Caller-side input errors
    #[error("Invalid media: {message}")]
    InvalidMedia { message: String },

    #[error("Voice selection must not be empty")]
    InvalidVoice,

    // Configuration errors
    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DublineError {
    /// Build a transport error for the named service.
    pub fn capability(service: &str, message: impl Into<String>) -> Self {
        Self::Capability {
            service: service.to_string(),
            message: message.into(),
        }
    }
}

/// Failures reported by the history store.
///
/// Permission problems are kept apart from everything else so a caller can
/// tell "not allowed" from "try again later".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Missing or insufficient permissions for {operation} on {path}")]
    PermissionDenied { path: String, operation: String },

    #[error("history store unavailable: {message}")]
    Unavailable { message: String },
}

impl PersistenceError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, PersistenceError::PermissionDenied { .. })
    }
}

pub type Result<T> = std::result::Result<T, DublineError>;
