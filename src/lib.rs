//! dubline - Translate the speech in a video into another language
//!
//! Transcribes uploaded media, translates the transcript, re-voices it with a
//! hosted text-to-speech service and wraps the result as WAV.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
#[cfg(feature = "http")]
pub mod gemini;
pub mod history;
pub mod languages;
pub mod media;
#[cfg(feature = "cli")]
pub mod output;
pub mod pipeline;
pub mod stages;
pub mod transcript;

// Capabilities (transcribe → translate → synthesize)
pub use stages::{CapabilityReply, SpeechAudio, SpeechToText, TextToSpeech, Translator};

// Pipeline
pub use pipeline::{
    CompletedRun, Pipeline, PipelineFailure, PipelineRequest, PipelineResult, PipelineState,
    Stage,
};

// Audio
pub use audio::{PcmFormat, WavAudio};

// Error handling
pub use error::{DublineError, PersistenceError, Result};

// Config
pub use config::Config;

// Collaborators
pub use history::{HistoryEntry, HistoryRecord, HistoryStore};
pub use languages::{VoiceGender, VoiceSelection, resolve_voice};
pub use media::MediaPayload;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
