//! Default configuration constants for dubline.
//!
//! Shared by the WAV encoder, the speech synthesis stage, the config loader
//! and the CLI so the defaults live in one place.

/// Sample rate of the raw PCM returned by the speech synthesis service.
pub const SAMPLE_RATE: u32 = 24000;

/// Channel count of synthesized speech (mono).
pub const CHANNELS: u16 = 1;

/// Bytes per sample of synthesized speech (16-bit little-endian PCM).
pub const SAMPLE_WIDTH_BYTES: u16 = 2;

/// Size of the canonical RIFF/WAVE header written by the encoder.
pub const WAV_HEADER_LEN: usize = 44;

/// MIME type of the encoded output audio.
pub const WAV_MIME: &str = "audio/wav";

/// Voice used when a language/gender choice does not resolve.
pub const DEFAULT_VOICE: &str = "Algenib";

/// Target language preselected for new runs.
pub const DEFAULT_TARGET_LANGUAGE: &str = "es";

/// Largest upload the CLI accepts before running the pipeline.
pub const MAX_UPLOAD_MB: u64 = 50;

/// Request timeout for hosted services, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Hosted generative API used for all three stages.
pub const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const TRANSCRIPTION_MODEL: &str = "gemini-2.5-flash";
pub const TRANSLATION_MODEL: &str = "gemini-2.5-flash";
pub const SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";

/// Document database REST endpoint for translation history.
pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Width used when wrapping the formatted transcript.
pub const TRANSCRIPT_WIDTH: usize = 80;
