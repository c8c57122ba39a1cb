//! Uploaded media handed to the transcription stage.

pub mod data_uri;

use crate::error::{DublineError, Result};
use std::path::Path;

/// File extensions the CLI recognizes, with their MIME types.
const KNOWN_EXTENSIONS: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("m4v", "video/x-m4v"),
    ("mov", "video/quicktime"),
    ("webm", "video/webm"),
    ("mkv", "video/x-matroska"),
    ("avi", "video/x-msvideo"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("m4a", "audio/mp4"),
    ("ogg", "audio/ogg"),
    ("flac", "audio/flac"),
];

/// An uploaded video (or audio) file. Immutable once captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPayload {
    name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl MediaPayload {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, inferring the MIME type from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mime_type = mime_from_extension(path).ok_or_else(|| DublineError::InvalidMedia {
            message: format!("unrecognized media type: {}", path.display()),
        })?;
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(name, mime_type, bytes))
    }

    /// Original file name, recorded in translation history.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_audio_or_video(&self) -> bool {
        let mime = self.mime_type.to_ascii_lowercase();
        mime.starts_with("video/") || mime.starts_with("audio/")
    }

    /// Upload checks a caller runs before starting the pipeline.
    ///
    /// Rejects empty payloads, non audio/video types and anything above `max_bytes`.
    pub fn check_upload(&self, max_bytes: u64) -> Result<()> {
        if self.is_empty() {
            return Err(DublineError::InvalidMedia {
                message: format!("{} is empty", self.name),
            });
        }
        if !self.is_audio_or_video() {
            return Err(DublineError::InvalidMedia {
                message: format!("{} is not audio or video ({})", self.name, self.mime_type),
            });
        }
        if self.len() as u64 > max_bytes {
            return Err(DublineError::InvalidMedia {
                message: format!(
                    "{} is {} bytes, larger than the {} byte limit",
                    self.name,
                    self.len(),
                    max_bytes
                ),
            });
        }
        Ok(())
    }

    pub fn to_data_uri(&self) -> String {
        data_uri::encode(&self.mime_type, &self.bytes)
    }
}

/// MIME type for a known media file extension (case-insensitive).
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    KNOWN_EXTENSIONS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}
