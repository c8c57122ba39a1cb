use crate::error::{DublineError, Result};
use crate::media::MediaPayload;
use crate::stages::{CapabilityReply, SpeechToText, TranscriptionResult};

/// Transcribe the speech in an uploaded video.
///
/// One call, no retry. Size limits are the caller's business; only the MIME
/// type is checked here.
///
/// # Errors
///
/// [`DublineError::InvalidMedia`] when the payload is not audio/video,
/// [`DublineError::Transcription`] when the service produced no transcript,
/// or whatever transport error the capability reported.
pub async fn transcribe(
    capability: &dyn SpeechToText,
    media: &MediaPayload,
) -> Result<TranscriptionResult> {
    if !media.is_audio_or_video() {
        return Err(DublineError::InvalidMedia {
            message: format!(
                "{} has MIME type {}, expected audio/* or video/*",
                media.name(),
                media.mime_type()
            ),
        });
    }

    tracing::debug!(
        service = capability.name(),
        media = media.name(),
        bytes = media.len(),
        "requesting transcript"
    );

    match capability.transcribe(media).await? {
        CapabilityReply::Output(text) => Ok(TranscriptionResult { text }),
        CapabilityReply::NoOutput { reason } => Err(DublineError::Transcription {
            message: format!("no transcript produced: {}", reason),
        }),
    }
}
