//! The three externally delegated stages: transcribe, translate, synthesize.
//!
//! Each hosted service sits behind a capability trait that answers with a
//! [`CapabilityReply`]. The stage functions turn a reply into the next
//! stage's input, or into the stage's typed error when nothing usable came back.

pub mod mock;
pub mod synthesize;
pub mod transcribe;
pub mod translate;

use crate::error::Result;
use crate::languages::VoiceSelection;
use crate::media::MediaPayload;
use async_trait::async_trait;
use std::sync::Arc;

pub use mock::{MockSpeechToText, MockTextToSpeech, MockTranslator};
pub use synthesize::synthesize;
pub use transcribe::transcribe;
pub use translate::translate;

/// Answer from a hosted capability that was reached successfully.
///
/// Transport failures are reported as `Err` by the capability itself; this
/// type only distinguishes real output from an answer without any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityReply<T> {
    Output(T),
    NoOutput { reason: String },
}

impl<T> CapabilityReply<T> {
    pub fn no_output(reason: impl Into<String>) -> Self {
        CapabilityReply::NoOutput {
            reason: reason.into(),
        }
    }

    pub fn into_output(self) -> std::result::Result<T, String> {
        match self {
            CapabilityReply::Output(value) => Ok(value),
            CapabilityReply::NoOutput { reason } => Err(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionResult {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub source_text: String,
    pub target_language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub translated_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: VoiceSelection,
}

/// Audio returned by a speech service, as a data URI.
///
/// Typically `data:audio/L16;codec=pcm;rate=24000;base64,<pcm>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    pub data_uri: String,
}

/// Hosted speech-to-text.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, media: &MediaPayload) -> Result<CapabilityReply<String>>;

    /// Service name for logging.
    fn name(&self) -> &str;
}

/// Hosted text translation.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str)
    -> Result<CapabilityReply<String>>;

    fn name(&self) -> &str;
}

/// Hosted text-to-speech.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    async fn speak(
        &self,
        text: &str,
        voice: &VoiceSelection,
    ) -> Result<CapabilityReply<SpeechAudio>>;

    fn name(&self) -> &str;
}

/// Implement the capability traits for `Arc<T>` so one client can serve several pipelines.
#[async_trait]
impl<T: SpeechToText + ?Sized> SpeechToText for Arc<T> {
    async fn transcribe(&self, media: &MediaPayload) -> Result<CapabilityReply<String>> {
        (**self).transcribe(media).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: Translator + ?Sized> Translator for Arc<T> {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<CapabilityReply<String>> {
        (**self).translate(text, target_language).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: TextToSpeech + ?Sized> TextToSpeech for Arc<T> {
    async fn speak(
        &self,
        text: &str,
        voice: &VoiceSelection,
    ) -> Result<CapabilityReply<SpeechAudio>> {
        (**self).speak(text, voice).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_into_output() {
        let ok: CapabilityReply<u8> = CapabilityReply::Output(3);
        assert_eq!(ok.into_output(), Ok(3));

        let none: CapabilityReply<u8> = CapabilityReply::no_output("blocked");
        assert_eq!(none.into_output(), Err("blocked".to_string()));
    }

    #[tokio::test]
    async fn capability_traits_are_object_safe() {
        let stt: Arc<dyn SpeechToText> = Arc::new(MockSpeechToText::new().with_text("boxed"));
        let media = MediaPayload::new("a.mp4", "video/mp4", vec![1]);

        let reply = stt.transcribe(&media).await.unwrap();
        assert_eq!(reply, CapabilityReply::Output("boxed".to_string()));
        assert_eq!(stt.name(), "mock-stt");
    }
}
