//! Scripted capabilities for tests and offline runs.

use crate::error::{DublineError, Result};
use crate::languages::VoiceSelection;
use crate::media::{MediaPayload, data_uri};
use crate::stages::{CapabilityReply, SpeechAudio, SpeechToText, TextToSpeech, Translator};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
enum Behavior<T> {
    Reply(T),
    NoOutput(String),
    Fail,
}

impl<T: Clone> Behavior<T> {
    fn answer(&self, service: &str) -> Result<CapabilityReply<T>> {
        match self {
            Behavior::Reply(value) => Ok(CapabilityReply::Output(value.clone())),
            Behavior::NoOutput(reason) => Ok(CapabilityReply::no_output(reason.clone())),
            Behavior::Fail => Err(DublineError::capability(
                service,
                format!("mock {service} failure"),
            )),
        }
    }
}

fn record<T>(log: &Mutex<Vec<T>>, entry: T) {
    log.lock().unwrap_or_else(|e| e.into_inner()).push(entry);
}

fn snapshot<T: Clone>(log: &Mutex<Vec<T>>) -> Vec<T> {
    log.lock().unwrap_or_else(|e| e.into_inner()).clone()
}

/// Speech-to-text stand-in.
#[derive(Debug)]
pub struct MockSpeechToText {
    behavior: Behavior<String>,
    calls: AtomicUsize,
}

impl MockSpeechToText {
    pub fn new() -> Self {
        Self {
            behavior: Behavior::Reply("mock transcription".to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.behavior = Behavior::Reply(text.to_string());
        self
    }

    /// Answer without a transcript.
    pub fn with_no_output(mut self, reason: &str) -> Self {
        self.behavior = Behavior::NoOutput(reason.to_string());
        self
    }

    /// Fail as if the service were unreachable.
    pub fn with_failure(mut self) -> Self {
        self.behavior = Behavior::Fail;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockSpeechToText {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechToText for MockSpeechToText {
    async fn transcribe(&self, _media: &MediaPayload) -> Result<CapabilityReply<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.behavior.answer("mock-stt")
    }

    fn name(&self) -> &str {
        "mock-stt"
    }
}

/// Translation stand-in. Records every `(text, target_language)` it receives.
#[derive(Debug)]
pub struct MockTranslator {
    behavior: Behavior<String>,
    requests: Mutex<Vec<(String, String)>>,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self {
            behavior: Behavior::Reply("mock translation".to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.behavior = Behavior::Reply(text.to_string());
        self
    }

    pub fn with_no_output(mut self, reason: &str) -> Self {
        self.behavior = Behavior::NoOutput(reason.to_string());
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.behavior = Behavior::Fail;
        self
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        snapshot(&self.requests)
    }
}

impl Default for MockTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<CapabilityReply<String>> {
        record(
            &self.requests,
            (text.to_string(), target_language.to_string()),
        );
        self.behavior.answer("mock-translate")
    }

    fn name(&self) -> &str {
        "mock-translate"
    }
}

/// Text-to-speech stand-in. Records every `(text, voice)` it receives.
#[derive(Debug)]
pub struct MockTextToSpeech {
    behavior: Behavior<SpeechAudio>,
    requests: Mutex<Vec<(String, String)>>,
}

impl MockTextToSpeech {
    /// Answers with four bytes of silence.
    pub fn new() -> Self {
        Self {
            behavior: Behavior::Reply(pcm_audio(&[0u8; 4])),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer with raw PCM, wrapped the way the hosted service does.
    pub fn with_pcm(mut self, pcm: &[u8]) -> Self {
        self.behavior = Behavior::Reply(pcm_audio(pcm));
        self
    }

    pub fn with_data_uri(mut self, uri: impl Into<String>) -> Self {
        self.behavior = Behavior::Reply(SpeechAudio {
            data_uri: uri.into(),
        });
        self
    }

    pub fn with_no_output(mut self, reason: &str) -> Self {
        self.behavior = Behavior::NoOutput(reason.to_string());
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.behavior = Behavior::Fail;
        self
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        snapshot(&self.requests)
    }
}

impl Default for MockTextToSpeech {
    fn default() -> Self {
        Self::new()
    }
}

fn pcm_audio(pcm: &[u8]) -> SpeechAudio {
    SpeechAudio {
        data_uri: data_uri::encode("audio/L16;codec=pcm;rate=24000", pcm),
    }
}

#[async_trait]
impl TextToSpeech for MockTextToSpeech {
    async fn speak(
        &self,
        text: &str,
        voice: &VoiceSelection,
    ) -> Result<CapabilityReply<SpeechAudio>> {
        record(&self.requests, (text.to_string(), voice.to_string()));
        self.behavior.answer("mock-tts")
    }

    fn name(&self) -> &str {
        "mock-tts"
    }
}
