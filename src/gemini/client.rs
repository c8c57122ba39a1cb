use crate::config::ApiConfig;
use crate::error::{DublineError, Result};
use crate::gemini::types::{ApiErrorEnvelope, GenerateRequest, GenerateResponse};
use crate::languages::{VoiceSelection, language_label};
use crate::media::MediaPayload;
use crate::stages::{CapabilityReply, SpeechAudio, SpeechToText, TextToSpeech, Translator};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::CONTENT_TYPE;

const TRANSCRIBE_PROMPT: &str = "Transcribe the speech in the following recording into plain text. \
Return only the transcription without commentary or formatting.";

/// Client for the Generative Language API.
///
/// One instance serves all three capabilities; each uses its own model.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    transcription_model: String,
    translation_model: String,
    speech_model: String,
}

impl GeminiClient {
    /// Build a client from the `[api]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`DublineError::ConfigInvalidValue`] if no API key is configured.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| DublineError::ConfigInvalidValue {
                key: "api.api_key".to_string(),
                message: "not set (use DUBLINE_API_KEY or GEMINI_API_KEY)".to_string(),
            })?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| DublineError::capability("gemini", format!("client setup: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            transcription_model: config.transcription_model.clone(),
            translation_model: config.translation_model.clone(),
            speech_model: config.speech_model.clone(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    async fn generate(
        &self,
        service: &str,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse> {
        let body = serde_json::to_string(request).map_err(|e| {
            DublineError::capability(service, format!("failed to encode request: {e}"))
        })?;

        let response = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| DublineError::capability(service, e.to_string()))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            DublineError::capability(service, format!("failed to read response: {e}"))
        })?;

        if !status.is_success() {
            return Err(DublineError::capability(
                service,
                http_error_message(status.as_u16(), &text),
            ));
        }

        serde_json::from_str(&text).map_err(|e| {
            DublineError::capability(service, format!("failed to parse response: {e}"))
        })
    }
}

/// Status plus the API's own message when the body carries one.
fn http_error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => {
            format!("HTTP {}: {}", status, envelope.error.message)
        }
        _ => format!("HTTP {}", status),
    }
}

fn translate_prompt(text: &str, target_language: &str) -> String {
    format!(
        "Translate the following text into {}. Return only the translated text.\n\n{}",
        language_label(target_language),
        text
    )
}

#[async_trait]
impl SpeechToText for GeminiClient {
    async fn transcribe(&self, media: &MediaPayload) -> Result<CapabilityReply<String>> {
        let request = GenerateRequest::with_media(
            TRANSCRIBE_PROMPT.to_string(),
            media.mime_type(),
            STANDARD.encode(media.bytes()),
        );
        let response = self
            .generate("gemini transcription", &self.transcription_model, &request)
            .await?;
        Ok(response.text_reply())
    }

    fn name(&self) -> &str {
        &self.transcription_model
    }
}

#[async_trait]
impl Translator for GeminiClient {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<CapabilityReply<String>> {
        let request = GenerateRequest::text(translate_prompt(text, target_language), 0.2);
        let response = self
            .generate("gemini translation", &self.translation_model, &request)
            .await?;
        Ok(response.text_reply())
    }

    fn name(&self) -> &str {
        &self.translation_model
    }
}

#[async_trait]
impl TextToSpeech for GeminiClient {
    async fn speak(
        &self,
        text: &str,
        voice: &VoiceSelection,
    ) -> Result<CapabilityReply<SpeechAudio>> {
        let request = GenerateRequest::speech(text.to_string(), voice.as_str());
        let response = self
            .generate("gemini speech", &self.speech_model, &request)
            .await?;
        Ok(response.audio_reply())
    }

    fn name(&self) -> &str {
        &self.speech_model
    }
}
