//! Wire types for `models/{model}:generateContent`.

use crate::stages::{CapabilityReply, SpeechAudio};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

impl GenerateRequest {
    /// Single-turn text prompt.
    pub fn text(prompt: String, temperature: f32) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part::Text { text: prompt }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(temperature),
                ..Default::default()
            }),
        }
    }

    /// Prompt followed by inline binary media.
    pub fn with_media(prompt: String, mime_type: &str, base64_data: String) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: prompt },
                    Part::InlineData {
                        inline_data: Blob {
                            mime_type: mime_type.to_string(),
                            data: base64_data,
                        },
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.0),
                ..Default::default()
            }),
        }
    }

    /// Audio-only response spoken with a prebuilt voice.
    pub fn speech(text: String, voice_name: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part::Text { text }],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice_name.to_string(),
                        },
                    },
                }),
                ..Default::default()
            }),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    pub text: Option<String>,
    pub inline_data: Option<Blob>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

/// Google API error envelope.
#[derive(Debug, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
}

impl GenerateResponse {
    fn first_parts(&self) -> Result<&[ResponsePart], String> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(format!("request blocked: {}", reason));
        }

        let candidate = self
            .candidates
            .first()
            .ok_or_else(|| "empty candidate list".to_string())?;

        match &candidate.content {
            Some(content) if !content.parts.is_empty() => Ok(&content.parts),
            _ => Err(format!(
                "candidate has no content (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )),
        }
    }

    /// Concatenated text of the first candidate.
    pub fn text_reply(&self) -> CapabilityReply<String> {
        let parts = match self.first_parts() {
            Ok(parts) => parts,
            Err(reason) => return CapabilityReply::no_output(reason),
        };

        let texts: Vec<&str> = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if texts.is_empty() {
            return CapabilityReply::no_output("response contains no text");
        }
        CapabilityReply::Output(texts.concat().trim().to_string())
    }

    /// First inline audio blob of the first candidate, as a data URI.
    pub fn audio_reply(&self) -> CapabilityReply<SpeechAudio> {
        let parts = match self.first_parts() {
            Ok(parts) => parts,
            Err(reason) => return CapabilityReply::no_output(reason),
        };

        match parts.iter().find_map(|p| p.inline_data.as_ref()) {
            Some(blob) if !blob.data.is_empty() => CapabilityReply::Output(SpeechAudio {
                data_uri: format!("data:{};base64,{}", blob.mime_type, blob.data),
            }),
            _ => CapabilityReply::no_output("no media returned"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_text_request_shape() {
        let request = GenerateRequest::text("Translate".to_string(), 0.2);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["parts"][0]["text"], "Translate");
        let temperature = json["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.2).abs() < 1e-6);
        assert!(json["generationConfig"].get("speechConfig").is_none());
    }

    #[test]
    fn test_media_request_shape() {
        let request =
            GenerateRequest::with_media("Transcribe".to_string(), "video/mp4", "AAAA".to_string());
        let json = serde_json::to_value(&request).unwrap();

        let media = &json["contents"][0]["parts"][1]["inlineData"];
        assert_eq!(media["mimeType"], "video/mp4");
        assert_eq!(media["data"], "AAAA");
    }

    #[test]
    fn test_speech_request_shape() {
        let request = GenerateRequest::speech("Hola".to_string(), "Achernar");
        let json = serde_json::to_value(&request).unwrap();
        let config = &json["generationConfig"];

        assert_eq!(config["responseModalities"][0], "AUDIO");
        assert_eq!(
            config["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Achernar"
        );
        assert!(config.get("temperature").is_none());
    }

    #[test]
    fn test_text_reply_joins_parts() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"Hola "},{"text":"mundo\n"}],"role":"model"},"finishReason":"STOP"}]}"#,
        );
        assert_eq!(
            response.text_reply(),
            CapabilityReply::Output("Hola mundo".to_string())
        );
    }

    #[test]
    fn test_text_reply_blocked_prompt() {
        let response = parse(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#);
        assert_eq!(
            response.text_reply(),
            CapabilityReply::no_output("request blocked: SAFETY")
        );
    }

    #[test]
    fn test_text_reply_no_candidates() {
        assert_eq!(
            parse("{}").text_reply(),
            CapabilityReply::no_output("empty candidate list")
        );
    }

    #[test]
    fn test_text_reply_candidate_without_content() {
        let response = parse(r#"{"candidates":[{"finishReason":"MAX_TOKENS"}]}"#);
        match response.text_reply() {
            CapabilityReply::NoOutput { reason } => assert!(reason.contains("MAX_TOKENS")),
            other => panic!("Expected NoOutput, got {:?}", other),
        }
    }

    #[test]
    fn test_audio_reply_builds_data_uri() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"audio/L16;codec=pcm;rate=24000","data":"AAEC"}}]}}]}"#,
        );
        assert_eq!(
            response.audio_reply(),
            CapabilityReply::Output(SpeechAudio {
                data_uri: "data:audio/L16;codec=pcm;rate=24000;base64,AAEC".to_string()
            })
        );
    }

    #[test]
    fn test_audio_reply_text_only_is_no_output() {
        let response = parse(r#"{"candidates":[{"content":{"parts":[{"text":"sorry"}]}}]}"#);
        assert_eq!(
            response.audio_reply(),
            CapabilityReply::no_output("no media returned")
        );
    }
}
