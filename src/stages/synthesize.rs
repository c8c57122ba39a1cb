use crate::audio::wav::{self, PcmFormat, WavAudio};
use crate::error::{DublineError, Result};
use crate::media::data_uri::{self, DataUriHeader};
use crate::stages::{CapabilityReply, SynthesisRequest, TextToSpeech};

/// Speak `request.text` with the selected voice and wrap the result as WAV.
///
/// The service answers with a data URI whose payload (after the first `,`)
/// is base64 raw PCM. `rate=` and `channels=` header parameters override the
/// mono 24 kHz 16-bit defaults. Nothing is written anywhere.
///
/// # Errors
///
/// [`DublineError::Synthesis`] when no audio came back or it cannot be decoded,
/// [`DublineError::Encoding`] when the advertised layout is unusable.
pub async fn synthesize(
    capability: &dyn TextToSpeech,
    request: &SynthesisRequest,
) -> Result<WavAudio> {
    tracing::debug!(
        service = capability.name(),
        voice = %request.voice,
        chars = request.text.chars().count(),
        "requesting speech"
    );

    let audio = match capability.speak(&request.text, &request.voice).await? {
        CapabilityReply::Output(audio) => audio,
        CapabilityReply::NoOutput { reason } => {
            return Err(DublineError::Synthesis {
                message: format!("no media returned: {}", reason),
            });
        }
    };

    let pcm = data_uri::decode_payload(&audio.data_uri).map_err(|e| DublineError::Synthesis {
        message: format!("audio payload is not valid base64: {}", e),
    })?;
    if pcm.is_empty() {
        return Err(DublineError::Synthesis {
            message: "no audio payload".to_string(),
        });
    }

    let format = pcm_format_for(&audio.data_uri);
    tracing::debug!(
        bytes = pcm.len(),
        sample_rate = format.sample_rate,
        channels = format.channels,
        "decoded speech"
    );

    wav::encode(&pcm, format)
}

/// PCM layout advertised by a data URI header, falling back to the defaults.
pub fn pcm_format_for(uri: &str) -> PcmFormat {
    let mut format = PcmFormat::default();
    let Some(header) = DataUriHeader::parse(uri) else {
        return format;
    };

    if let Some(rate) = header.param("rate").and_then(|r| r.parse::<u32>().ok()) {
        format.sample_rate = rate;
    }
    if let Some(channels) = header.param("channels").and_then(|c| c.parse::<u16>().ok()) {
        format.channels = channels;
    }
    format
}
