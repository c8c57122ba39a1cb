//! WAV container encoding for synthesized speech.
//!
//! Wraps raw little-endian linear PCM in a canonical 44-byte RIFF/WAVE header.
//! Sample bytes are copied verbatim; nothing is resampled or re-quantized.

use crate::defaults::{CHANNELS, SAMPLE_RATE, SAMPLE_WIDTH_BYTES, WAV_HEADER_LEN, WAV_MIME};
use crate::error::{DublineError, Result};
use crate::media::data_uri;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

/// Layout of a raw PCM byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub channels: u16,
    pub sample_rate: u32,
    pub sample_width_bytes: u16,
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self {
            channels: CHANNELS,
            sample_rate: SAMPLE_RATE,
            sample_width_bytes: SAMPLE_WIDTH_BYTES,
        }
    }
}

impl PcmFormat {
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.channels as u32 * self.sample_width_bytes as u32
    }

    pub fn block_align(&self) -> u16 {
        self.channels * self.sample_width_bytes
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.sample_width_bytes * 8
    }

    fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(DublineError::Encoding {
                message: "channel count must be positive".to_string(),
            });
        }
        if self.sample_width_bytes == 0 {
            return Err(DublineError::Encoding {
                message: "sample width must be positive".to_string(),
            });
        }
        let byte_rate =
            self.sample_rate as u64 * self.channels as u64 * self.sample_width_bytes as u64;
        if self.sample_width_bytes > u16::MAX / 8
            || self.channels.checked_mul(self.sample_width_bytes).is_none()
            || byte_rate > u32::MAX as u64
        {
            return Err(DublineError::Encoding {
                message: format!(
                    "unsupported layout: {} channel(s) of {} byte(s)",
                    self.channels, self.sample_width_bytes
                ),
            });
        }
        Ok(())
    }
}

/// A complete, playable WAV byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavAudio {
    bytes: Vec<u8>,
}

/// Header fields read back from an encoded WAV.
#[derive(Debug, Clone, PartialEq)]
pub struct WavInfo {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub frames: u32,
    pub duration: Duration,
}

impl WavInfo {
    /// Header summary for `data_len` payload bytes in `format`.
    ///
    /// A trailing partial frame counts toward the duration but not the frame count.
    pub fn for_payload(format: PcmFormat, data_len: usize) -> Self {
        let block_align =
            (format.channels as usize * format.sample_width_bytes as usize).max(1);
        let byte_rate = format.sample_rate as f64 * block_align as f64;
        let duration = if byte_rate == 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(data_len as f64 / byte_rate)
        };

        Self {
            channels: format.channels,
            sample_rate: format.sample_rate,
            bits_per_sample: format.sample_width_bytes.saturating_mul(8),
            frames: u32::try_from(data_len / block_align).unwrap_or(u32::MAX),
            duration,
        }
    }
}

impl WavAudio {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false: even an empty recording carries its header.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Length of the PCM payload following the header.
    pub fn data_len(&self) -> usize {
        self.bytes.len().saturating_sub(WAV_HEADER_LEN)
    }

    /// `data:audio/wav;base64,<payload>`
    pub fn to_data_uri(&self) -> String {
        data_uri::encode(WAV_MIME, &self.bytes)
    }

    /// Parse the header back with a real WAV reader.
    pub fn inspect(&self) -> Result<WavInfo> {
        let reader = hound::WavReader::new(Cursor::new(self.bytes.as_slice())).map_err(|e| {
            DublineError::Encoding {
                message: format!("Failed to parse WAV header: {}", e),
            }
        })?;
        let spec = reader.spec();
        let frames = reader.duration();
        let duration = if spec.sample_rate == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(frames as f64 / spec.sample_rate as f64)
        };

        Ok(WavInfo {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            frames,
            duration,
        })
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

impl AsRef<[u8]> for WavAudio {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Wrap the raw PCM file at `raw` and write the WAV to `output`.
///
/// The returned summary comes from `format`, so payloads that end in a
/// partial frame are still described.
pub fn encode_file(raw: &Path, output: &Path, format: PcmFormat) -> Result<WavInfo> {
    let samples = std::fs::read(raw)?;
    let wav = encode(&samples, format)?;
    wav.write_to(output)?;
    Ok(WavInfo::for_payload(format, wav.data_len()))
}

/// Encode raw PCM with the synthesis defaults (mono, 24 kHz, 16-bit).
pub fn encode_default(samples: &[u8]) -> Result<WavAudio> {
    encode(samples, PcmFormat::default())
}

/// Wrap raw PCM bytes in a RIFF/WAVE container.
///
/// The output is always `44 + samples.len()` bytes long. Empty input yields a
/// valid header with a zero-length data chunk.
///
/// # Errors
///
/// Returns [`DublineError::Encoding`] if the channel count or sample width is
/// zero, or if the payload does not fit a 32-bit RIFF size field.
pub fn encode(samples: &[u8], format: PcmFormat) -> Result<WavAudio> {
    format.validate()?;

    let data_len = u32::try_from(samples.len())
        .ok()
        .filter(|len| *len <= u32::MAX - 36)
        .ok_or_else(|| DublineError::Encoding {
            message: format!("{} bytes of PCM exceed the WAV size limit", samples.len()),
        })?;

    let mut bytes = Vec::with_capacity(WAV_HEADER_LEN + samples.len());

    // RIFF header
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");

    // fmt chunk
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&format.channels.to_le_bytes());
    bytes.extend_from_slice(&format.sample_rate.to_le_bytes());
    bytes.extend_from_slice(&format.byte_rate().to_le_bytes());
    bytes.extend_from_slice(&format.block_align().to_le_bytes());
    bytes.extend_from_slice(&format.bits_per_sample().to_le_bytes());

    // data chunk
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.extend_from_slice(samples);

    Ok(WavAudio { bytes })
}
