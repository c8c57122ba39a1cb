//! `data:` URI helpers.
//!
//! Hosted services exchange binary media as `data:<mime>[;param=value]*;base64,<payload>`.

use base64::{Engine as _, engine::general_purpose::STANDARD};

/// Build `data:<mime>;base64,<payload>`.
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Everything after the first `,`, or the whole input when there is none.
pub fn payload_after_separator(uri: &str) -> &str {
    match uri.find(',') {
        Some(idx) => &uri[idx + 1..],
        None => uri,
    }
}

/// Decode the base64 payload portion of a data URI.
pub fn decode_payload(uri: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(payload_after_separator(uri).trim())
}

/// Header portion of a data URI, e.g. `audio/L16;codec=pcm;rate=24000;base64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUriHeader<'a> {
    pub mime_type: &'a str,
    params: Vec<(&'a str, &'a str)>,
    pub base64: bool,
}

impl<'a> DataUriHeader<'a> {
    /// Parse the header of `uri`. Returns `None` unless it starts with `data:` and has a `,`.
    pub fn parse(uri: &'a str) -> Option<Self> {
        let rest = uri.strip_prefix("data:")?;
        let header = &rest[..rest.find(',')?];

        let mut parts = header.split(';');
        let mime_type = parts.next().unwrap_or_default().trim();
        let mut params = Vec::new();
        let mut base64 = false;
        for part in parts {
            let part = part.trim();
            if part.eq_ignore_ascii_case("base64") {
                base64 = true;
            } else if let Some((key, value)) = part.split_once('=') {
                params.push((key.trim(), value.trim()));
            }
        }

        Some(Self {
            mime_type,
            params,
            base64,
        })
    }

    /// Case-insensitive lookup of a `key=value` parameter.
    pub fn param(&self, name: &str) -> Option<&'a str> {
        self.params
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_produces_base64_uri() {
        assert_eq!(encode("text/plain", b"hi"), "data:text/plain;base64,aGk=");
    }

    #[test]
    fn payload_after_first_comma_only() {
        assert_eq!(payload_after_separator("data:x;base64,AAA,BBB"), "AAA,BBB");
    }

    #[test]
    fn payload_without_separator_is_whole_input() {
        assert_eq!(payload_after_separator("AAAA"), "AAAA");
    }

    #[test]
    fn decode_payload_round_trips_encode() {
        let uri = encode("audio/wav", &[0, 1, 2, 255]);
        assert_eq!(decode_payload(&uri).unwrap(), vec![0, 1, 2, 255]);
    }

    #[test]
    fn decode_payload_rejects_garbage() {
        assert!(decode_payload("data:audio/wav;base64,@@@").is_err());
    }

    #[test]
    fn header_parses_pcm_params() {
        let header =
            DataUriHeader::parse("data:audio/L16;codec=pcm;rate=24000;base64,AAAA").unwrap();
        assert_eq!(header.mime_type, "audio/L16");
        assert_eq!(header.param("codec"), Some("pcm"));
        assert_eq!(header.param("RATE"), Some("24000"));
        assert_eq!(header.param("channels"), None);
        assert!(header.base64);
    }

    #[test]
    fn header_requires_data_scheme() {
        assert!(DataUriHeader::parse("audio/wav;base64,AAAA").is_none());
        assert!(DataUriHeader::parse("data:audio/wav;base64").is_none());
    }
}
