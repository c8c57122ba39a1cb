//! Supported target languages and synthesis voice resolution.

use crate::defaults::DEFAULT_VOICE;
use crate::error::{DublineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A target language offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub label: &'static str,
}

pub const LANGUAGES: &[Language] = &[
    Language { code: "en", label: "English" },
    Language { code: "es", label: "Spanish" },
    Language { code: "fr", label: "French" },
    Language { code: "de", label: "German" },
    Language { code: "ja", label: "Japanese" },
    Language { code: "it", label: "Italian" },
    Language { code: "pt", label: "Portuguese" },
    Language { code: "ru", label: "Russian" },
    Language { code: "zh", label: "Chinese" },
    Language { code: "hi", label: "Hindi" },
    Language { code: "bn", label: "Bengali" },
    Language { code: "te", label: "Telugu" },
    Language { code: "ta", label: "Tamil" },
    Language { code: "mr", label: "Marathi" },
    Language { code: "gu", label: "Gujarati" },
    Language { code: "kn", label: "Kannada" },
    Language { code: "ml", label: "Malayalam" },
    Language { code: "ar", label: "Arabic" },
    Language { code: "ko", label: "Korean" },
    Language { code: "nl", label: "Dutch" },
];

/// Look up a supported language by code.
pub fn find_language(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.code.eq_ignore_ascii_case(code))
}

/// Display label for a language code, falling back to the code itself.
pub fn language_label(code: &str) -> &str {
    find_language(code).map(|l| l.label).unwrap_or(code)
}

/// Voice character picked by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    #[default]
    Male,
    Female,
}

impl VoiceGender {
    pub const ALL: [VoiceGender; 2] = [VoiceGender::Male, VoiceGender::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceGender::Male => "male",
            VoiceGender::Female => "female",
        }
    }
}

impl fmt::Display for VoiceGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoiceGender {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(VoiceGender::Male),
            "female" => Ok(VoiceGender::Female),
            other => Err(format!("unknown voice '{}', expected male or female", other)),
        }
    }
}

/// Name of a prebuilt synthesis voice. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VoiceSelection(String);

impl VoiceSelection {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DublineError::InvalidVoice);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VoiceSelection {
    fn default() -> Self {
        Self(DEFAULT_VOICE.to_string())
    }
}

impl fmt::Display for VoiceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for VoiceSelection {
    type Error = DublineError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<VoiceSelection> for String {
    fn from(value: VoiceSelection) -> Self {
        value.0
    }
}

/// Prebuilt voice for a language and gender.
///
/// The hosted voices are not language specific: every supported language maps
/// to the same pair. Unsupported languages fall back to the default voice.
fn voice_name(language: &str, gender: VoiceGender) -> Option<&'static str> {
    find_language(language)?;
    Some(match gender {
        VoiceGender::Male => "Algenib",
        VoiceGender::Female => "Achernar",
    })
}

/// Resolve the synthesis voice for a target language.
pub fn resolve_voice(language: &str, gender: VoiceGender) -> VoiceSelection {
    match voice_name(language, gender) {
        Some(name) => VoiceSelection(name.to_string()),
        None => {
            tracing::debug!(language, %gender, "no voice mapped, using default");
            VoiceSelection::default()
        }
    }
}

/// Resolve from free-form strings (e.g. CLI input); anything unknown gets the default voice.
pub fn resolve_voice_str(language: &str, gender: &str) -> VoiceSelection {
    match gender.parse::<VoiceGender>() {
        Ok(gender) => resolve_voice(language, gender),
        Err(_) => VoiceSelection::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_twenty_unique_codes() {
        let mut codes: Vec<_> = LANGUAGES.iter().map(|l| l.code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 20);
    }

    #[test]
    fn find_language_by_code() {
        assert_eq!(find_language("es").map(|l| l.label), Some("Spanish"));
        assert_eq!(find_language("JA").map(|l| l.label), Some("Japanese"));
        assert!(find_language("xx").is_none());
    }

    #[test]
    fn language_label_falls_back_to_code() {
        assert_eq!(language_label("nl"), "Dutch");
        assert_eq!(language_label("tlh"), "tlh");
    }

    #[test]
    fn resolve_voice_for_supported_language() {
        assert_eq!(resolve_voice("es", VoiceGender::Male).as_str(), "Algenib");
        assert_eq!(resolve_voice("es", VoiceGender::Female).as_str(), "Achernar");
        assert_eq!(resolve_voice("ko", VoiceGender::Female).as_str(), "Achernar");
    }

    #[test]
    fn resolve_voice_unknown_language_uses_default() {
        assert_eq!(resolve_voice("xx", VoiceGender::Female), VoiceSelection::default());
        assert_eq!(VoiceSelection::default().as_str(), DEFAULT_VOICE);
    }

    #[test]
    fn resolve_voice_str_unknown_gender_uses_default() {
        assert_eq!(resolve_voice_str("fr", "robot").as_str(), DEFAULT_VOICE);
        assert_eq!(resolve_voice_str("fr", "Female").as_str(), "Achernar");
    }

    #[test]
    fn voice_selection_rejects_blank() {
        assert!(matches!(VoiceSelection::new(""), Err(DublineError::InvalidVoice)));
        assert!(matches!(VoiceSelection::new("   "), Err(DublineError::InvalidVoice)));
        assert_eq!(VoiceSelection::new("Kore").unwrap().as_str(), "Kore");
    }

    #[test]
    fn voice_gender_parses_and_displays() {
        assert_eq!("male".parse::<VoiceGender>().unwrap(), VoiceGender::Male);
        assert_eq!(" FEMALE ".parse::<VoiceGender>().unwrap(), VoiceGender::Female);
        assert!("other".parse::<VoiceGender>().is_err());
        assert_eq!(VoiceGender::Female.to_string(), "female");
    }

    #[test]
    fn voice_selection_deserialize_rejects_empty() {
        let ok: VoiceSelection = serde_json::from_str("\"Achernar\"").unwrap();
        assert_eq!(ok.as_str(), "Achernar");
        assert!(serde_json::from_str::<VoiceSelection>("\"\"").is_err());
    }
}
