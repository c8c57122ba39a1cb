use crate::defaults;
use crate::error::{DublineError, Result};
use crate::languages::VoiceGender;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub pipeline: PipelineConfig,
    pub history: HistoryConfig,
}

/// Hosted speech, translation and TTS service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub transcription_model: String,
    pub translation_model: String,
    pub speech_model: String,
    pub timeout_secs: u64,
}

/// Per-run defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub target_language: String,
    pub voice: VoiceGender,
    pub max_upload_mb: u64,
}

/// Translation history storage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    pub enabled: bool,
    pub project_id: Option<String>,
    pub user_id: Option<String>,
    pub auth_token: Option<String>,
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::API_BASE_URL.to_string(),
            api_key: None,
            transcription_model: defaults::TRANSCRIPTION_MODEL.to_string(),
            translation_model: defaults::TRANSLATION_MODEL.to_string(),
            speech_model: defaults::SPEECH_MODEL.to_string(),
            timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_language: defaults::DEFAULT_TARGET_LANGUAGE.to_string(),
            voice: VoiceGender::default(),
            max_upload_mb: defaults::MAX_UPLOAD_MB,
        }
    }
}

impl PipelineConfig {
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            project_id: None,
            user_id: None,
            auth_token: None,
            base_url: defaults::FIRESTORE_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e.context(format!("Failed to load config from {}", path.display())))
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - DUBLINE_API_KEY (or GEMINI_API_KEY) → api.api_key
    /// - DUBLINE_TARGET_LANGUAGE → pipeline.target_language
    /// - DUBLINE_VOICE → pipeline.voice (ignored unless male/female)
    /// - DUBLINE_USER_ID → history.user_id
    /// - DUBLINE_AUTH_TOKEN → history.auth_token
    /// - DUBLINE_PROJECT_ID → history.project_id
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(key) = env_value("DUBLINE_API_KEY").or_else(|| env_value("GEMINI_API_KEY")) {
            self.api.api_key = Some(key);
        }

        if let Some(language) = env_value("DUBLINE_TARGET_LANGUAGE") {
            self.pipeline.target_language = language;
        }

        if let Some(voice) = env_value("DUBLINE_VOICE") {
            match voice.parse::<VoiceGender>() {
                Ok(gender) => self.pipeline.voice = gender,
                Err(e) => tracing::warn!(value = %voice, "ignoring DUBLINE_VOICE: {e}"),
            }
        }

        if let Some(user) = env_value("DUBLINE_USER_ID") {
            self.history.user_id = Some(user);
        }

        if let Some(token) = env_value("DUBLINE_AUTH_TOKEN") {
            self.history.auth_token = Some(token);
        }

        if let Some(project) = env_value("DUBLINE_PROJECT_ID") {
            self.history.project_id = Some(project);
        }

        self
    }

    /// Reject values no run could work with.
    pub fn validate(&self) -> Result<()> {
        if self.api.timeout_secs == 0 {
            return Err(invalid("api.timeout_secs", "must be greater than zero"));
        }
        if self.pipeline.max_upload_mb == 0 {
            return Err(invalid("pipeline.max_upload_mb", "must be greater than zero"));
        }
        if self.pipeline.target_language.trim().is_empty() {
            return Err(invalid("pipeline.target_language", "must not be empty"));
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/dubline/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dubline")
            .join("config.toml")
    }

    /// Render as TOML, with the API key and auth token masked.
    pub fn to_redacted_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        shown.api.api_key = shown.api.api_key.as_deref().map(mask);
        shown.history.auth_token = shown.history.auth_token.as_deref().map(mask);
        toml::to_string_pretty(&shown).map_err(|e| DublineError::ConfigParse {
            message: e.to_string(),
        })
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn invalid(key: &str, message: &str) -> DublineError {
    DublineError::ConfigInvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

fn mask(secret: &str) -> String {
    let tail: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("****{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_dubline_env() {
        for key in [
            "DUBLINE_API_KEY",
            "GEMINI_API_KEY",
            "DUBLINE_TARGET_LANGUAGE",
            "DUBLINE_VOICE",
            "DUBLINE_USER_ID",
            "DUBLINE_AUTH_TOKEN",
            "DUBLINE_PROJECT_ID",
        ] {
            remove_env(key);
        }
    }

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.api.base_url, defaults::API_BASE_URL);
        assert_eq!(config.api.api_key, None);
        assert_eq!(config.api.timeout_secs, 120);

        assert_eq!(config.pipeline.target_language, "es");
        assert_eq!(config.pipeline.voice, VoiceGender::Male);
        assert_eq!(config.pipeline.max_upload_mb, 50);
        assert_eq!(config.pipeline.max_upload_bytes(), 50 * 1024 * 1024);

        assert!(!config.history.enabled);
        assert_eq!(config.history.base_url, defaults::FIRESTORE_BASE_URL);
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp_file = write_temp(
            r#"
            [api]
            api_key = "k-123"
            translation_model = "gemini-2.5-pro"
            timeout_secs = 30

            [pipeline]
            target_language = "fr"
            voice = "female"
            max_upload_mb = 10

            [history]
            enabled = true
            project_id = "dubline-prod"
            user_id = "u1"
        "#,
        );

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.api.api_key.as_deref(), Some("k-123"));
        assert_eq!(config.api.translation_model, "gemini-2.5-pro");
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert_eq!(config.pipeline.target_language, "fr");
        assert_eq!(config.pipeline.voice, VoiceGender::Female);
        assert_eq!(config.pipeline.max_upload_mb, 10);
        assert!(config.history.enabled);
        assert_eq!(config.history.project_id.as_deref(), Some("dubline-prod"));
        assert_eq!(config.history.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let temp_file = write_temp(
            r#"
            [pipeline]
            target_language = "de"
        "#,
        );

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.pipeline.target_language, "de");
        assert_eq!(config.pipeline.voice, VoiceGender::Male);
        assert_eq!(config.api, ApiConfig::default());
        assert_eq!(config.history, HistoryConfig::default());
    }

    #[test]
    fn test_env_override_api_key() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_dubline_env();

        set_env("DUBLINE_API_KEY", "primary");
        set_env("GEMINI_API_KEY", "fallback");
        let config = Config::default().with_env_overrides();
        assert_eq!(config.api.api_key.as_deref(), Some("primary"));

        remove_env("DUBLINE_API_KEY");
        let config = Config::default().with_env_overrides();
        assert_eq!(config.api.api_key.as_deref(), Some("fallback"));

        clear_dubline_env();
    }

    #[test]
    fn test_env_override_all() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_dubline_env();

        set_env("DUBLINE_TARGET_LANGUAGE", "ja");
        set_env("DUBLINE_VOICE", "female");
        set_env("DUBLINE_USER_ID", "user-7");
        set_env("DUBLINE_AUTH_TOKEN", "token");
        set_env("DUBLINE_PROJECT_ID", "proj");

        let config = Config::default().with_env_overrides();

        assert_eq!(config.pipeline.target_language, "ja");
        assert_eq!(config.pipeline.voice, VoiceGender::Female);
        assert_eq!(config.history.user_id.as_deref(), Some("user-7"));
        assert_eq!(config.history.auth_token.as_deref(), Some("token"));
        assert_eq!(config.history.project_id.as_deref(), Some("proj"));

        clear_dubline_env();
    }

    #[test]
    fn test_env_override_invalid_voice_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_dubline_env();

        set_env("DUBLINE_VOICE", "robot");
        let config = Config::default().with_env_overrides();
        assert_eq!(config.pipeline.voice, VoiceGender::Male);

        clear_dubline_env();
    }

    #[test]
    fn test_env_override_empty_string_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_dubline_env();

        set_env("DUBLINE_TARGET_LANGUAGE", "");
        let config = Config::default().with_env_overrides();

        // Empty string should not override default
        assert_eq!(config.pipeline.target_language, "es");

        clear_dubline_env();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let temp_file = write_temp(
            r#"
            [api
            base_url = "broken
        "#,
        );

        let err = Config::load(temp_file.path()).unwrap_err();
        assert!(
            err.downcast_ref::<toml::de::Error>().is_some(),
            "TOML syntax errors should surface as toml::de::Error, got: {err:#}"
        );
    }

    #[test]
    fn test_unknown_voice_in_file_is_error() {
        let temp_file = write_temp("[pipeline]\nvoice = \"robot\"\n");
        assert!(Config::load(temp_file.path()).is_err());
    }

    #[test]
    fn test_default_path_ends_with_dubline_config() {
        let path = Config::default_path();
        assert!(path.ends_with("dubline/config.toml"));
    }

    #[test]
    fn test_load_or_default_returns_default_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing_path = dir.path().join("nope.toml");
        let config = Config::load_or_default(&missing_path).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_errors_on_invalid_toml() {
        let temp_file = write_temp("[api\nbase_url = \"broken\n");

        let err = Config::load_or_default(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.pipeline.max_upload_mb = 0;
        match config.validate() {
            Err(DublineError::ConfigInvalidValue { key, .. }) => {
                assert_eq!(key, "pipeline.max_upload_mb")
            }
            other => panic!("Expected ConfigInvalidValue, got {:?}", other),
        }

        let mut config = Config::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_target_language() {
        let mut config = Config::default();
        config.pipeline.target_language = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_redacted_toml_masks_secrets() {
        let mut config = Config::default();
        config.api.api_key = Some("AIzaSyExample1234".to_string());
        config.history.auth_token = Some("short".to_string());

        let rendered = config.to_redacted_toml().unwrap();

        assert!(rendered.contains("****1234"));
        assert!(!rendered.contains("AIzaSyExample1234"));
        assert!(!rendered.contains("short"));
        assert!(rendered.contains("[pipeline]"));
    }
}
