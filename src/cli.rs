//! Command-line interface for dubline
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Translate the speech in a video into another language
#[derive(Parser, Debug)]
#[command(
    name = "dubline",
    version,
    about = "Translate the speech in a video into another language"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse a request timeout.
///
/// Supports any duration format accepted by `humantime`: bare numbers (seconds),
/// single-unit (`30s`, `5m`), and compound (`1m30s`).
fn parse_timeout(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let duration = match s.parse::<u64>() {
        Ok(secs) => Duration::from_secs(secs),
        Err(_) => humantime::parse_duration(s).map_err(|e| e.to_string())?,
    };
    if duration.is_zero() {
        return Err("timeout must be greater than zero".to_string());
    }
    Ok(duration)
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe, translate and re-voice a video
    Translate {
        /// Video or audio file to translate
        #[arg(value_name = "VIDEO")]
        video: PathBuf,

        /// Target language code (see `dubline languages`)
        #[arg(short, long, value_name = "LANG")]
        lang: Option<String>,

        /// Voice for the translated speech (male, female)
        #[arg(long, value_name = "VOICE")]
        voice: Option<String>,

        /// Directory for translated_audio.wav and transcript.txt
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        out: PathBuf,

        /// User id to record the translation under
        #[arg(long, value_name = "USER")]
        user: Option<String>,

        /// Per-request timeout (e.g. 90s, 2m)
        #[arg(long, value_name = "DURATION", value_parser = parse_timeout)]
        timeout: Option<Duration>,
    },

    /// List supported target languages
    Languages,

    /// Show saved translations, newest first
    History {
        /// User whose history to show (default: history.user_id)
        #[arg(long, value_name = "USER")]
        user: Option<String>,
    },

    /// Wrap raw PCM samples in a WAV container
    EncodeWav {
        /// Raw little-endian PCM file
        #[arg(value_name = "RAW")]
        raw: PathBuf,

        /// Sample rate in Hz
        #[arg(long, default_value_t = crate::defaults::SAMPLE_RATE)]
        rate: u32,

        /// Channel count
        #[arg(long, default_value_t = crate::defaults::CHANNELS)]
        channels: u16,

        /// Bytes per sample
        #[arg(long, default_value_t = crate::defaults::SAMPLE_WIDTH_BYTES)]
        width: u16,

        /// Output file (default: RAW with a .wav extension)
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration (secrets masked)
    Show,
    /// Print the configuration file path
    Path,
}
