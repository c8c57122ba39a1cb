use anyhow::{Context, Result, bail};
use clap::Parser;
use dubline::audio::{PcmFormat, encode_file};
use dubline::cli::{Cli, Commands, ConfigAction};
use dubline::config::Config;
use dubline::defaults::TRANSCRIPT_WIDTH;
use dubline::gemini::GeminiClient;
use dubline::history::{FirestoreHistoryStore, HistoryStore};
use dubline::languages::{VoiceGender, find_language, resolve_voice};
use dubline::media::MediaPayload;
use dubline::output::{
    AUDIO_FILE_NAME, TRANSCRIPT_FILE_NAME, TerminalProgress, render_history, render_languages,
    render_timings,
};
use dubline::pipeline::{Pipeline, PipelineRequest};
use dubline::transcript::format_transcript;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Translate {
            video,
            lang,
            voice,
            out,
            user,
            timeout,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let args = TranslateArgs {
                video,
                lang,
                voice,
                out,
                user,
                timeout,
            };
            run_translate(config, args, cli.quiet, cli.verbose).await?;
        }
        Commands::Languages => {
            let config = load_config(cli.config.as_deref())?;
            print!("{}", render_languages(&config.pipeline.target_language));
        }
        Commands::History { user } => {
            let config = load_config(cli.config.as_deref())?;
            handle_history(&config, user).await?;
        }
        Commands::EncodeWav {
            raw,
            rate,
            channels,
            width,
            output,
        } => {
            let format = PcmFormat {
                channels,
                sample_rate: rate,
                sample_width_bytes: width,
            };
            handle_encode_wav(&raw, format, output, cli.quiet)?;
        }
        Commands::Config { action } => {
            handle_config_command(action, cli.config.as_deref())?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "warn,dubline=debug",
        _ => "warn,dubline=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 1)
        .init();
}

fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        // Load from custom path
        Config::load(path)?
    } else {
        // Try default path, fall back to defaults
        let default_path = Config::default_path();
        Config::load_or_default(&default_path)?
    };

    // Apply environment variable overrides
    Ok(config.with_env_overrides())
}

struct TranslateArgs {
    video: PathBuf,
    lang: Option<String>,
    voice: Option<String>,
    out: PathBuf,
    user: Option<String>,
    timeout: Option<Duration>,
}

async fn run_translate(
    mut config: Config,
    args: TranslateArgs,
    quiet: bool,
    verbose: u8,
) -> Result<()> {
    if let Some(lang) = args.lang {
        config.pipeline.target_language = lang;
    }
    if let Some(timeout) = args.timeout {
        config.api.timeout_secs = timeout.as_secs().max(1);
    }
    config.validate()?;

    let target_language = config.pipeline.target_language.clone();
    if find_language(&target_language).is_none() {
        tracing::warn!(%target_language, "not in the supported language list, sending as-is");
    }

    let gender = match args.voice.as_deref() {
        Some(v) => v.parse::<VoiceGender>().map_err(|e| anyhow::anyhow!(e))?,
        None => config.pipeline.voice,
    };
    let voice = resolve_voice(&target_language, gender);

    let media = MediaPayload::from_path(&args.video)
        .with_context(|| format!("Failed to read {}", args.video.display()))?;
    media.check_upload(config.pipeline.max_upload_bytes())?;

    let client = Arc::new(GeminiClient::from_config(&config.api)?);
    let mut pipeline = Pipeline::new(client.clone(), client.clone(), client)
        .with_progress(Arc::new(TerminalProgress::new(quiet)));

    let user_id = args.user.or_else(|| config.history.user_id.clone());
    if let Some(store) = history_store(&config)? {
        pipeline = pipeline.with_history(store);
    }

    let mut request = PipelineRequest::new(media, target_language.clone(), voice);
    request.user_id = user_id;

    if !quiet {
        eprintln!(
            "{} {} → {}",
            "Translating".bold(),
            request.media.name(),
            dubline::languages::language_label(&target_language)
        );
    }

    let run = pipeline.run(&request).await?;

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("Failed to create {}", args.out.display()))?;
    let audio_path = args.out.join(AUDIO_FILE_NAME);
    let transcript_path = args.out.join(TRANSCRIPT_FILE_NAME);
    run.result.audio.write_to(&audio_path)?;
    std::fs::write(
        &transcript_path,
        format_transcript(&run.result, &target_language, TRANSCRIPT_WIDTH),
    )
    .with_context(|| format!("Failed to write {}", transcript_path.display()))?;

    println!("{}", run.result.translated_text);
    if !quiet {
        eprintln!("{} {}", "Audio:".dimmed(), audio_path.display());
        eprintln!("{} {}", "Transcript:".dimmed(), transcript_path.display());
        if verbose > 0 {
            eprintln!("{} {}", "Timings:".dimmed(), render_timings(&run.timings));
        }
    }

    // The process would abort the write on exit, so wait for it here.
    run.persistence.settle().await;
    Ok(())
}

/// Firestore store when history is enabled.
fn history_store(config: &Config) -> Result<Option<Arc<dyn HistoryStore>>> {
    if !config.history.enabled {
        return Ok(None);
    }
    let project_id = config
        .history
        .project_id
        .clone()
        .context("history.enabled is set but history.project_id is missing")?;
    let store = FirestoreHistoryStore::new(
        config.history.base_url.clone(),
        project_id,
        config.history.auth_token.clone(),
        config.api.timeout(),
    )?;
    Ok(Some(Arc::new(store)))
}

async fn handle_history(config: &Config, user: Option<String>) -> Result<()> {
    let Some(store) = history_store(config)? else {
        bail!(
            "History is disabled. Set [history] enabled = true and project_id in the config file."
        );
    };
    let Some(user_id) = user.or_else(|| config.history.user_id.clone()) else {
        bail!("No user given. Pass --user or set history.user_id / DUBLINE_USER_ID.");
    };

    let records = store.list(&user_id).await?;
    print!("{}", render_history(&records));
    Ok(())
}

fn handle_encode_wav(
    raw: &Path,
    format: PcmFormat,
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let output = output.unwrap_or_else(|| raw.with_extension("wav"));
    if output == raw {
        bail!("Refusing to overwrite input {}; pass -o", raw.display());
    }

    let info = encode_file(raw, &output, format)
        .with_context(|| format!("Failed to encode {}", raw.display()))?;

    if !quiet {
        eprintln!(
            "{} {} ({} Hz, {} ch, {}-bit, {:.2}s)",
            "Wrote".green(),
            output.display(),
            info.sample_rate,
            info.channels,
            info.bits_per_sample,
            info.duration.as_secs_f64()
        );
    }
    Ok(())
}

fn handle_config_command(action: ConfigAction, custom_path: Option<&Path>) -> Result<()> {
    let config_path = custom_path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);

    match action {
        ConfigAction::Show => {
            let config = Config::load_or_default(&config_path)?.with_env_overrides();
            print!("{}", config.to_redacted_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }
    Ok(())
}
