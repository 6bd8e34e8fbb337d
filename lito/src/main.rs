//! lito - Convert text and documents to audio using a remote TTS service

mod audio;
mod config;
mod naming;
mod pipeline;
mod text;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use config::LitoConfig;
use pipeline::sinks::{ConsoleStatus, FileSink};
use pipeline::{ConversionRequest, InputSource, Orchestrator};
use tts_client::{RemoteBackend, SpeechBackend};

#[derive(Parser, Debug)]
#[command(name = "lito")]
#[command(about = "Convert text and documents to audio using a remote text-to-speech service", long_about = None)]
#[command(version)]
struct Args {
    /// Text to convert
    text: Option<String>,

    /// File to convert instead of direct text (.pdf, .txt, .md)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Voice id to synthesize with (see `lito voices`)
    #[arg(short, long)]
    voice: Option<String>,

    /// Output file path (default: derived from the input text)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Speech service base URL
    #[arg(long)]
    server: Option<String>,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the voices the speech service offers
    Voices,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the speech service base URL
    SetServer {
        /// Base URL, e.g. https://tts.example.com
        url: String,
    },
    /// Set the default voice
    SetVoice {
        /// Voice id, e.g. en-US-AvaNeural
        voice: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = LitoConfig::load().context("Failed to load configuration")?;

    let server_url = args
        .server
        .clone()
        .unwrap_or_else(|| config.server_url.clone());
    let backend: Arc<dyn SpeechBackend> = Arc::new(RemoteBackend::new(&server_url));

    match &args.command {
        Some(Commands::Voices) => return list_voices(backend.as_ref()).await,
        Some(Commands::Config { action }) => return handle_config_command(action, config),
        None => {}
    }

    let source = match (&args.text, &args.file) {
        (Some(text), None) => InputSource::Text(text.clone()),
        (None, Some(path)) => {
            if !path.exists() {
                anyhow::bail!("File not found: {}", path.display());
            }
            InputSource::File(path.clone())
        }
        (Some(_), Some(_)) => anyhow::bail!("Give either text or --file, not both."),
        (None, None) => anyhow::bail!("Nothing to convert. Run 'lito --help' for usage."),
    };

    let voice = resolve_voice(&args, &config, backend.as_ref()).await?;

    let mut orchestrator = Orchestrator::new(
        Arc::clone(&backend),
        config.max_input_chars,
        config.segment_chars,
    );
    let mut audio = FileSink::new(args.output.clone());
    let mut status = ConsoleStatus::new();

    let request = ConversionRequest { source, voice };
    let summary = match orchestrator.convert(request, &mut audio, &mut status).await {
        Ok(summary) => summary,
        // The failure was already surfaced through the status sink.
        Err(_) => std::process::exit(1),
    };

    if let Some(path) = audio.preview_path() {
        eprintln!("Preview: {}", path.display());
    }
    match audio.download_path() {
        Some(path) => {
            let size_kb = summary.audio_bytes as f64 / 1024.0;
            eprintln!(
                "Saved: {} ({} segment(s), {:.1} KB)",
                path.display(),
                summary.segment_count,
                size_kb
            );
        }
        None => anyhow::bail!(
            "Conversion finished but {} could not be written",
            summary.filename
        ),
    }

    Ok(())
}

/// Pick the synthesis voice: explicit flag, configured default, then the
/// first voice the service lists.
async fn resolve_voice(
    args: &Args,
    config: &LitoConfig,
    backend: &dyn SpeechBackend,
) -> Result<String> {
    if let Some(voice) = &args.voice {
        return Ok(voice.clone());
    }
    if let Some(voice) = &config.default_voice {
        return Ok(voice.clone());
    }

    match backend.voices().await {
        Ok(voices) if !voices.is_empty() => Ok(voices[0].id.clone()),
        Ok(_) => anyhow::bail!(
            "The speech service lists no voices. Set one with 'lito config set-voice'."
        ),
        Err(err) => anyhow::bail!(
            "Could not fetch the voice list ({}). Set a default with 'lito config set-voice'.",
            err
        ),
    }
}

async fn list_voices(backend: &dyn SpeechBackend) -> Result<()> {
    let voices = backend
        .voices()
        .await
        .context("Failed to fetch the voice list")?;

    if voices.is_empty() {
        eprintln!("The speech service lists no voices.");
        return Ok(());
    }

    for voice in &voices {
        println!("{:<28} {}", voice.id, voice.display_name);
    }
    Ok(())
}

fn handle_config_command(action: &ConfigAction, mut config: LitoConfig) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("Configuration file: {}", LitoConfig::config_path()?.display());
            println!("  server_url: {}", config.server_url);
            println!(
                "  default_voice: {}",
                config.default_voice.as_deref().unwrap_or("(none)")
            );
            println!("  max_input_chars: {}", config.max_input_chars);
            println!("  segment_chars: {}", config.segment_chars);
        }
        ConfigAction::SetServer { url } => {
            config.server_url = url.clone();
            config.save()?;
            println!("Server URL set to: {}", url);
        }
        ConfigAction::SetVoice { voice } => {
            config.default_voice = Some(voice.clone());
            config.save()?;
            println!("Default voice set to: {}", voice);
        }
    }
    Ok(())
}
