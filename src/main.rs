use anyhow::{Context, Result};
use clap::Parser;
use intervox::dialogue::{OpenAiConfig, OpenAiDialogue, ResilientDialogue};
use intervox::speech::{NullSpeech, SpeechOutput, SystemSpeech};
use intervox::transcribe::{Transcriber, ValidationLimits, WhisperClient, WhisperConfig};
use intervox::{create_router, AppState, Config};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "intervox", about = "Voice interview practice server", version)]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/intervox")]
    config: String,

    /// Override the configured bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the configured port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;

    info!("{} starting", cfg.service.name);

    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
    if api_key.is_empty() {
        warn!("OPENAI_API_KEY not set; transcription and dialogue will fall back locally");
    }

    // Transcription pipeline
    let whisper = WhisperClient::new(WhisperConfig {
        endpoint: cfg.transcription.endpoint.clone(),
        api_key: api_key.clone(),
        model: cfg.transcription.model.clone(),
        request_timeout: Duration::from_secs(cfg.transcription.request_timeout_secs),
    })
    .context("Failed to build transcription client")?;

    let transcriber = Arc::new(Transcriber::new(Arc::new(whisper)).with_limits(
        ValidationLimits {
            min_bytes: cfg.transcription.min_audio_bytes,
            min_duration_secs: cfg.transcription.min_duration_secs,
            max_bytes: cfg.transcription.max_audio_bytes,
        },
    ));

    // Dialogue service with local fallback
    let openai = OpenAiDialogue::new(OpenAiConfig {
        api_base: cfg.dialogue.api_base.clone(),
        api_key,
        model: cfg.dialogue.model.clone(),
        request_timeout: Duration::from_secs(cfg.dialogue.request_timeout_secs),
    })
    .context("Failed to build dialogue client")?;

    let dialogue = Arc::new(ResilientDialogue::new(Box::new(openai)));

    // Spoken output
    let speech: Arc<dyn SpeechOutput> = if cfg.speech.enabled {
        Arc::new(SystemSpeech::new(
            cfg.speech.voice_preferences.clone(),
            cfg.speech.rate_wpm,
        ))
    } else {
        Arc::new(NullSpeech::new())
    };

    let state = AppState::new(dialogue, transcriber, speech, cfg.interview.clone());
    let router = create_router(state);

    let bind = args.bind.unwrap_or_else(|| cfg.service.http.bind.clone());
    let port = args.port.unwrap_or(cfg.service.http.port);
    let addr = format!("{}:{}", bind, port);

    info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, router)
        .await
        .context("HTTP server failed")?;

    Ok(())
}
