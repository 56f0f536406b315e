//! Guide Service (tgai-gs) - Main entry point
//!
//! Loads configuration, wires the Gemini client into the speech controller,
//! and serves the HTTP/SSE API until Ctrl+C or SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tgai_common::config::{resolve_config_path, CONFIG_ENV_VAR};
use tgai_gs::api::{self, AppContext};
use tgai_gs::audio::CpalOpener;
use tgai_gs::config::GuideConfig;
use tgai_gs::gemini::GeminiClient;
use tgai_gs::speech::SpeechController;
use tgai_gs::state::SharedState;

/// Command-line arguments for tgai-gs
#[derive(Parser, Debug)]
#[command(name = "tgai-gs")]
#[command(about = "Tour guide chat and speech service")]
#[command(version)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "TGAI_GS_PORT")]
    port: Option<u16>,

    /// Gemini API key (overrides config file)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Audio output device name (overrides config file)
    #[arg(long, env = "TGAI_AUDIO_DEVICE")]
    device: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref(), CONFIG_ENV_VAR);
    let mut config =
        GuideConfig::load(config_path.as_deref()).context("Failed to load configuration")?;

    // Initialize tracing; RUST_LOG wins over the config file level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("tgai_gs={},tower_http=debug", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting tgai-gs v{} [{}] built {}",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP")
    );
    match &config_path {
        Some(path) => info!("Configuration: {}", path.display()),
        None => info!("Configuration: built-in defaults"),
    }

    apply_overrides(&mut config, args);

    if config.gemini.api_key.is_empty() {
        warn!("No Gemini API key configured; chat and speech requests will fail");
    }

    let state = Arc::new(SharedState::new());
    let gemini = Arc::new(
        GeminiClient::new(&config.gemini).context("Failed to create Gemini client")?,
    );

    // Output device is opened on the first play request
    let controller = Arc::new(SpeechController::new(
        gemini.clone(),
        Box::new(CpalOpener::new(config.audio.device.clone())),
        state.clone(),
        config.audio.pcm_format(),
    ));

    let ctx = AppContext {
        state,
        controller,
        gemini,
    };

    api::run(config.port, ctx, shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

/// CLI arguments and environment variables take precedence over the file
fn apply_overrides(config: &mut GuideConfig, args: Args) {
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(key) = args
        .api_key
        .or_else(|| std::env::var("API_KEY").ok())
        .filter(|k| !k.is_empty())
    {
        config.gemini.api_key = key;
    }
    if let Some(device) = args.device {
        config.audio.device = Some(device);
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
