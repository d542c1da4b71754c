mod action;
mod app;
mod app_state;
mod component;
mod components;
mod focus;
mod mpv;
mod theme;
mod widgets;

use podcast_proto::{api::CatalogClient, config::Config, platform, session::SessionState};

/// Config file missing, unreadable or incomplete.
const EXIT_MISSING_RESOURCE: i32 = 98;
/// No mpv binary on PATH, beside the executable, or at `mpv_path`.
const EXIT_MISSING_DEPENDENCY: i32 = 99;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = data_dir.join("podcast-player.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; default to debug for app code but suppress noisy
    // connection-level DEBUG from HTTP client internals.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("podcast-player log: {}", log_path.display());
    tracing::info!("podcast-player starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config_path = Config::config_path();
    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config {}: {}", config_path.display(), e);
            eprintln!("podcast-player: {}: {}", config_path.display(), e);
            std::process::exit(EXIT_MISSING_RESOURCE);
        }
    };
    tracing::info!("config loaded from {}", config_path.display());

    // ── Locate mpv ───────────────────────────────────────────────────────────
    let Some(mpv) = platform::find_mpv_binary(config.mpv_path.as_deref()) else {
        tracing::error!("mpv binary not found");
        eprintln!(
            "podcast-player: {} not found (install mpv or set mpv_path)",
            platform::mpv_binary_name()
        );
        std::process::exit(EXIT_MISSING_DEPENDENCY);
    };
    tracing::info!("using mpv at {}", mpv.display());

    let client = CatalogClient::new(&config)?;

    // ── Restore session; config decides where a first run starts ─────────────
    let session_path = SessionState::default_path();
    let session = SessionState::load_or(
        &session_path,
        SessionState {
            environment: config.environment,
            api_version: config.api_version,
            station_callsign: None,
        },
    );

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = app::App::new(config, client, mpv, session, session_path);
    app.run().await?;

    Ok(())
}
