use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use grabbit_core::{
    create_journal, load_config, validate_config, DownloadQueue, HistoryStore, JournalBuffer,
    Runner, SqliteHistoryStore, YtDlpRunner,
};
use grabbit_server::api::{create_router, WsBroadcaster};
use grabbit_server::state::AppState;

/// Application version.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Buffer size for the journal channel.
const JOURNAL_CHANNEL_SIZE: usize = 1024;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("GRABBIT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);

    // Log a config fingerprint so deployments are distinguishable
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(version = VERSION, config_hash = &config_hash[..16], "Starting grabbit");

    // Create SQLite history store
    let history: Arc<dyn HistoryStore> = Arc::new(
        SqliteHistoryStore::new(&config.database.path)
            .context("Failed to open history store")?,
    );
    info!("History store initialized");

    // Create journal system
    let journal_buffer = Arc::new(JournalBuffer::new(config.journal.capacity));
    let (journal_handle, journal_writer) =
        create_journal(Arc::clone(&journal_buffer), JOURNAL_CHANNEL_SIZE);

    // Spawn journal writer task
    let writer_handle = tokio::spawn(journal_writer.run());

    // Create the yt-dlp runner; a missing binary is not fatal at
    // startup, downloads will simply fail until it is installed.
    let runner = Arc::new(YtDlpRunner::new(config.runner.clone()));
    if let Err(e) = runner.validate().await {
        warn!("yt-dlp validation failed: {}", e);
    }

    // Create the download queue
    let queue = DownloadQueue::new(
        config.queue.clone(),
        runner as Arc<dyn Runner>,
        Arc::clone(&history),
        journal_handle.clone(),
    );
    info!(
        max_concurrent = config.queue.max_concurrent,
        "Download queue initialized"
    );

    // Create WebSocket broadcaster and wire it as the queue observer
    let ws_broadcaster = WsBroadcaster::default();
    {
        let broadcaster = ws_broadcaster.clone();
        queue.set_update_callback(Arc::new(move || broadcaster.queue_updated()));
    }

    journal_handle
        .emit(None, format!("[service] grabbit {} started", VERSION))
        .await;

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        queue.clone(),
        history,
        journal_buffer,
        ws_broadcaster,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");

    // Cancel active downloads; their processes keep running only if
    // kill_on_cancel is disabled.
    queue.shutdown();

    journal_handle
        .emit(None, "[service] grabbit stopped".to_string())
        .await;

    // Drop all holders of the journal handle so the writer's channel
    // closes. The queue holds a clone, so it must go too; the router
    // (and with it the AppState) was dropped when serve returned.
    drop(queue);
    drop(journal_handle);

    // Wait for the writer to finish processing remaining lines
    let _ = writer_handle.await;
    info!("Journal writer stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
