// src/main.rs
// =============================================================================
// Entry point of the link-sentry service.
//
// Startup sequence:
// 1. Parse command-line arguments and initialize tracing
// 2. Load the durable store and build the checker
// 3. Drain link sets deferred during a previous shutdown
// 4. Serve the HTTP API until SIGINT/SIGTERM, then drain gracefully
// =============================================================================

mod checker;
mod cli;
mod models;
mod report;
mod server;
mod storage;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use checker::Checker;
use cli::Cli;
use server::AppState;
use storage::Storage;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    std::fs::create_dir_all(&cli.data_dir)
        .with_context(|| format!("creating data directory {}", cli.data_dir.display()))?;

    let storage = Arc::new(Storage::load(
        cli.data_dir.join("storage.json"),
        cli.data_dir.join("pending.json"),
    )?);

    let checker = Arc::new(
        Checker::new(
            storage.clone(),
            Duration::from_secs(cli.probe_timeout),
            cli.probe_concurrency,
        )
        .context("building the probe HTTP client")?,
    );

    // Replay whatever the previous run left queued before taking traffic.
    checker.process_pending_tasks().await;

    let shutting_down = Arc::new(AtomicBool::new(false));
    let state = AppState {
        checker,
        storage,
        shutting_down: shutting_down.clone(),
    };
    let app = server::create_router(state);

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("binding {}", cli.bind))?;
    info!("server listening on {}", cli.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutting_down))
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

/// Resolves when SIGINT or SIGTERM arrives. The flag flips before axum
/// starts draining, so requests racing the drain take the deferred path.
async fn shutdown_signal(shutting_down: Arc<AtomicBool>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }

    shutting_down.store(true, Ordering::SeqCst);
}
