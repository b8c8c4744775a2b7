//! Repometa worker entry point
//!
//! Reads analysis requests as JSON lines on stdin and writes one result line
//! per request on stdout. Logs go to stderr.

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use repometa::repometa_orchestrator::infrastructure::transport::{JsonLinesSink, JsonLinesSource};
use repometa::{Config, create_app, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        // Only warn if it's not a "file not found" error
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    let config = Config::load()
        .context("Failed to load configuration. Check config/ files and REPOMETA__* env vars")?;

    init_tracing(&config.logging).context("Failed to initialize logging")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        concurrency = config.worker.concurrency,
        "Starting repometa worker"
    );

    let (sink, writer) = JsonLinesSink::stdout(config.worker.queue_capacity);
    let app = create_app(&config, Arc::new(sink)).context("Failed to create application")?;

    tokio::spawn(shutdown_signal(app.shutdown_token.clone()));

    let summary = app.run(Arc::new(JsonLinesSource::stdin())).await;

    // Dropping the app releases the last sink handle so the writer can finish.
    drop(app);
    let shutdown_timeout = Duration::from_secs(config.worker.shutdown_timeout_seconds);
    match tokio::time::timeout(shutdown_timeout, writer).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => tracing::error!(error = %e, "Failed to write results to stdout"),
        Ok(Err(e)) => tracing::error!(error = %e, "Result writer task failed"),
        Err(_) => tracing::warn!("Timed out flushing pending results"),
    }

    tracing::info!(
        received = summary.received,
        emitted = summary.emitted,
        unpublished = summary.unpublished,
        rejected = summary.rejected,
        abandoned = summary.abandoned,
        "Worker shutdown complete"
    );
    Ok(())
}

/// Cancel `shutdown_token` on Ctrl+C or SIGTERM.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        },
    }

    shutdown_token.cancel();
}
