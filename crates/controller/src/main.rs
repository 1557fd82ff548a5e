use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{error, info, warn};

use proxyctl_config::{parse_cli, Settings};
use proxyctl_controller::{events, prober, worker};
use proxyctl_domain::Configuration;

/// Senders for C (events) and I (status server) share this capacity; at
/// most one reload can be in flight and at most one can be pending.
const RELOAD_QUEUE_CAPACITY: usize = 2;
const SHUTDOWN_CHANNEL_CAPACITY: usize = 16;
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = parse_cli();
    if cli.version {
        println!("proxyctl {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    proxyctl_common::logging::init_tracing();

    let settings = Settings::load(&cli.config)?;
    info!(config = %cli.config.display(), endpoints = settings.endpoints.len(), "loaded configuration");

    let port = settings.port;
    let config = Arc::new(RwLock::new(Configuration::new(settings)));

    let (shutdown_tx, _) = broadcast::channel::<()>(SHUTDOWN_CHANNEL_CAPACITY);
    let (reload_tx, reload_rx) = mpsc::channel::<()>(RELOAD_QUEUE_CAPACITY);

    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("received ctrl-c, initiating graceful shutdown");
            let _ = shutdown_tx_clone.send(());
        }
    });

    let prober_handle = tokio::spawn(prober::run(config.clone(), shutdown_tx.subscribe()));
    let events_handle = tokio::spawn(events::run(config.clone(), reload_tx.clone(), shutdown_tx.subscribe()));
    let worker_handle = tokio::spawn(worker::run(config.clone(), reload_rx, shutdown_tx.subscribe()));

    let status_state = proxyctl_status_api::AppState::new(config.clone(), reload_tx.clone());
    let router = proxyctl_status_api::router(status_state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "status server listening");
    let mut status_shutdown = shutdown_tx.subscribe();
    let status_handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = status_shutdown.recv().await;
            })
            .await
    });

    // Trigger an immediate reload on startup instead of waiting for the
    // first event or the worker's first tick.
    let _ = reload_tx.try_send(());

    let mut shutdown_rx = shutdown_tx.subscribe();
    shutdown_rx.recv().await.ok();

    info!("shutting down, waiting up to {:?} for tasks to finish", SHUTDOWN_TIMEOUT);
    let drain = async {
        let _ = prober_handle.await;
        let _ = events_handle.await;
        let _ = worker_handle.await;
        if let Ok(Err(e)) = status_handle.await {
            error!(error = %e, "status server exited with an error");
        }
    };

    if tokio::time::timeout(SHUTDOWN_TIMEOUT, drain).await.is_err() {
        warn!("shutdown timed out, exiting anyway");
    }

    info!("shutdown complete");
    Ok(())
}
