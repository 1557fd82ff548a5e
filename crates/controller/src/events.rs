//! Event Stream Consumer (component C): holds an open SSE connection against
//! the first healthy endpoint and turns `event: ` lines into reload tokens.
//!
//! Reconnects on a 1-second cadence after a clean stream close, but on a
//! transport error or a watchdog timeout the retry delay collapses to 100ms
//! so a flapping connection recovers as fast as possible instead of idling.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, info, warn};

use proxyctl_common::metrics;
use proxyctl_domain::Configuration;

const WATCHDOG: Duration = Duration::from_secs(15);
const NORMAL_RETRY_DELAY: Duration = Duration::from_secs(1);
const ERROR_RETRY_DELAY: Duration = Duration::from_millis(100);

pub async fn run(
    config: Arc<RwLock<Configuration>>,
    reload_tx: mpsc::Sender<()>,
    mut shutdown: broadcast::Receiver<()>,
) {
    info!("event stream consumer starting");
    let client = proxyctl_common::http::client();

    loop {
        let errored = run_cycle(&client, &config, &reload_tx, &mut shutdown).await;

        let delay = if errored { ERROR_RETRY_DELAY } else { NORMAL_RETRY_DELAY };
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.recv() => {
                info!("event stream consumer shutting down");
                return;
            }
        }
    }
}

/// Runs one connect-and-read cycle. Returns `true` if the cycle ended in an
/// error (transport failure or watchdog timeout) rather than a clean close.
async fn run_cycle(
    client: &reqwest::Client,
    config: &Arc<RwLock<Configuration>>,
    reload_tx: &mpsc::Sender<()>,
    shutdown: &mut broadcast::Receiver<()>,
) -> bool {
    let (url, credentials) = {
        let guard = config.read().await;
        match guard.endpoints.first_healthy().await {
            Some((_, url)) => (url, guard.settings.credentials.clone()),
            None => {
                debug!("no healthy endpoint, skipping event stream cycle");
                return false;
            }
        }
    };

    let target = format!("{}/v2/events", url.trim_end_matches('/'));
    let builder = client.get(&target).header("Accept", "text/event-stream");
    let builder = proxyctl_common::http::with_credentials(builder, credentials.as_ref());

    let response = match builder.send().await {
        Ok(response) => response,
        Err(e) => {
            metrics::STREAM_ERRORS.inc();
            warn!(error = %e, "event stream connection failed");
            return true;
        }
    };

    if !response.status().is_success() {
        metrics::STREAM_ERRORS.inc();
        warn!(status = %response.status(), "event stream returned a non-success status");
        return true;
    }

    info!(url = %url, "event stream connected");
    read_lines(response, reload_tx, shutdown).await
}

/// Reads the response body line by line, resetting the watchdog on every
/// line (including blank and `data:` lines). Returns `true` on error.
async fn read_lines(
    response: reqwest::Response,
    reload_tx: &mpsc::Sender<()>,
    shutdown: &mut broadcast::Receiver<()>,
) -> bool {
    let mut stream = response.bytes_stream();
    let mut buffer = Vec::new();

    loop {
        let next = tokio::select! {
            next = tokio::time::timeout(WATCHDOG, stream.next()) => next,
            _ = shutdown.recv() => return false,
        };

        let chunk = match next {
            Ok(Some(Ok(chunk))) => chunk,
            Ok(Some(Err(e))) => {
                metrics::STREAM_ERRORS.inc();
                warn!(error = %e, "event stream read error");
                return true;
            }
            Ok(None) => {
                info!("event stream closed by orchestrator");
                return false;
            }
            Err(_) => {
                metrics::STREAM_NO_DATA_WARNINGS.inc();
                warn!("event stream watchdog fired, no data for 15s");
                return true;
            }
        };

        for line in split_lines(&mut buffer, chunk) {
            handle_line(&line, reload_tx);
        }
    }
}

/// Feeds newly received bytes into `buffer` and drains any complete `\n`
/// terminated lines out of it, leaving a trailing partial line buffered.
fn split_lines(buffer: &mut Vec<u8>, chunk: Bytes) -> Vec<String> {
    buffer.extend_from_slice(&chunk);

    let mut lines = Vec::new();
    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        let line: Vec<u8> = buffer.drain(..=pos).collect();
        let line = String::from_utf8_lossy(&line).trim_end().to_string();
        lines.push(line);
    }
    lines
}

fn handle_line(line: &str, reload_tx: &mpsc::Sender<()>) {
    let Some(event_name) = line.strip_prefix("event: ") else {
        return;
    };
    let event_name = event_name.trim();
    debug!(event = %event_name, "event stream received event");
    metrics::EVENTS_RECEIVED.inc();

    match reload_tx.try_send(()) {
        Ok(()) => {}
        Err(_) => warn!("reload queue is full, dropping reload token"),
    }
}
