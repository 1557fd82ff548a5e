//! Endpoint Health Prober (component B): periodically GETs each endpoint's
//! `/ping` and writes the result straight into its pool slot.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

use proxyctl_common::metrics;
use proxyctl_domain::Configuration;

const PROBE_INTERVAL: Duration = Duration::from_secs(2);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn run(config: Arc<RwLock<Configuration>>, mut shutdown: broadcast::Receiver<()>) {
    info!("endpoint prober starting");
    let client = proxyctl_common::http::client();
    let mut interval = tokio::time::interval(PROBE_INTERVAL);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                probe_once(&client, &config).await;
            }
            _ = shutdown.recv() => {
                info!("endpoint prober shutting down");
                break;
            }
        }
    }
}

async fn probe_once(client: &reqwest::Client, config: &Arc<RwLock<Configuration>>) {
    let slots = {
        let guard = config.read().await;
        guard.endpoints.slots_cloned()
    };

    let mut any_healthy = false;
    for slot in &slots {
        let before = slot.snapshot().await;
        let target = format!("{}/ping", before.url.trim_end_matches('/'));

        let (healthy, message) = match tokio::time::timeout(PROBE_TIMEOUT, client.get(&target).send()).await {
            Ok(Ok(response)) if response.status() == reqwest::StatusCode::OK => (true, "OK".to_string()),
            Ok(Ok(response)) => (false, format!("unexpected status {}", response.status())),
            Ok(Err(e)) => (false, e.to_string()),
            Err(_) => (false, "ping timed out".to_string()),
        };

        if before.healthy && !healthy {
            metrics::ENDPOINT_DOWN_EVENTS.inc();
            warn!(endpoint = %before.url, message = %message, "endpoint became unhealthy");
        }

        slot.set_health(healthy, message).await;
        any_healthy |= healthy;
    }

    if !slots.is_empty() && !any_healthy {
        metrics::ALL_ENDPOINTS_DOWN_EVENTS.inc();
        warn!("all endpoints are unhealthy");
    }
}
