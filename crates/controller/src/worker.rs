//! Reload Worker (component E): paces reload attempts to at most one per
//! second and runs the fetch → reconcile → render/validate/swap/reload
//! pipeline serially, so reloads never overlap.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{error, info};

use proxyctl_common::metrics;
use proxyctl_domain::{reconcile, Configuration};

use crate::{fetcher, render};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

pub async fn run(
    config: Arc<RwLock<Configuration>>,
    mut reload_rx: mpsc::Receiver<()>,
    mut shutdown: broadcast::Receiver<()>,
) {
    info!("reload worker starting");
    let client = proxyctl_common::http::client();
    let mut ticker = tokio::time::interval(TICK_INTERVAL);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tokio::select! {
                    Some(()) = reload_rx.recv() => {
                        run_one_reload(&client, &config).await;
                    }
                    _ = shutdown.recv() => {
                        info!("reload worker shutting down");
                        return;
                    }
                }
            }
            _ = shutdown.recv() => {
                info!("reload worker shutting down");
                return;
            }
        }
    }
}

async fn run_one_reload(client: &reqwest::Client, config: &Arc<RwLock<Configuration>>) {
    let timer = metrics::RELOAD_DURATION.start_timer();

    let envelope = match fetcher::fetch(client, config).await {
        Ok(envelope) => envelope,
        Err(e) => {
            metrics::RELOADS_FAILED.inc();
            error!(error = %e, "reload pipeline failed at fetch");
            timer.stop_and_discard();
            return;
        }
    };

    let outcome = {
        let guard = config.read().await;
        let legacy = guard.settings.legacy_host_sanitization;
        reconcile(&envelope, &guard.routing_table, legacy)
    };

    if outcome.duplicate_warnings > 0 {
        metrics::DUPLICATE_SUBDOMAIN_WARNINGS.inc_by(outcome.duplicate_warnings);
    }

    if outcome.equal {
        info!("reconciler reports no change, skipping render");
        metrics::RELOADS_SUCCEEDED.inc();
        timer.stop_and_discard();
        return;
    }

    {
        let mut guard = config.write().await;
        guard.routing_table = outcome.table;
    }

    match render::run(config).await {
        Ok(()) => {
            metrics::RELOADS_SUCCEEDED.inc();
            timer.observe_duration();
        }
        Err(e) => {
            metrics::RELOADS_FAILED.inc();
            error!(error = %e, "reload pipeline failed at render/validate/swap/reload");
            timer.stop_and_discard();
        }
    }
}
