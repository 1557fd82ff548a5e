//! Fetcher (component F): a single-shot GET against the first healthy
//! endpoint's `/v2/apps?embed=apps.tasks`, decoded into the wire envelope
//! the reconciler consumes.

use std::sync::Arc;
use std::time::Duration;

use proxyctl_common::{http, ProxyCtlError, Result};
use proxyctl_domain::{AppsEnvelope, Configuration};
use tokio::sync::RwLock;

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn fetch(client: &reqwest::Client, config: &Arc<RwLock<Configuration>>) -> Result<AppsEnvelope> {
    let (url, credentials) = {
        let guard = config.read().await;
        let Some((_, url)) = guard.endpoints.first_healthy().await else {
            return Err(ProxyCtlError::AllEndpointsDown);
        };
        (url, guard.settings.credentials.clone())
    };

    let target = format!("{}/v2/apps?embed=apps.tasks", url.trim_end_matches('/'));
    let builder = client
        .get(&target)
        .header("Accept", "application/json")
        .timeout(FETCH_TIMEOUT);
    let builder = http::with_credentials(builder, credentials.as_ref());

    let response = builder.send().await?;
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ProxyCtlError::DecodeError(e.to_string()))
}
