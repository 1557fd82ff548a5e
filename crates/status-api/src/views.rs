//! JSON shapes returned by the status server. Kept separate from the
//! domain types so elision (credentials, on-disk paths) happens at the
//! serialization boundary instead of on the live `Configuration`.

use std::collections::HashMap;

use proxyctl_domain::{App, Configuration, Endpoint};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ConfigView {
    pub endpoints: Vec<String>,
    pub port: u16,
    pub xproxy: String,
    pub has_credentials: bool,
    pub check_bypass: bool,
    pub template_left_delimiter: String,
    pub template_right_delimiter: String,
    pub legacy_host_sanitization: bool,
    pub routing_table: HashMap<String, App>,
}

impl ConfigView {
    pub fn from_configuration(config: &Configuration) -> Self {
        Self {
            endpoints: config.settings.endpoints.clone(),
            port: config.settings.port,
            xproxy: config.settings.xproxy.clone(),
            has_credentials: config.settings.credentials.is_some(),
            check_bypass: config.settings.proxy.check_bypass,
            template_left_delimiter: config.settings.template.left_delimiter.clone(),
            template_right_delimiter: config.settings.template.right_delimiter.clone(),
            legacy_host_sanitization: config.settings.legacy_host_sanitization,
            routing_table: config.routing_table.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthView {
    pub healthy: bool,
    pub config: proxyctl_domain::ComponentHealth,
    pub template: proxyctl_domain::ComponentHealth,
    pub endpoints: Vec<Endpoint>,
}

#[derive(Debug, Serialize)]
pub struct StatsView {
    pub events_received: i64,
    pub reloads_succeeded: i64,
    pub reloads_failed: i64,
    pub stream_errors: i64,
    pub stream_no_data_warnings: i64,
    pub duplicate_subdomain_warnings: i64,
    pub endpoint_down_events: i64,
    pub all_endpoints_down_events: i64,
}
