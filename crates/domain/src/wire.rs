//! Wire shapes for the orchestrator's `GET /v2/apps?embed=apps.tasks` envelope.
//!
//! These mirror the JSON exactly (camelCase field names and all) and are
//! never exposed outside the fetch/reconcile boundary — the reconciler turns
//! them into the stable [`crate::types`] shapes.

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppsEnvelope {
    #[serde(default)]
    pub apps: Vec<WireApp>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireApp {
    pub id: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default, rename = "healthChecks")]
    pub health_checks: Vec<serde_json::Value>,
    #[serde(default, rename = "portDefinitions")]
    pub port_definitions: Vec<WirePortDefinition>,
    #[serde(default)]
    pub tasks: Vec<WireTask>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WirePortDefinition {
    pub port: i64,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireTask {
    #[serde(default, rename = "appId")]
    pub app_id: String,
    pub host: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub ports: Vec<i64>,
    #[serde(default, rename = "servicePorts")]
    pub service_ports: Vec<i64>,
    #[serde(default, rename = "stagedAt")]
    pub staged_at: String,
    #[serde(default, rename = "startedAt")]
    pub started_at: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, rename = "healthCheckResults")]
    pub health_check_results: Vec<HealthCheckResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthCheckResult {
    pub alive: bool,
}
