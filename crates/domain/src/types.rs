//! Core routing types shared by the reconciler, renderer, and status server.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One orchestrator base URL and its current health bit.
///
/// Order reflects operator preference and never changes after startup; only
/// `healthy` and `message` mutate, and only from slot-scoped writes (see
/// [`crate::pool::EndpointPool`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub url: String,
    pub healthy: bool,
    pub message: String,
}

impl Endpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            healthy: true,
            message: String::new(),
        }
    }
}

/// An immutable projection of one orchestrator task, already filtered by the
/// reconciler's admission predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub host: String,
    pub ports: Vec<i64>,
    pub service_ports: Vec<i64>,
    pub staged_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PortDefinition {
    pub port: i64,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

/// The routing entry for one orchestrator app.
///
/// Invariants enforced by the reconciler, not by this type: `tasks` and
/// `hosts` are non-empty, and no host appears in more than one app's `hosts`
/// within the same routing table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    pub id: String,
    pub hosts: Vec<String>,
    pub labels: HashMap<String, String>,
    pub env: HashMap<String, String>,
    pub port_definitions: Vec<PortDefinition>,
    pub tasks: Vec<Task>,
}

/// Mapping from app id to [`App`]. Replaced wholesale each reconciliation
/// round that produces a different table; never mutated in place once
/// published.
pub type RoutingTable = HashMap<String, App>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub healthy: bool,
    pub message: String,
}

/// Derived on demand for the status server; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub config: ComponentHealth,
    pub template: ComponentHealth,
    pub endpoints: Vec<Endpoint>,
}
