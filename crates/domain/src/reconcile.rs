//! The reconciliation algorithm: tasks-with-apps document in, routing table
//! out. Pure function, no I/O, no locking — the caller owns the compare-and-swap
//! against the published table.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::types::{App, PortDefinition, RoutingTable, Task};
use crate::wire::{AppsEnvelope, WireApp, WirePortDefinition};

/// Result of one reconciliation round.
pub struct ReconcileOutcome {
    pub table: RoutingTable,
    /// `true` when `table` is structurally equal to the table passed in as
    /// `current`. Callers only need to render/swap when this is `false`.
    pub equal: bool,
    /// Count of apps dropped this round because their derived hosts
    /// collided with an already-accepted app's hosts.
    pub duplicate_warnings: u64,
}

/// Build a new routing table from a decoded apps-with-tasks document and
/// compare it against `current`.
///
/// `legacy_host_sanitization` selects between the default segment-reversal
/// host derivation and the legacy regex-strip behavior kept for operators
/// migrating existing templates.
pub fn reconcile(
    envelope: &AppsEnvelope,
    current: &RoutingTable,
    legacy_host_sanitization: bool,
) -> ReconcileOutcome {
    let mut table: RoutingTable = HashMap::new();
    let mut seen_hosts: HashSet<String> = HashSet::new();
    let mut duplicate_warnings = 0u64;

    for wire_app in &envelope.apps {
        let Some(tasks) = admitted_tasks(wire_app) else {
            continue;
        };

        let mut hosts = derive_hosts(wire_app, legacy_host_sanitization);
        if hosts.is_empty() {
            continue;
        }

        if hosts.iter().any(|h| seen_hosts.contains(h)) {
            duplicate_warnings += 1;
            hosts.clear();
        }
        if hosts.is_empty() {
            continue;
        }

        for host in &hosts {
            seen_hosts.insert(host.clone());
        }

        table.insert(
            wire_app.id.clone(),
            App {
                id: wire_app.id.clone(),
                hosts,
                labels: wire_app.labels.clone(),
                env: wire_app.env.clone(),
                port_definitions: wire_app.port_definitions.iter().map(convert_port_definition).collect(),
                tasks,
            },
        );
    }

    let equal = table == *current;
    ReconcileOutcome {
        table,
        equal,
        duplicate_warnings,
    }
}

/// Returns `None` when every task in the app is rejected (the app itself is
/// then dropped).
fn admitted_tasks(wire_app: &WireApp) -> Option<Vec<Task>> {
    let has_health_checks = !wire_app.health_checks.is_empty();

    let mut tasks = Vec::new();
    for wire_task in &wire_app.tasks {
        if wire_task.ports.is_empty() {
            continue;
        }
        if has_health_checks {
            if wire_task.health_check_results.is_empty() {
                continue;
            }
            if !wire_task.health_check_results.iter().all(|r| r.alive) {
                continue;
            }
        }
        tasks.push(Task {
            host: wire_task.host.clone(),
            ports: wire_task.ports.clone(),
            service_ports: wire_task.service_ports.clone(),
            staged_at: parse_timestamp(&wire_task.staged_at),
            started_at: parse_timestamp(&wire_task.started_at),
            version: wire_task.version.clone(),
        });
    }

    if tasks.is_empty() { None } else { Some(tasks) }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc))
}

fn convert_port_definition(raw: &WirePortDefinition) -> PortDefinition {
    PortDefinition {
        port: raw.port,
        protocol: raw.protocol.clone(),
        labels: raw.labels.clone(),
    }
}

fn derive_hosts(wire_app: &WireApp, legacy_host_sanitization: bool) -> Vec<String> {
    if let Some(value) = wire_app.labels.get("subdomain") {
        return split_label_hosts(value);
    }
    // Compatibility with an older label name; treated identically.
    if let Some(value) = wire_app.labels.get("moxy_subdomain") {
        return split_label_hosts(value);
    }

    if legacy_host_sanitization {
        derive_host_legacy(&wire_app.id)
    } else {
        derive_host_from_id(&wire_app.id)
    }
}

fn split_label_hosts(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

/// Default derivation: strip the leading `/`, split on `/`, reverse the
/// segments, join with `.`. `/project/app` becomes `app.project`.
fn derive_host_from_id(id: &str) -> Vec<String> {
    let trimmed = id.trim_start_matches('/');
    if trimmed.is_empty() {
        return Vec::new();
    }
    let mut segments: Vec<&str> = trimmed.split('/').collect();
    segments.reverse();
    vec![segments.join(".")]
}

/// Legacy derivation kept for operators with templates tuned to the old
/// flat-id behavior: strip every character outside `[0-9a-z-]` from the raw
/// id, with no segment reversal.
fn derive_host_legacy(id: &str) -> Vec<String> {
    let sanitized: String = id
        .chars()
        .filter(|c| c.is_ascii_digit() || c.is_ascii_lowercase() || *c == '-')
        .collect();
    if sanitized.is_empty() { Vec::new() } else { vec![sanitized] }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{HealthCheckResult, WireTask};

    fn task(host: &str, ports: Vec<i64>) -> WireTask {
        WireTask {
            app_id: String::new(),
            host: host.to_string(),
            id: String::new(),
            ports,
            service_ports: vec![],
            staged_at: String::new(),
            started_at: String::new(),
            version: String::new(),
            health_check_results: vec![],
        }
    }

    fn app(id: &str, labels: HashMap<String, String>, health_checks: bool, tasks: Vec<WireTask>) -> WireApp {
        WireApp {
            id: id.to_string(),
            labels,
            env: HashMap::new(),
            health_checks: if health_checks { vec![serde_json::json!({})] } else { vec![] },
            port_definitions: vec![],
            tasks,
        }
    }

    #[test]
    fn s1_single_app_reversed_hosts() {
        let envelope = AppsEnvelope {
            apps: vec![app("/a/b", HashMap::new(), false, vec![task("h1", vec![31000])])],
        };
        let outcome = reconcile(&envelope, &RoutingTable::new(), false);
        assert!(!outcome.equal);
        let entry = outcome.table.get("/a/b").unwrap();
        assert_eq!(entry.hosts, vec!["b.a".to_string()]);
        assert_eq!(entry.tasks[0].host, "h1");
        assert_eq!(entry.tasks[0].ports, vec![31000]);
    }

    #[test]
    fn s2_failing_health_check_drops_app() {
        let mut failing = task("h1", vec![31000]);
        failing.health_check_results = vec![
            HealthCheckResult { alive: false },
            HealthCheckResult { alive: true },
        ];
        let envelope = AppsEnvelope {
            apps: vec![app("/a/b", HashMap::new(), true, vec![failing])],
        };
        let outcome = reconcile(&envelope, &RoutingTable::new(), false);
        assert!(outcome.table.is_empty());
    }

    #[test]
    fn s3_duplicate_subdomain_label_drops_second_app() {
        let mut labels = HashMap::new();
        labels.insert("subdomain".to_string(), "foo".to_string());
        let envelope = AppsEnvelope {
            apps: vec![
                app("/a", labels.clone(), false, vec![task("h1", vec![1000])]),
                app("/b", labels, false, vec![task("h2", vec![1001])]),
            ],
        };
        let outcome = reconcile(&envelope, &RoutingTable::new(), false);
        assert!(outcome.table.contains_key("/a"));
        assert!(!outcome.table.contains_key("/b"));
        assert_eq!(outcome.duplicate_warnings, 1);
    }

    #[test]
    fn s4_idempotent_second_call_is_equal() {
        let envelope = AppsEnvelope {
            apps: vec![app("/a/b", HashMap::new(), false, vec![task("h1", vec![31000])])],
        };
        let first = reconcile(&envelope, &RoutingTable::new(), false);
        assert!(!first.equal);
        let second = reconcile(&envelope, &first.table, false);
        assert!(second.equal);
        assert_eq!(second.table, first.table);
    }

    #[test]
    fn admission_requires_ports() {
        let envelope = AppsEnvelope {
            apps: vec![app("/a", HashMap::new(), false, vec![task("h1", vec![])])],
        };
        let outcome = reconcile(&envelope, &RoutingTable::new(), false);
        assert!(outcome.table.is_empty());
    }

    #[test]
    fn single_segment_id_has_no_dot() {
        assert_eq!(derive_host_from_id("/x"), vec!["x".to_string()]);
        assert_eq!(derive_host_from_id("/a/b/c"), vec!["c.b.a".to_string()]);
    }

    #[test]
    fn legacy_sanitization_strips_slashes() {
        assert_eq!(derive_host_legacy("/a/b-c"), vec!["ab-c".to_string()]);
    }
}
