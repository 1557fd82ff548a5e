//! Process-wide state: the loaded settings, the endpoint pool, and the
//! current routing table plus the timestamps operators see on `/v1/health`.
//!
//! The supervisor wraps this in `Arc<tokio::sync::RwLock<Configuration>>`,
//! and the reconciler takes that lock exclusively only for the instant it
//! swaps in a new `routing_table`. Render/validate/reload bookkeeping lives
//! behind its own inner lock (`render_state`) so the renderer never has to
//! contend with the reconciler for the outer lock — it only ever needs
//! shared access to read `settings`/`routing_table`.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use proxyctl_config::Settings;

use crate::pool::EndpointPool;
use crate::types::{ComponentHealth, Endpoint, HealthSnapshot, RoutingTable};

struct RenderState {
    last_config_rendered: Option<DateTime<Utc>>,
    last_config_valid: Option<DateTime<Utc>>,
    last_nginx_reload: Option<DateTime<Utc>>,
    config_healthy: bool,
    config_message: String,
    template_healthy: bool,
    template_message: String,
}

impl RenderState {
    fn new() -> Self {
        Self {
            last_config_rendered: None,
            last_config_valid: None,
            last_nginx_reload: None,
            config_healthy: true,
            config_message: String::new(),
            template_healthy: true,
            template_message: String::new(),
        }
    }
}

pub struct Configuration {
    pub settings: Settings,
    pub endpoints: EndpointPool,
    pub routing_table: RoutingTable,

    render_state: RwLock<RenderState>,
}

impl Configuration {
    pub fn new(settings: Settings) -> Self {
        let endpoints = EndpointPool::new(&settings.endpoints);
        Self {
            settings,
            endpoints,
            routing_table: RoutingTable::new(),
            render_state: RwLock::new(RenderState::new()),
        }
    }

    pub async fn record_render_success(&self, at: DateTime<Utc>) {
        let mut state = self.render_state.write().await;
        state.last_config_rendered = Some(at);
        state.template_healthy = true;
        state.template_message.clear();
    }

    pub async fn record_template_failure(&self, message: impl Into<String>) {
        let mut state = self.render_state.write().await;
        state.template_healthy = false;
        state.template_message = message.into();
    }

    pub async fn record_validate_success(&self, at: DateTime<Utc>) {
        let mut state = self.render_state.write().await;
        state.last_config_valid = Some(at);
        state.config_healthy = true;
        state.config_message.clear();
    }

    pub async fn record_validate_failure(&self, message: impl Into<String>) {
        let mut state = self.render_state.write().await;
        state.config_healthy = false;
        state.config_message = message.into();
    }

    pub async fn record_reload(&self, at: DateTime<Utc>) {
        self.render_state.write().await.last_nginx_reload = Some(at);
    }

    pub async fn last_config_rendered(&self) -> Option<DateTime<Utc>> {
        self.render_state.read().await.last_config_rendered
    }

    pub async fn last_config_valid(&self) -> Option<DateTime<Utc>> {
        self.render_state.read().await.last_config_valid
    }

    pub async fn last_nginx_reload(&self) -> Option<DateTime<Utc>> {
        self.render_state.read().await.last_nginx_reload
    }

    pub async fn health_snapshot(&self, endpoints: Vec<Endpoint>) -> HealthSnapshot {
        let state = self.render_state.read().await;
        HealthSnapshot {
            config: ComponentHealth {
                healthy: state.config_healthy,
                message: state.config_message.clone(),
            },
            template: ComponentHealth {
                healthy: state.template_healthy,
                message: state.template_message.clone(),
            },
            endpoints,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxyctl_config::{ProxySettings, Settings, TemplateSettings};
    use std::path::PathBuf;

    fn settings() -> Settings {
        Settings {
            endpoints: vec!["http://a".to_string()],
            credentials: None,
            port: 8080,
            xproxy: "host".to_string(),
            proxy: ProxySettings {
                command: "nginx".to_string(),
                rendered_config_path: PathBuf::from("/tmp/nginx.conf"),
                check_bypass: false,
            },
            template: TemplateSettings {
                path: PathBuf::from("/tmp/nginx.tmpl"),
                left_delimiter: "{{".to_string(),
                right_delimiter: "}}".to_string(),
            },
            metrics: Default::default(),
            legacy_host_sanitization: false,
        }
    }

    #[tokio::test]
    async fn starts_healthy_with_empty_table() {
        let config = Configuration::new(settings());
        assert!(config.routing_table.is_empty());
        let snapshot = config.health_snapshot(vec![]).await;
        assert!(snapshot.config.healthy);
        assert!(snapshot.template.healthy);
    }

    #[tokio::test]
    async fn validate_failure_surfaces_in_snapshot() {
        let config = Configuration::new(settings());
        config.record_validate_failure("nginx: [emerg] unexpected \"}\"").await;
        let snapshot = config.health_snapshot(vec![]).await;
        assert!(!snapshot.config.healthy);
        assert!(snapshot.config.message.contains("emerg"));
    }
}
