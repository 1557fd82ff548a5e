//! Integration tests across crate boundaries: a mocked orchestrator HTTP API
//! (via `wiremock`) feeding the Fetcher and the embedded status server.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use proxyctl_config::{ProxySettings, Settings, TemplateSettings};
use proxyctl_domain::Configuration;
use serde_json::json;
use tokio::sync::{mpsc, RwLock};
use tower::util::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(endpoint: String) -> Settings {
    Settings {
        endpoints: vec![endpoint],
        credentials: None,
        port: 0,
        xproxy: "host".to_string(),
        proxy: ProxySettings {
            command: "true".to_string(),
            rendered_config_path: PathBuf::from("/tmp/proxyctl-test-nginx.conf"),
            check_bypass: true,
        },
        template: TemplateSettings {
            path: PathBuf::from("/tmp/proxyctl-test.tmpl"),
            left_delimiter: "{{".to_string(),
            right_delimiter: "}}".to_string(),
        },
        metrics: Default::default(),
        legacy_host_sanitization: false,
    }
}

fn apps_envelope() -> serde_json::Value {
    json!({
        "apps": [{
            "id": "/a/b",
            "labels": {},
            "env": {},
            "healthChecks": [],
            "portDefinitions": [{"port": 31000, "protocol": "tcp", "labels": {}}],
            "tasks": [{
                "appId": "/a/b",
                "host": "h1",
                "id": "task-1",
                "ports": [31000],
                "servicePorts": [31000],
                "stagedAt": "2026-01-01T00:00:00Z",
                "startedAt": "2026-01-01T00:00:01Z",
                "version": "2026-01-01T00:00:00Z",
                "healthCheckResults": []
            }]
        }]
    })
}

#[tokio::test]
async fn fetcher_decodes_apps_envelope_from_first_healthy_endpoint() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/apps"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(apps_envelope()))
        .mount(&mock_server)
        .await;

    let config = Arc::new(RwLock::new(Configuration::new(settings_for(mock_server.uri()))));
    let client = proxyctl_common::http::client();

    let envelope = proxyctl_controller::fetcher::fetch(&client, &config).await.unwrap();
    assert_eq!(envelope.apps.len(), 1);
    assert_eq!(envelope.apps[0].id, "/a/b");
    assert_eq!(envelope.apps[0].tasks.len(), 1);
}

#[tokio::test]
async fn fetcher_fails_fast_when_every_endpoint_is_unhealthy() {
    let config = Arc::new(RwLock::new(Configuration::new(settings_for("http://127.0.0.1:1".to_string()))));
    config.read().await.endpoints.slot(0).unwrap().set_health(false, "down").await;

    let client = proxyctl_common::http::client();
    let err = proxyctl_controller::fetcher::fetch(&client, &config).await.unwrap_err();
    assert_eq!(err.to_string(), "all endpoints are unhealthy");
}

#[tokio::test]
async fn fetch_then_reconcile_admits_the_single_task() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/apps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(apps_envelope()))
        .mount(&mock_server)
        .await;

    let config = Arc::new(RwLock::new(Configuration::new(settings_for(mock_server.uri()))));
    let client = proxyctl_common::http::client();
    let envelope = proxyctl_controller::fetcher::fetch(&client, &config).await.unwrap();

    let outcome = {
        let guard = config.read().await;
        proxyctl_domain::reconcile(&envelope, &guard.routing_table, guard.settings.legacy_host_sanitization)
    };

    assert!(!outcome.equal);
    let app = outcome.table.get("/a/b").expect("app should be admitted");
    assert_eq!(app.hosts, vec!["b.a".to_string()]);
    assert_eq!(app.tasks.len(), 1);
}

#[tokio::test]
async fn status_server_health_endpoint_reflects_endpoint_pool() {
    let (tx, _rx) = mpsc::channel(2);
    let config = Arc::new(RwLock::new(Configuration::new(settings_for("http://10.0.0.1:8080".to_string()))));
    let state = proxyctl_status_api::AppState::new(config.clone(), tx);
    let router = proxyctl_status_api::router(state);

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    config.read().await.endpoints.slot(0).unwrap().set_health(false, "timeout").await;
    let response = router
        .oneshot(Request::builder().uri("/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
