//! Renderer / Validator / Swapper (component H): turns the current
//! Configuration into a reverse-proxy config file, checks its syntax, and
//! atomically swaps it in before telling the proxy to reload.
//!
//! Each stage records its own timestamp on `Configuration` and any failure
//! short-circuits the remaining stages — the on-disk config is only ever
//! replaced once validation against the temp file has already succeeded.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use handlebars::Handlebars;
use serde_json::json;
use tokio::process::Command;
use tokio::sync::RwLock;
use tracing::{error, info};

use proxyctl_common::{ProxyCtlError, Result};
use proxyctl_domain::Configuration;

const TEMPLATE_NAME: &str = "nginx";

pub async fn run(config: &Arc<RwLock<Configuration>>) -> Result<()> {
    let (template_src, left, right, argv, rendered_path, check_bypass) = {
        let guard = config.read().await;
        (
            std::fs::read_to_string(&guard.settings.template.path)?,
            guard.settings.template.left_delimiter.clone(),
            guard.settings.template.right_delimiter.clone(),
            guard.settings.proxy_argv(),
            guard.settings.proxy.rendered_config_path.clone(),
            guard.settings.proxy.check_bypass,
        )
    };

    let rendered = match render(&template_src, &left, &right, config).await {
        Ok(rendered) => {
            config.read().await.record_render_success(Utc::now()).await;
            rendered
        }
        Err(e) => {
            config.read().await.record_template_failure(e.to_string()).await;
            return Err(e);
        }
    };

    let parent = rendered_path.parent().ok_or_else(|| {
        ProxyCtlError::ConfigInvalid("rendered_config_path has no parent directory".to_string())
    })?;
    let temp_file = tempfile::Builder::new()
        .prefix(".nginx-proxyctl-")
        .tempfile_in(parent)?;
    std::fs::write(temp_file.path(), &rendered)?;

    if check_bypass {
        info!("skipping config validation: check_bypass is set");
    } else if let Err(e) = validate(&argv, temp_file.path()).await {
        config.read().await.record_validate_failure(e.to_string()).await;
        return Err(e);
    }

    if let Err(e) = temp_file.persist(&rendered_path) {
        let err = ProxyCtlError::RenameError(e.to_string());
        config.read().await.record_validate_failure(err.to_string()).await;
        return Err(err);
    }
    config.read().await.record_validate_success(Utc::now()).await;

    reload(&argv).await?;
    config.read().await.record_reload(Utc::now()).await;

    info!(path = %rendered_path.display(), "rendered config swapped in and reloaded");
    Ok(())
}

async fn render(
    template_src: &str,
    left: &str,
    right: &str,
    config: &Arc<RwLock<Configuration>>,
) -> Result<String> {
    let rewritten = rewrite_delimiters(template_src, left, right);

    let mut hb = Handlebars::new();
    hb.set_strict_mode(false);
    hb.register_template_string(TEMPLATE_NAME, rewritten)
        .map_err(|e| ProxyCtlError::TemplateParseError(e.to_string()))?;

    let guard = config.read().await;
    let context = json!({
        "xproxy": guard.settings.xproxy,
        "apps": guard.routing_table,
    });
    drop(guard);

    hb.render(TEMPLATE_NAME, &context)
        .map_err(|e| ProxyCtlError::TemplateExecuteError(e.to_string()))
}

/// Rewrites a custom `left`/`right` delimiter pair to handlebars' fixed
/// `{{ }}` so operators can keep templates written for the source's
/// `text/template` custom-delimiter support.
fn rewrite_delimiters(src: &str, left: &str, right: &str) -> String {
    if left == "{{" && right == "}}" {
        return src.to_string();
    }
    src.replace(left, "{{").replace(right, "}}")
}

async fn validate(argv: &[String], temp_path: &Path) -> Result<()> {
    let output = Command::new(&argv[0])
        .args(&argv[1..])
        .arg("-c")
        .arg(temp_path)
        .arg("-t")
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        error!(stderr = %stderr, "rendered config failed validation");
        return Err(ProxyCtlError::ConfigInvalid(stderr));
    }
    Ok(())
}

async fn reload(argv: &[String]) -> Result<()> {
    let output = Command::new(&argv[0])
        .args(&argv[1..])
        .arg("-s")
        .arg("reload")
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        error!(stderr = %stderr, "proxy reload command failed");
        return Err(ProxyCtlError::ReloadFailed(stderr));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxyctl_config::{ProxySettings, Settings, TemplateSettings};

    #[test]
    fn default_delimiters_are_a_no_op() {
        let src = "upstream {{ xproxy }} {}";
        assert_eq!(rewrite_delimiters(src, "{{", "}}"), src);
    }

    #[test]
    fn custom_delimiters_are_rewritten_to_handlebars() {
        let src = "upstream [[ xproxy ]] {}";
        assert_eq!(rewrite_delimiters(src, "[[", "]]"), "upstream {{ xproxy }} {}");
    }

    /// A validator pass followed by a failed swap must not leave
    /// `config_healthy`/`last_config_valid` looking like the swap succeeded.
    #[tokio::test]
    async fn rename_failure_does_not_mark_config_valid() {
        let dir = tempfile::tempdir().unwrap();
        let template_path = dir.path().join("nginx.tmpl");
        std::fs::write(&template_path, "upstream {{ xproxy }} {}").unwrap();

        // A rendered-config path that is itself an existing directory: the
        // final `persist()` rename can never succeed against it.
        let rendered_config_path = dir.path().join("rendered.conf");
        std::fs::create_dir(&rendered_config_path).unwrap();

        let settings = Settings {
            endpoints: vec!["http://127.0.0.1:1".to_string()],
            credentials: None,
            port: 0,
            xproxy: "host".to_string(),
            proxy: ProxySettings {
                command: "true".to_string(),
                rendered_config_path,
                check_bypass: true,
            },
            template: TemplateSettings {
                path: template_path,
                left_delimiter: "{{".to_string(),
                right_delimiter: "}}".to_string(),
            },
            metrics: Default::default(),
            legacy_host_sanitization: false,
        };

        let config = Arc::new(RwLock::new(Configuration::new(settings)));
        let err = run(&config).await.unwrap_err();
        assert!(matches!(err, ProxyCtlError::RenameError(_)));

        let guard = config.read().await;
        assert!(guard.last_config_valid().await.is_none());
        let snapshot = guard.health_snapshot(vec![]).await;
        assert!(!snapshot.config.healthy);
    }
}
