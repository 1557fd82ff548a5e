//! Configuration file parsing and CLI flags.
//!
//! Settings are loaded once at startup from a TOML file (default `nixy.toml`)
//! and never reloaded — the source's package-level `var config Config`
//! becomes a plain value constructed here and threaded through the
//! supervisor by the caller.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Deserialize;

pub mod cli;

pub use cli::Cli;

/// Root of the TOML configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Ordered orchestrator base URLs. Order reflects operator preference
    /// and never changes after startup.
    pub endpoints: Vec<String>,

    /// Basic-auth credentials attached to every outbound request, if set.
    #[serde(default)]
    pub credentials: Option<Credentials>,

    /// Port the embedded status server listens on.
    pub port: u16,

    /// `Xproxy` identifier; defaults to the host name when left empty.
    #[serde(default)]
    pub xproxy: String,

    pub proxy: ProxySettings,
    pub template: TemplateSettings,

    #[serde(default)]
    pub metrics: MetricsSettings,

    /// Opt-in to the legacy `[^0-9a-z-]` regex host sanitization instead of
    /// the segment-reversal host derivation rule.
    #[serde(default)]
    pub legacy_host_sanitization: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProxySettings {
    /// Whitespace-split invocation of the reverse-proxy binary, e.g.
    /// `"nginx"` or `"docker exec nginx nginx"`. The validator/reloader
    /// append their own trailing arguments.
    pub command: String,

    /// Final rendered configuration path. Must share a filesystem with its
    /// parent directory so the temp-file swap can be an atomic rename.
    pub rendered_config_path: PathBuf,

    /// Skip the syntax-check invocation before swapping. Exists for
    /// environments where the proxy binary can't be invoked out-of-band;
    /// using it forfeits the "on-disk config always valid" guarantee.
    #[serde(default)]
    pub check_bypass: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSettings {
    pub path: PathBuf,

    #[serde(default = "default_left_delim")]
    pub left_delimiter: String,

    #[serde(default = "default_right_delim")]
    pub right_delimiter: String,
}

fn default_left_delim() -> String {
    "{{".to_string()
}

fn default_right_delim() -> String {
    "}}".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// Backend address (e.g. a statsd collector) events are optionally
    /// mirrored to. Prometheus counters are always registered locally and
    /// exposed over the status server regardless of this setting.
    #[serde(default)]
    pub address: Option<String>,

    #[serde(default = "default_metrics_namespace")]
    pub namespace: String,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: f64,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            address: None,
            namespace: default_metrics_namespace(),
            sample_rate: default_sample_rate(),
        }
    }
}

fn default_metrics_namespace() -> String {
    "proxyctl".to_string()
}

fn default_sample_rate() -> f64 {
    1.0
}

impl Settings {
    /// Load and validate settings from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let mut settings: Settings =
            toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))?;

        if settings.endpoints.is_empty() {
            bail!("config: at least one endpoint must be configured");
        }
        if settings.xproxy.trim().is_empty() {
            settings.xproxy = hostname_fallback();
        }

        Ok(settings)
    }

    /// Whitespace-split proxy command: first token is the executable, the
    /// rest are prefix arguments the validator/reloader append to.
    pub fn proxy_argv(&self) -> Vec<String> {
        self.proxy
            .command
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

fn hostname_fallback() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string())
}

/// Parse CLI flags. Kept separate from `Settings::load` so `-v` can print
/// and exit without ever touching the filesystem.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_toml() -> &'static str {
        r#"
            endpoints = ["http://10.0.0.1:8080", "http://10.0.0.2:8080"]
            port = 8080

            [proxy]
            command = "nginx"
            rendered_config_path = "/etc/nginx/nginx.conf"

            [template]
            path = "/etc/nixy/nginx.tmpl"
        "#
    }

    #[test]
    fn loads_minimal_config_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nixy.toml");
        std::fs::write(&path, sample_toml()).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.endpoints.len(), 2);
        assert_eq!(settings.template.left_delimiter, "{{");
        assert_eq!(settings.template.right_delimiter, "}}");
        assert!(!settings.legacy_host_sanitization);
        assert!(!settings.xproxy.is_empty());
        assert_eq!(settings.proxy_argv(), vec!["nginx".to_string()]);
    }

    #[test]
    fn rejects_empty_endpoint_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nixy.toml");
        std::fs::write(
            &path,
            r#"
                endpoints = []
                port = 8080
                [proxy]
                command = "nginx"
                rendered_config_path = "/etc/nginx/nginx.conf"
                [template]
                path = "/etc/nixy/nginx.tmpl"
            "#,
        )
        .unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(err.to_string().contains("at least one endpoint"));
    }

    #[test]
    fn splits_wrapped_proxy_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nixy.toml");
        std::fs::write(
            &path,
            r#"
                endpoints = ["http://10.0.0.1:8080"]
                port = 8080
                [proxy]
                command = "docker exec nginx nginx"
                rendered_config_path = "/etc/nginx/nginx.conf"
                [template]
                path = "/etc/nixy/nginx.tmpl"
            "#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(
            settings.proxy_argv(),
            vec!["docker".to_string(), "exec".to_string(), "nginx".to_string(), "nginx".to_string()]
        );
    }
}
