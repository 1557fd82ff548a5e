//! The error taxonomy every component reports through.
//!
//! Each variant maps to one of the failure categories every long-lived task
//! (prober, event consumer, reload worker) logs, counts, and recovers from on
//! its own schedule — none of them are retried eagerly, and none of them
//! terminate the process.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyCtlError {
    /// No endpoint in the pool is currently healthy.
    #[error("all endpoints are unhealthy")]
    AllEndpointsDown,

    /// A request could not even be constructed (bad URL, header value, ...).
    #[error("failed to build request: {0}")]
    RequestBuildError(String),

    /// The request was sent but failed in flight.
    #[error("transport error: {0}")]
    TransportError(#[from] reqwest::Error),

    /// The response body could not be decoded into the expected shape.
    #[error("failed to decode response: {0}")]
    DecodeError(String),

    /// The event stream watchdog fired; no bytes arrived within the window.
    #[error("event stream idle, watchdog canceled the request")]
    StreamIdle,

    /// The template failed to parse.
    #[error("failed to parse template: {0}")]
    TemplateParseError(String),

    /// The template parsed but failed while being evaluated.
    #[error("failed to render template: {0}")]
    TemplateExecuteError(String),

    /// The proxy binary's syntax-check invocation exited non-zero.
    #[error("rendered config failed validation: {0}")]
    ConfigInvalid(String),

    /// The atomic rename of the validated temp file over the live path failed.
    #[error("failed to swap rendered config into place: {0}")]
    RenameError(String),

    /// The proxy binary's reload invocation exited non-zero.
    #[error("proxy reload command failed: {0}")]
    ReloadFailed(String),

    /// Any other filesystem failure (reading the template, writing the temp
    /// file, spawning the proxy subprocess) that doesn't fit a category above.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProxyCtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_operator_facing_message() {
        let err = ProxyCtlError::ConfigInvalid("nginx: [emerg] unexpected \"}\"".to_string());
        assert!(err.to_string().contains("failed validation"));
    }

    #[test]
    fn all_endpoints_down_has_no_payload() {
        assert_eq!(ProxyCtlError::AllEndpointsDown.to_string(), "all endpoints are unhealthy");
    }
}
