//! Shared HTTP client construction.
//!
//! Every orchestrator-facing request (prober, event consumer, fetcher) goes
//! through a client built here so timeout and basic-auth handling stay in
//! one place.

use proxyctl_config::Credentials;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

/// Build a client with no default timeout — callers attach a per-request
/// timeout (`RequestBuilder::timeout`) since the prober, fetcher, and event
/// stream each need a different one.
pub fn client() -> Client {
    Client::builder()
        .build()
        .expect("building the default reqwest client should never fail")
}

/// Attach basic auth to a request when credentials are configured; a no-op
/// otherwise.
pub fn with_credentials(builder: RequestBuilder, credentials: Option<&Credentials>) -> RequestBuilder {
    match credentials {
        Some(c) => builder.basic_auth(&c.username, Some(&c.password)),
        None => builder,
    }
}

pub fn timeout(seconds: u64) -> Duration {
    Duration::from_secs(seconds)
}
