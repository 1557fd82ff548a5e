//! Shared infrastructure used by the controller and status server:
//! the error taxonomy, structured logging setup, the Prometheus registry,
//! and a small HTTP client helper for basic-auth.

pub mod error;
pub mod http;
pub mod logging;
pub mod metrics;

pub use error::{ProxyCtlError, Result};
pub use logging::{init_tracing, init_tracing_json};
