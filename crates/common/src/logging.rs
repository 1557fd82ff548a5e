//! Structured logging setup.
//!
//! `RUST_LOG` controls verbosity the usual way (`RUST_LOG=debug`,
//! `RUST_LOG=proxyctl_controller=trace`, ...); defaults to `info` when unset.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Compact, human-readable output for local runs and terminals.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .compact(),
        )
        .init();
}

/// JSON output for environments that ship logs to an aggregator.
pub fn init_tracing_json() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_level(true)
                .with_current_span(true),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{error, info, warn};

    #[test]
    fn init_does_not_panic_on_repeated_calls() {
        let _result = std::panic::catch_unwind(|| {
            init_tracing();
        });

        info!("test log message");
        warn!(count = 42, "warning with structured data");
        error!(error = "test error", "error message");
    }
}
