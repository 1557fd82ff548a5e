//! The embedded HTTP status server (component I): a thin read surface over
//! the shared Configuration plus a non-blocking trigger into the Reload
//! Queue. Owns no state beyond what it's handed at construction.

mod handlers;
mod metrics_middleware;
mod router;
mod state;
mod views;

pub use router::router;
pub use state::AppState;
pub use views::{ConfigView, HealthView, StatsView};
