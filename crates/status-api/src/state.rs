//! Shared axum state: a read handle onto the Configuration and a sender
//! into the Reload Queue (D). The server shares no other state.

use std::sync::Arc;

use proxyctl_domain::Configuration;
use tokio::sync::{mpsc, RwLock};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Configuration>>,
    pub reload_tx: mpsc::Sender<()>,
}

impl AppState {
    pub fn new(config: Arc<RwLock<Configuration>>, reload_tx: mpsc::Sender<()>) -> Self {
        Self { config, reload_tx }
    }
}
