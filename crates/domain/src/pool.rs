//! The ordered endpoint pool: a passive list of orchestrator base URLs with
//! per-entry health flags, mutated via slot-scoped locks so the prober never
//! has to contend with the outer [`crate::configuration::Configuration`] lock.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::types::Endpoint;

/// One pool entry. Wrapping the lock per-slot lets the prober update a
/// single endpoint's health without blocking readers of any other slot.
pub struct EndpointSlot {
    inner: RwLock<Endpoint>,
}

impl EndpointSlot {
    fn new(url: String) -> Self {
        Self { inner: RwLock::new(Endpoint::new(url)) }
    }

    pub async fn snapshot(&self) -> Endpoint {
        self.inner.read().await.clone()
    }

    pub async fn set_health(&self, healthy: bool, message: impl Into<String>) {
        let mut guard = self.inner.write().await;
        guard.healthy = healthy;
        guard.message = message.into();
    }
}

/// Ordered list of endpoint slots. Order reflects operator preference from
/// the configuration file and never changes after construction.
pub struct EndpointPool {
    slots: Vec<Arc<EndpointSlot>>,
}

impl EndpointPool {
    pub fn new(urls: &[String]) -> Self {
        Self {
            slots: urls.iter().cloned().map(EndpointSlot::new).map(Arc::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, index: usize) -> Option<&Arc<EndpointSlot>> {
        self.slots.get(index)
    }

    /// Cloned `Arc` handles to every slot, so a caller can release the outer
    /// `Configuration` lock before doing per-slot network I/O.
    pub fn slots_cloned(&self) -> Vec<Arc<EndpointSlot>> {
        self.slots.clone()
    }

    pub fn slots(&self) -> impl Iterator<Item = &Arc<EndpointSlot>> {
        self.slots.iter()
    }

    /// Lowest-index healthy entry, or `None` if every endpoint is down.
    /// Callers must fail with `AllEndpointsDown` on `None`.
    pub async fn first_healthy(&self) -> Option<(usize, String)> {
        for (index, slot) in self.slots.iter().enumerate() {
            let snapshot = slot.snapshot().await;
            if snapshot.healthy {
                return Some((index, snapshot.url));
            }
        }
        None
    }

    pub async fn snapshot_all(&self) -> Vec<Endpoint> {
        let mut out = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            out.push(slot.snapshot().await);
        }
        out
    }
}
