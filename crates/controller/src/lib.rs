//! Components A, B, C, D, E, F, G, H of the supervisor binary, exposed as a
//! library so integration tests can exercise them without spawning a real
//! `proxyctl` process.

pub mod events;
pub mod fetcher;
pub mod prober;
pub mod render;
pub mod worker;
