//! Network layer: wire types, the authenticated client, and the typed API
//! gateway.
//!
//! DESIGN
//! ======
//! `client` owns the refresh protocol and is transport/session generic so it
//! tests natively. `gloo` is the browser transport (hydrate only). `api`
//! turns raw responses into typed results and performs no orchestration.

pub mod api;
pub mod client;
pub mod error;
#[cfg(feature = "hydrate")]
pub mod gloo;
pub mod types;
