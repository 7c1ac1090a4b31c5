//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! State is split by domain (`session`, `chat`, `ui`) so individual
//! components can depend on small focused models. Each state struct is a
//! plain value held in an `RwSignal` provided via context at the app root;
//! the session additionally exposes a `StoreSession` capability handle for
//! the network layer.

pub mod chat;
pub mod session;
pub mod ui;
