//! Top-level routed pages.

pub mod chat;
pub mod signin;
pub mod signup;
pub mod verify;
