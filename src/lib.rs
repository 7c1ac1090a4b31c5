//! # converse-client
//!
//! Leptos + WASM frontend for the Converse chat application: sign-up,
//! sign-in, and email-verification flows, a token-refresh-aware HTTP
//! client, and the chat shell (sidebar, conversation list, message window)
//! backed by a small set of client-side stores. The backend is an external
//! REST service under `/api/v1`.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// Browser entry point: initialize logging and hydrate the app.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::hydrate_body(app::App);
}
