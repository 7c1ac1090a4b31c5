//! Session state: the access token and the authenticated user.
//!
//! INVARIANTS
//! ==========
//! The access token lives only in memory; the persistence record is an
//! explicit allow-list that carries the user identity and nothing else, so
//! a restarted client always comes up with `access_token = None` and must
//! refresh (or re-authenticate) before its first authenticated call
//! succeeds. Token and user are cleared together, never individually, on
//! sign-out or unrecoverable refresh failure.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use leptos::prelude::{RwSignal, Update, WithUntracked};
use serde::{Deserialize, Serialize};

use crate::net::client::SessionAccess;
use crate::net::types::User;
use crate::state::chat::ChatState;

/// In-memory session. Held in an `RwSignal` provided via context; mutated
/// only through the methods below.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub access_token: Option<String>,
    pub user: Option<User>,
    /// True while the session bootstrap (restore + `fetch_me`) is pending,
    /// so protected pages don't redirect before it settles.
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self { access_token: None, user: None, loading: true }
    }
}

impl SessionState {
    /// Replace the access token. Leaves `user` untouched; a refresh never
    /// implicitly repopulates the user record.
    pub fn set_access_token(&mut self, token: String) {
        self.access_token = Some(token);
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.user = user;
    }

    /// Drop token and user together.
    pub fn clear(&mut self) {
        self.access_token = None;
        self.user = None;
        self.loading = false;
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// The serialized shape allowed into durable storage. Constructed from a
/// [`SessionState`] by copying the user record only; there is no field the
/// token could travel in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedUser {
    pub user: User,
}

/// Serialize the persistable portion of the session, or `None` when no user
/// is signed in (the stored record is removed in that case).
pub fn persisted_record(state: &SessionState) -> Option<String> {
    let user = state.user.clone()?;
    serde_json::to_string(&PersistedUser { user }).ok()
}

/// Restore the user identity from a stored record. Tolerates garbage by
/// returning `None`.
pub fn restore_user(raw: &str) -> Option<User> {
    serde_json::from_str::<PersistedUser>(raw).ok().map(|p| p.user)
}

/// `Copy` handle over the session and chat signals, implementing the session
/// capability the authenticated client consumes.
#[derive(Clone, Copy)]
pub struct StoreSession {
    pub session: RwSignal<SessionState>,
    pub chat: RwSignal<ChatState>,
}

impl StoreSession {
    pub fn new(session: RwSignal<SessionState>, chat: RwSignal<ChatState>) -> Self {
        Self { session, chat }
    }
}

impl SessionAccess for StoreSession {
    fn access_token(&self) -> Option<String> {
        self.session.with_untracked(|s| s.access_token.clone())
    }

    fn set_access_token(&self, token: String) {
        self.session.update(|s| s.set_access_token(token));
    }

    /// Clear the session, cascade the reset to the chat store, and remove
    /// the persisted user record.
    fn clear_session(&self) {
        self.session.update(SessionState::clear);
        self.chat.update(ChatState::reset);
        crate::util::storage::clear_persisted_user();
    }
}
