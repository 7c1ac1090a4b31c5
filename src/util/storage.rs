//! Browser localStorage access: the persisted user record and the dark-mode
//! preference. Requires a browser environment; every function degrades to a
//! no-op (or default) outside it.

use crate::net::types::User;
use crate::state::session::SessionState;
#[cfg(feature = "hydrate")]
use crate::state::session::{persisted_record, restore_user};

#[cfg(feature = "hydrate")]
const USER_KEY: &str = "converse_user";
#[cfg(feature = "hydrate")]
const DARK_KEY: &str = "converse_dark";

#[cfg(feature = "hydrate")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

/// Restore the persisted user identity, if any. The access token is never
/// stored, so a restored session always starts unauthenticated against the
/// backend until the first refresh.
pub fn load_persisted_user() -> Option<User> {
    #[cfg(feature = "hydrate")]
    {
        let raw = local_storage()?.get_item(USER_KEY).ok().flatten()?;
        restore_user(&raw)
    }
    #[cfg(not(feature = "hydrate"))]
    {
        None
    }
}

/// Write the allow-listed session record, or remove it when no user is
/// signed in.
pub fn store_persisted_user(state: &SessionState) {
    #[cfg(feature = "hydrate")]
    {
        let Some(storage) = local_storage() else { return };
        match persisted_record(state) {
            Some(record) => {
                let _ = storage.set_item(USER_KEY, &record);
            }
            None => {
                let _ = storage.remove_item(USER_KEY);
            }
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = state;
    }
}

/// Remove the persisted user record.
pub fn clear_persisted_user() {
    #[cfg(feature = "hydrate")]
    {
        if let Some(storage) = local_storage() {
            let _ = storage.remove_item(USER_KEY);
        }
    }
}

/// Read the dark-mode preference, falling back to the system preference
/// when nothing is stored.
pub fn read_dark_preference() -> bool {
    #[cfg(feature = "hydrate")]
    {
        if let Some(storage) = local_storage() {
            if let Ok(Some(val)) = storage.get_item(DARK_KEY) {
                return val == "true";
            }
        }
        web_sys::window()
            .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
            .is_some_and(|mq| mq.matches())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        false
    }
}

/// Apply or remove the `.dark-mode` class on `<html>`.
pub fn apply_dark_mode(enabled: bool) {
    #[cfg(feature = "hydrate")]
    {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
        {
            let class_list = el.class_list();
            if enabled {
                let _ = class_list.add_1("dark-mode");
            } else {
                let _ = class_list.remove_1("dark-mode");
            }
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = enabled;
    }
}

/// Toggle dark mode, persist the choice, and return the new value.
pub fn toggle_dark_mode(current: bool) -> bool {
    let next = !current;
    apply_dark_mode(next);
    #[cfg(feature = "hydrate")]
    {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(DARK_KEY, if next { "true" } else { "false" });
        }
    }
    next
}
