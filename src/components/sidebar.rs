//! App sidebar: identity header, conversation list, and sign-out.

use leptos::prelude::*;

use crate::components::conversation_card::ConversationCard;
use crate::state::chat::ChatState;
use crate::state::session::SessionState;
use crate::state::ui::UiState;

/// Sidebar listing conversations ordered by latest activity, with the
/// signed-in identity at the top and sign-out at the bottom.
#[component]
pub fn Sidebar() -> impl IntoView {
    let session = expect_context::<RwSignal<SessionState>>();
    let chat = expect_context::<RwSignal<ChatState>>();
    let ui = expect_context::<RwSignal<UiState>>();

    let signing_out = RwSignal::new(false);

    #[cfg(feature = "hydrate")]
    let api = crate::app::use_api();
    #[cfg(feature = "hydrate")]
    let navigate = leptos_router::hooks::use_navigate();

    let on_sign_out = move |_| {
        if signing_out.get() {
            return;
        }

        #[cfg(feature = "hydrate")]
        {
            use crate::net::client::SessionAccess;
            use crate::state::session::StoreSession;

            let api = api.clone();
            let navigate = navigate.clone();
            signing_out.set(true);
            leptos::task::spawn_local(async move {
                // Revoke the server-side session first, then clear local
                // state; local state is dropped even when the network call
                // fails, so the user is never stuck signed in.
                if let Err(err) = api.sign_out().await {
                    leptos::logging::warn!("sign out request failed: {err}");
                }
                StoreSession::new(session, chat).clear_session();
                signing_out.set(false);
                navigate("/signin", leptos_router::NavigateOptions::default());
            });
        }
    };

    let on_toggle_dark = move |_| {
        let next = crate::util::storage::toggle_dark_mode(ui.get_untracked().dark_mode);
        ui.update(|u| u.dark_mode = next);
    };

    let on_select = Callback::new(move |id: String| {
        chat.update(|c| c.active_conversation_id = Some(id));
    });

    let display_name = move || {
        session
            .get()
            .user
            .map_or_else(|| "...".to_owned(), |u| u.visible_name().to_owned())
    };

    let unread_badge = move || {
        let total = chat.get().unread_total();
        (total > 0).then(|| view! { <span class="sidebar__badge">{total}</span> })
    };

    let own_user_id = move || session.get().user.map(|u| u.id).unwrap_or_default();

    view! {
        <aside class="sidebar" class=("sidebar--collapsed", move || ui.get().sidebar_collapsed)>
            <header class="sidebar__header">
                <span class="sidebar__user">{display_name}</span>
                {unread_badge}
                <button class="sidebar__dark-toggle" on:click=on_toggle_dark title="Toggle dark mode">
                    {move || if ui.get().dark_mode { "\u{2600}" } else { "\u{263e}" }}
                </button>
            </header>

            <div class="sidebar__conversations">
                {move || {
                    let state = chat.get();
                    if state.loading && state.conversations.is_empty() {
                        return view! { <p class="sidebar__empty">"Loading conversations..."</p> }
                            .into_any();
                    }
                    if state.conversations.is_empty() {
                        return view! { <p class="sidebar__empty">"No conversations yet"</p> }
                            .into_any();
                    }

                    let active = state.active_conversation_id.clone();
                    let own = own_user_id();
                    state
                        .conversations
                        .into_iter()
                        .map(|conv| {
                            let is_active = active.as_deref() == Some(conv.id.as_str());
                            view! {
                                <ConversationCard
                                    conversation=conv
                                    own_user_id=own.clone()
                                    active=is_active
                                    on_select=on_select
                                />
                            }
                        })
                        .collect::<Vec<_>>()
                        .into_any()
                }}
            </div>

            <footer class="sidebar__footer">
                <button class="btn sidebar__signout" on:click=on_sign_out disabled=move || signing_out.get()>
                    {move || if signing_out.get() { "Signing out..." } else { "Sign out" }}
                </button>
            </footer>
        </aside>
    }
}
