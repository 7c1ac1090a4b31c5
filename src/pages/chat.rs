//! Main chat shell: sidebar with conversations plus the message window.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::components::chat_window::ChatWindow;
use crate::components::notice_bar::NoticeBar;
use crate::components::sidebar::Sidebar;
use crate::state::chat::ChatState;
use crate::state::session::SessionState;

/// Protected chat shell. Redirects to `/signin` once the session bootstrap
/// settles without a user; otherwise loads the conversation list and renders
/// the sidebar and the active conversation window.
#[component]
pub fn ChatPage() -> impl IntoView {
    let session = expect_context::<RwSignal<SessionState>>();
    let chat = expect_context::<RwSignal<ChatState>>();
    let navigate = use_navigate();

    Effect::new(move || {
        let state = session.get();
        if !state.loading && !state.is_authenticated() {
            navigate("/signin", NavigateOptions::default());
        }
    });

    #[cfg(not(feature = "hydrate"))]
    let _ = chat;

    #[cfg(feature = "hydrate")]
    {
        let api = crate::app::use_api();
        let fetched_for = RwSignal::new(None::<String>);

        // Fetch conversations once per signed-in user; a sign-out resets the
        // chat store and `fetched_for` ensures the next user refetches.
        Effect::new(move || {
            let Some(user_id) = session.get().user.map(|u| u.id) else {
                fetched_for.set(None);
                return;
            };
            if fetched_for.get().as_deref() == Some(user_id.as_str()) {
                return;
            }
            fetched_for.set(Some(user_id));

            let api = api.clone();
            chat.update(|c| c.loading = true);
            leptos::task::spawn_local(async move {
                match api.fetch_conversations().await {
                    Ok(conversations) => chat.update(|c| {
                        c.set_conversations(conversations);
                        c.loading = false;
                    }),
                    Err(err) => {
                        leptos::logging::warn!("fetching conversations failed: {err}");
                        chat.update(|c| c.loading = false);
                    }
                }
            });
        });
    }

    view! {
        <div class="chat-page">
            <NoticeBar/>
            <Sidebar/>
            <main class="chat-page__main">
                <ChatWindow/>
            </main>
        </div>
    }
}
