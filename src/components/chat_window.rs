//! Message window for the active conversation: history plus input row.

use leptos::prelude::*;

use crate::state::chat::ChatState;
use crate::state::session::SessionState;
use crate::state::ui::UiState;

/// Chat window showing the active conversation's history and an input for
/// sending new messages. History is fetched lazily, once per conversation.
#[component]
pub fn ChatWindow() -> impl IntoView {
    let session = expect_context::<RwSignal<SessionState>>();
    let chat = expect_context::<RwSignal<ChatState>>();
    let ui = expect_context::<RwSignal<UiState>>();

    let input = RwSignal::new(String::new());
    let sending = RwSignal::new(false);
    let messages_ref = NodeRef::<leptos::html::Div>::new();

    // Stored locally so the `Copy` handle can ride along in every closure.
    #[cfg(feature = "hydrate")]
    let api = StoredValue::new_local(crate::app::use_api());
    #[cfg(not(feature = "hydrate"))]
    let _ = ui;

    #[cfg(feature = "hydrate")]
    {
        let loaded_for = RwSignal::new(None::<String>);

        // Load history when the selection moves to a conversation we have
        // not cached yet.
        Effect::new(move || {
            let Some(conversation_id) = chat.get().active_conversation_id else {
                return;
            };
            if loaded_for.get().as_deref() == Some(conversation_id.as_str()) {
                return;
            }
            if chat.with_untracked(|c| c.messages.contains_key(&conversation_id)) {
                loaded_for.set(Some(conversation_id));
                return;
            }
            loaded_for.set(Some(conversation_id.clone()));

            let api = api.get_value();
            leptos::task::spawn_local(async move {
                match api.fetch_messages(&conversation_id).await {
                    Ok(messages) => chat.update(|c| c.set_messages(conversation_id, messages)),
                    Err(err) => {
                        leptos::logging::warn!("fetching messages failed: {err}");
                        ui.update(|u| u.notify_error("Couldn't load messages"));
                    }
                }
            });
        });
    }

    // Keep the view pinned to the newest message.
    Effect::new(move || {
        let _ = chat.get().active_messages().len();

        #[cfg(feature = "hydrate")]
        {
            if let Some(el) = messages_ref.get() {
                let scroll_height = el.scroll_height();
                el.set_scroll_top(scroll_height);
            }
        }
    });

    let do_send = move || {
        let text = input.get_untracked();
        if text.trim().is_empty() || sending.get_untracked() {
            return;
        }
        let Some(conversation_id) = chat.with_untracked(|c| c.active_conversation_id.clone())
        else {
            return;
        };

        #[cfg(feature = "hydrate")]
        {
            use crate::net::types::{ChatMessage, SendMessageRequest};

            let api = api.get_value();
            let content = text.trim().to_owned();

            // Render the message optimistically under a provisional id; the
            // server echo replaces it, a failed send rolls it back.
            let provisional = ChatMessage {
                id: uuid::Uuid::new_v4().to_string(),
                conversation_id: conversation_id.clone(),
                sender_id: state_own_id(&session),
                content: content.clone(),
                img_url: None,
                created_at: js_sys::Date::now(),
            };
            let provisional_id = provisional.id.clone();
            chat.update(|c| c.push_message(provisional));
            input.set(String::new());

            sending.set(true);
            leptos::task::spawn_local(async move {
                let req = SendMessageRequest { conversation_id: conversation_id.clone(), content };
                match api.send_message(&req).await {
                    Ok(message) => {
                        chat.update(|c| c.replace_message(&provisional_id, message));
                    }
                    Err(err) => {
                        leptos::logging::warn!("sending message failed: {err}");
                        chat.update(|c| c.remove_message(&conversation_id, &provisional_id));
                        ui.update(|u| u.notify_error("Message not sent"));
                    }
                }
                sending.set(false);
            });
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = conversation_id;
    };

    let on_keydown = move |ev: leptos::ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            do_send();
        }
    };

    let placeholder = move || {
        session
            .get()
            .user
            .map_or_else(|| "Message...".to_owned(), |u| format!("Message as {}...", u.visible_name()))
    };

    let header = move || {
        let state = chat.get();
        let own = state_own_id(&session);
        state
            .active_conversation()
            .map(|c| c.title(&own))
            .unwrap_or_else(|| "Select a conversation".to_owned())
    };

    view! {
        <section class="chat-window">
            <header class="chat-window__header">{header}</header>

            <div class="chat-window__messages" node_ref=messages_ref>
                {move || {
                    let state = chat.get();
                    if state.active_conversation_id.is_none() {
                        return view! {
                            <div class="chat-window__empty">"Pick a conversation from the sidebar"</div>
                        }
                        .into_any();
                    }

                    let own = state_own_id(&session);
                    let messages = state.active_messages().to_vec();
                    if messages.is_empty() {
                        return view! {
                            <div class="chat-window__empty">"No messages yet"</div>
                        }
                        .into_any();
                    }

                    messages
                        .into_iter()
                        .map(|msg| {
                            let mine = msg.sender_id == own;
                            view! {
                                <div class="chat-window__message" class=("chat-window__message--own", mine)>
                                    <span class="chat-window__text">{msg.content}</span>
                                </div>
                            }
                        })
                        .collect::<Vec<_>>()
                        .into_any()
                }}
            </div>

            <div class="chat-window__input-row">
                <input
                    class="chat-window__input"
                    type="text"
                    placeholder=placeholder
                    prop:value=move || input.get()
                    on:input=move |ev| input.set(event_target_value(&ev))
                    on:keydown=on_keydown
                />
                <button
                    class="btn btn--primary chat-window__send"
                    on:click=move |_| do_send()
                    disabled=move || input.get().trim().is_empty() || sending.get()
                >
                    "Send"
                </button>
            </div>
        </section>
    }
}

fn state_own_id(session: &RwSignal<SessionState>) -> String {
    session
        .get_untracked()
        .user
        .map(|u| u.id)
        .unwrap_or_default()
}
