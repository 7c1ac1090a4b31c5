//! Clickable card for one conversation in the sidebar list.

use leptos::prelude::*;

use crate::net::types::{Conversation, ConversationKind};

/// A conversation entry: title, last-message preview, and unread badge.
/// Direct conversations are titled after the other participant, groups after
/// their name.
#[component]
pub fn ConversationCard(
    conversation: Conversation,
    own_user_id: String,
    active: bool,
    on_select: Callback<String>,
) -> impl IntoView {
    let id = conversation.id.clone();
    let title = conversation.title(&own_user_id);
    let preview = conversation
        .last_message_content
        .clone()
        .unwrap_or_else(|| "No messages yet".to_owned());
    let unread = conversation.unread_count;
    let kind_class = match conversation.kind {
        ConversationKind::Direct => "conversation-card--direct",
        ConversationKind::Group => "conversation-card--group",
    };

    view! {
        <button
            class=format!("conversation-card {kind_class}")
            class=("conversation-card--active", active)
            on:click=move |_| on_select.run(id.clone())
        >
            <span class="conversation-card__title">{title}</span>
            <span class="conversation-card__preview">{preview}</span>
            <Show when=move || { unread > 0 }>
                <span class="conversation-card__unread">{unread}</span>
            </Show>
        </button>
    }
}
