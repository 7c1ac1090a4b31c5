//! Chat store: conversation list and per-conversation message caches.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use std::collections::HashMap;

use crate::net::types::{ChatMessage, Conversation};

/// Shared chat state held in an `RwSignal` provided via context.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChatState {
    /// Conversations ordered newest-activity first.
    pub conversations: Vec<Conversation>,
    /// Message history per conversation id, oldest first.
    pub messages: HashMap<String, Vec<ChatMessage>>,
    pub active_conversation_id: Option<String>,
    pub loading: bool,
}

impl ChatState {
    /// Drop every cached conversation and message. Invoked when the session
    /// clears (sign-out or expiry).
    pub fn reset(&mut self) {
        self.conversations.clear();
        self.messages.clear();
        self.active_conversation_id = None;
        self.loading = false;
    }

    /// Replace the conversation list, keeping it ordered by most recent
    /// activity (conversations with no messages sort last).
    pub fn set_conversations(&mut self, conversations: Vec<Conversation>) {
        self.conversations = conversations;
        self.sort_conversations();
    }

    /// Replace the cached history for one conversation.
    pub fn set_messages(&mut self, conversation_id: String, messages: Vec<ChatMessage>) {
        self.messages.insert(conversation_id, messages);
    }

    /// Append a message and update its conversation's preview fields.
    pub fn push_message(&mut self, message: ChatMessage) {
        if let Some(conv) = self
            .conversations
            .iter_mut()
            .find(|c| c.id == message.conversation_id)
        {
            conv.last_message_content = Some(message.content.clone());
            conv.last_message_at = Some(message.created_at);
        }
        self.messages
            .entry(message.conversation_id.clone())
            .or_default()
            .push(message);
        self.sort_conversations();
    }

    /// Swap a provisional (optimistically rendered) message for the server
    /// echo, matching by the provisional id. Falls back to a plain append
    /// when the provisional entry is gone.
    pub fn replace_message(&mut self, provisional_id: &str, message: ChatMessage) {
        let list = self.messages.entry(message.conversation_id.clone()).or_default();
        if let Some(slot) = list.iter_mut().find(|m| m.id == provisional_id) {
            *slot = message.clone();
        } else {
            list.push(message.clone());
        }
        if let Some(conv) = self.conversations.iter_mut().find(|c| c.id == message.conversation_id)
        {
            conv.last_message_content = Some(message.content.clone());
            conv.last_message_at = Some(message.created_at);
        }
        self.sort_conversations();
    }

    /// Drop a message (used to roll back a provisional entry whose send
    /// failed).
    pub fn remove_message(&mut self, conversation_id: &str, message_id: &str) {
        if let Some(list) = self.messages.get_mut(conversation_id) {
            list.retain(|m| m.id != message_id);
        }
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        let id = self.active_conversation_id.as_deref()?;
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn active_messages(&self) -> &[ChatMessage] {
        self.active_conversation_id
            .as_deref()
            .and_then(|id| self.messages.get(id))
            .map_or(&[], Vec::as_slice)
    }

    /// Total unread count across conversations, for the sidebar badge.
    pub fn unread_total(&self) -> u32 {
        self.conversations.iter().map(|c| c.unread_count).sum()
    }

    fn sort_conversations(&mut self) {
        self.conversations.sort_by(|a, b| {
            b.last_message_at
                .partial_cmp(&a.last_message_at)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
}
