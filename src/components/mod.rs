//! Reusable UI components for the chat shell.

pub mod chat_window;
pub mod conversation_card;
pub mod notice_bar;
pub mod sidebar;
