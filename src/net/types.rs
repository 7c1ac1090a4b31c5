//! Wire types for the REST backend.
//!
//! These mirror the server's JSON contract under `/api/v1`. Field names use
//! `snake_case` on the wire; optional fields deserialize to `None` when the
//! server omits them.

use serde::{Deserialize, Serialize};

/// The authenticated user as returned by `GET /auth/me`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl User {
    /// Name to show in the UI: display name when set, username otherwise.
    pub fn visible_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// Reduced user record returned by `POST /auth/signup`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// Body of `POST /auth/signup`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub confirm_password: String,
}

/// Body of `POST /auth/signin`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Response of `POST /auth/signin` and `POST /auth/refresh`.
///
/// The refresh credential itself travels out of band as a cookie; only the
/// short-lived access token appears in the body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Conversation flavor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    Direct,
    Group,
}

/// A member of a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A conversation summary from `GET /conversations`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub kind: ConversationKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_message_content: Option<String>,
    /// Milliseconds since the epoch; `None` for a conversation with no
    /// messages yet.
    #[serde(default)]
    pub last_message_at: Option<f64>,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl Conversation {
    /// Title shown in the sidebar: group name, or the other participant's
    /// name for a direct conversation.
    pub fn title(&self, own_user_id: &str) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        self.participants
            .iter()
            .find(|p| p.user_id != own_user_id)
            .map_or_else(|| "Conversation".to_owned(), |p| p.username.clone())
    }
}

/// A single chat message from `GET /conversations/{id}/messages`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    #[serde(default)]
    pub img_url: Option<String>,
    /// Milliseconds since the epoch.
    pub created_at: f64,
}

/// Body of `POST /messages`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub conversation_id: String,
    pub content: String,
}
