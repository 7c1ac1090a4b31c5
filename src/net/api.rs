//! Typed gateway over the authenticated client.
//!
//! One method per backend operation, mapping raw responses into wire types
//! or [`RequestError`]. No retry or refresh logic lives here; orchestration
//! is entirely [`ApiClient`]'s job.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::client::{
    ApiClient, HttpResponse, ME_PATH, Method, SIGNIN_PATH, SIGNOUT_PATH, SIGNUP_PATH,
    SessionAccess, Transport,
};
use super::error::RequestError;
use super::types::{
    ChatMessage, Conversation, SendMessageRequest, SignInRequest, SignUpRequest, TokenResponse,
    User, UserSummary,
};

#[derive(Clone)]
pub struct Api<S, T> {
    client: ApiClient<S, T>,
}

impl<S, T> Api<S, T>
where
    S: SessionAccess + 'static,
    T: Transport + 'static,
{
    pub fn new(client: ApiClient<S, T>) -> Self {
        Self { client }
    }

    /// Register a new account. The backend sends a verification email; the
    /// returned summary confirms the created identity.
    ///
    /// # Errors
    ///
    /// `Validation` with the backend detail on rejected input.
    pub async fn sign_up(&self, req: &SignUpRequest) -> Result<UserSummary, RequestError> {
        let body = to_body(req)?;
        let resp = self.client.request(Method::Post, SIGNUP_PATH, Some(body)).await?;
        decode(resp)
    }

    /// Confirm an email-verification token from the signup mail link.
    ///
    /// # Errors
    ///
    /// `Validation` when the token is invalid or expired, `Transport` on
    /// network failure; the two are distinguishable for the UI.
    pub async fn verify(&self, token: &str) -> Result<(), RequestError> {
        let path = format!("/auth/verify/{token}");
        let resp = self.client.request(Method::Get, &path, None).await?;
        accept(resp)
    }

    /// Exchange credentials for an access token. The server also installs
    /// the refresh cookie out of band.
    ///
    /// # Errors
    ///
    /// `Validation { status: 401, .. }` on bad credentials.
    pub async fn sign_in(&self, req: &SignInRequest) -> Result<TokenResponse, RequestError> {
        let body = to_body(req)?;
        let resp = self.client.request(Method::Post, SIGNIN_PATH, Some(body)).await?;
        decode(resp)
    }

    /// Invalidate the server-side session.
    pub async fn sign_out(&self) -> Result<(), RequestError> {
        let resp = self.client.request(Method::Post, SIGNOUT_PATH, None).await?;
        accept(resp)
    }

    /// Fetch the authenticated user. A stale token is recovered
    /// transparently by the client underneath.
    pub async fn fetch_me(&self) -> Result<User, RequestError> {
        let resp = self.client.request(Method::Get, ME_PATH, None).await?;
        decode(resp)
    }

    /// Fetch the caller's conversation list.
    pub async fn fetch_conversations(&self) -> Result<Vec<Conversation>, RequestError> {
        #[derive(Deserialize)]
        struct ConversationsResponse {
            conversations: Vec<Conversation>,
        }

        let resp = self.client.request(Method::Get, "/conversations", None).await?;
        let body: ConversationsResponse = decode(resp)?;
        Ok(body.conversations)
    }

    /// Fetch the message history of one conversation, oldest first.
    pub async fn fetch_messages(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<ChatMessage>, RequestError> {
        #[derive(Deserialize)]
        struct MessagesResponse {
            messages: Vec<ChatMessage>,
        }

        let path = format!("/conversations/{conversation_id}/messages");
        let resp = self.client.request(Method::Get, &path, None).await?;
        let body: MessagesResponse = decode(resp)?;
        Ok(body.messages)
    }

    /// Send a message; the response echoes the stored message.
    pub async fn send_message(&self, req: &SendMessageRequest) -> Result<ChatMessage, RequestError> {
        let body = to_body(req)?;
        let resp = self.client.request(Method::Post, "/messages", Some(body)).await?;
        decode(resp)
    }
}

fn to_body<B: serde::Serialize>(body: &B) -> Result<Value, RequestError> {
    serde_json::to_value(body).map_err(|e| RequestError::Decode(e.to_string()))
}

/// Decode a successful body, or map the status into the error taxonomy.
fn decode<O: DeserializeOwned>(resp: HttpResponse) -> Result<O, RequestError> {
    if resp.is_ok() {
        resp.json()
    } else {
        Err(status_error(&resp))
    }
}

/// Accept any success status, discarding the body.
fn accept(resp: HttpResponse) -> Result<(), RequestError> {
    if resp.is_ok() {
        Ok(())
    } else {
        Err(status_error(&resp))
    }
}

fn status_error(resp: &HttpResponse) -> RequestError {
    if (400..500).contains(&resp.status) {
        RequestError::Validation {
            status: resp.status,
            message: detail_message(&resp.body),
        }
    } else {
        RequestError::Unexpected { status: resp.status }
    }
}

/// Pull a human-readable rejection message out of an error body, trying the
/// backend's field names in order of preference.
fn detail_message(body: &Value) -> String {
    body.get("detail")
        .or_else(|| body.get("message"))
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .unwrap_or("request rejected")
        .to_owned()
}
