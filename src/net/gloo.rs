//! Browser HTTP transport backed by `gloo-net`.
//!
//! Requests carry cookies (`credentials: include`) so the refresh call can
//! present the ambient refresh cookie. Bodies that are not JSON (or are
//! empty) decode to `Value::Null`; status-code handling lives upstream.

use gloo_net::http::Request as GlooRequest;
use web_sys::RequestCredentials;

use super::client::{HttpRequest, HttpResponse, Method, Transport};
use super::error::RequestError;

/// Prefix for every backend route.
pub const BASE_PATH: &str = "/api/v1";

#[derive(Clone, Copy, Debug, Default)]
pub struct GlooTransport;

impl Transport for GlooTransport {
    async fn send(&self, req: &HttpRequest) -> Result<HttpResponse, RequestError> {
        let url = format!("{BASE_PATH}{}", req.path);
        let mut builder = match req.method {
            Method::Get => GlooRequest::get(&url),
            Method::Post => GlooRequest::post(&url),
            Method::Patch => GlooRequest::patch(&url),
            Method::Delete => GlooRequest::delete(&url),
        }
        .credentials(RequestCredentials::Include);

        if let Some(token) = &req.bearer {
            builder = builder.header("Authorization", &format!("Bearer {token}"));
        }

        let request = match &req.body {
            Some(body) => builder.json(body).map_err(|e| RequestError::Transport(e.to_string()))?,
            None => builder.build().map_err(|e| RequestError::Transport(e.to_string()))?,
        };

        let resp = request
            .send()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .json::<serde_json::Value>()
            .await
            .unwrap_or(serde_json::Value::Null);

        Ok(HttpResponse { status, body })
    }
}
