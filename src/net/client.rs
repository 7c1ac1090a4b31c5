//! Authenticated HTTP client with transparent access-token refresh.
//!
//! Every REST call goes through [`ApiClient::request`], which attaches the
//! bearer token from the session, detects 401 responses, and drives the
//! refresh protocol: at most one refresh call is in flight at any time, all
//! requests that hit a 401 while it is outstanding attach to its outcome,
//! and each original request retries against a bounded attempt count.
//!
//! The client is generic over [`Transport`] and [`SessionAccess`] so the
//! protocol core compiles and tests natively; the browser wires in
//! `GlooTransport` and the signal-backed session handle.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::RequestError;
use super::types::TokenResponse;

/// Attempt bound per original request. A request is sent at most this many
/// times; each 401 between attempts funnels through the shared refresh.
pub const MAX_ATTEMPTS: u32 = 4;

pub const SIGNUP_PATH: &str = "/auth/signup";
pub const SIGNIN_PATH: &str = "/auth/signin";
pub const SIGNOUT_PATH: &str = "/auth/signout";
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const ME_PATH: &str = "/auth/me";

/// HTTP methods used by the backend contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// An outbound call description handed to the transport.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    /// Access token to attach as `Authorization: Bearer <token>`; `None`
    /// omits the header entirely.
    pub bearer: Option<String>,
}

/// A completed response: status plus the decoded JSON body (`Null` when the
/// body was empty or not JSON).
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Decode the body into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Decode`] when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RequestError> {
        serde_json::from_value(self.body.clone()).map_err(|e| RequestError::Decode(e.to_string()))
    }
}

/// Low-level request executor. The browser implementation uses `gloo-net`;
/// tests substitute scripted responders.
pub trait Transport: Clone {
    fn send(
        &self,
        req: &HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, RequestError>>;
}

/// Session capability consumed by the client.
///
/// `clear_session` must cascade to dependent stores (chat state drops its
/// caches, the persisted user record is removed); the client only sees the
/// token surface.
pub trait SessionAccess: Clone {
    fn access_token(&self) -> Option<String>;
    fn set_access_token(&self, token: String);
    fn clear_session(&self);
}

/// Endpoints excluded from the refresh protocol. A 401 from any of these is
/// returned to the caller as-is; recursing into refresh here would loop on
/// the refresh call itself.
pub fn is_exempt(path: &str) -> bool {
    matches!(path, SIGNIN_PATH | SIGNUP_PATH | REFRESH_PATH)
}

type RefreshFuture = Shared<LocalBoxFuture<'static, Result<String, RequestError>>>;

/// The authenticated client. Cheap to clone; clones share the session handle
/// and the single refresh slot.
#[derive(Clone)]
pub struct ApiClient<S, T> {
    session: S,
    transport: T,
    refresh_slot: Rc<RefCell<Option<RefreshFuture>>>,
}

impl<S, T> ApiClient<S, T>
where
    S: SessionAccess + 'static,
    T: Transport + 'static,
{
    pub fn new(session: S, transport: T) -> Self {
        Self {
            session,
            transport,
            refresh_slot: Rc::new(RefCell::new(None)),
        }
    }

    /// Issue a request, recovering from token expiry transparently.
    ///
    /// Non-401 responses (success and non-auth errors alike) are returned
    /// as-is. A 401 on an exempt path is also returned as-is. Any other 401
    /// triggers the refresh protocol and a resubmission with the new token,
    /// bounded by [`MAX_ATTEMPTS`].
    ///
    /// # Errors
    ///
    /// [`RequestError::Transport`] on network failure (the transport fault is
    /// never treated as an authorization failure), `ExhaustedRetries` when
    /// the attempt bound is hit, `SessionExpired` when the refresh itself is
    /// rejected (the session has been cleared by then).
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<HttpResponse, RequestError> {
        let mut attempts: u32 = 0;
        loop {
            let req = HttpRequest {
                method,
                path: path.to_owned(),
                body: body.clone(),
                bearer: self.session.access_token(),
            };
            let resp = self.transport.send(&req).await?;
            attempts += 1;

            if !resp.is_unauthorized() || is_exempt(path) {
                return Ok(resp);
            }
            if attempts >= MAX_ATTEMPTS {
                log::warn!("{} {path}: still 401 after {attempts} attempts", method.as_str());
                return Err(RequestError::ExhaustedRetries { status: resp.status });
            }

            // Join the in-flight refresh or start one, then retry with the
            // token it installed.
            self.refresh_access_token().await?;
        }
    }

    /// Single-flight refresh: join the in-flight refresh future if one
    /// exists, otherwise start one and publish it in the shared slot.
    ///
    /// The refresh future writes the new token into the session (or clears
    /// the session on rejection) before it vacates the slot and resolves its
    /// waiters, so every waiter observes the settled session state. A caller
    /// that abandons its request does not cancel the refresh; the shared
    /// future is owned by the slot until settlement.
    async fn refresh_access_token(&self) -> Result<String, RequestError> {
        let fut = {
            let mut slot = self.refresh_slot.borrow_mut();
            if let Some(inflight) = slot.as_ref() {
                inflight.clone()
            } else {
                let session = self.session.clone();
                let transport = self.transport.clone();
                let slot_handle = Rc::clone(&self.refresh_slot);
                let fresh = async move {
                    let outcome = run_refresh(&transport, &session).await;
                    slot_handle.borrow_mut().take();
                    outcome
                }
                .boxed_local()
                .shared();
                *slot = Some(fresh.clone());
                fresh
            }
        };
        fut.await
    }
}

/// Execute one refresh call and settle the session accordingly.
///
/// The refresh credential is an ambient cookie, so no bearer is attached. A
/// rejected refresh clears the whole session; a transport fault leaves the
/// session untouched and surfaces as a transport error to every waiter.
async fn run_refresh<S: SessionAccess, T: Transport>(
    transport: &T,
    session: &S,
) -> Result<String, RequestError> {
    let req = HttpRequest {
        method: Method::Post,
        path: REFRESH_PATH.to_owned(),
        body: None,
        bearer: None,
    };
    let resp = transport.send(&req).await?;
    if resp.is_ok() {
        let token: TokenResponse = resp.json()?;
        session.set_access_token(token.access_token.clone());
        Ok(token.access_token)
    } else {
        log::warn!("token refresh rejected with status {}", resp.status);
        session.clear_session();
        Err(RequestError::SessionExpired)
    }
}
