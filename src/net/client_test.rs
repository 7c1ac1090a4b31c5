use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::executor::{LocalPool, block_on};
use futures::task::LocalSpawnExt;
use serde_json::json;

use super::*;
use crate::net::error::RequestError;

// =============================================================
// Test doubles
// =============================================================

#[derive(Default)]
struct MockSessionInner {
    token: Option<String>,
    clears: usize,
    chat_reset: bool,
}

/// Session capability backed by plain shared state.
#[derive(Clone, Default)]
struct MockSession {
    inner: Rc<RefCell<MockSessionInner>>,
}

impl MockSession {
    fn with_token(token: &str) -> Self {
        let s = Self::default();
        s.inner.borrow_mut().token = Some(token.to_owned());
        s
    }

    fn token(&self) -> Option<String> {
        self.inner.borrow().token.clone()
    }

    fn clears(&self) -> usize {
        self.inner.borrow().clears
    }

    fn chat_reset(&self) -> bool {
        self.inner.borrow().chat_reset
    }
}

impl SessionAccess for MockSession {
    fn access_token(&self) -> Option<String> {
        self.inner.borrow().token.clone()
    }

    fn set_access_token(&self, token: String) {
        self.inner.borrow_mut().token = Some(token);
    }

    fn clear_session(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.token = None;
        inner.clears += 1;
        inner.chat_reset = true;
    }
}

type Responder = dyn Fn(&HttpRequest, usize) -> Result<HttpResponse, RequestError>;

/// Transport that answers immediately from a responder closure and records
/// every outbound request.
#[derive(Clone)]
struct ScriptedTransport {
    log: Rc<RefCell<Vec<HttpRequest>>>,
    respond: Rc<Responder>,
}

impl ScriptedTransport {
    fn new(respond: impl Fn(&HttpRequest, usize) -> Result<HttpResponse, RequestError> + 'static) -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
            respond: Rc::new(respond),
        }
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.log.borrow().clone()
    }

    fn sends(&self) -> usize {
        self.log.borrow().len()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, req: &HttpRequest) -> Result<HttpResponse, RequestError> {
        let n = {
            let mut log = self.log.borrow_mut();
            log.push(req.clone());
            log.len()
        };
        (self.respond)(req, n)
    }
}

/// Transport whose responses are parked until the test releases them, so
/// concurrent requests genuinely overlap.
#[derive(Clone, Default)]
struct ManualTransport {
    pending: Rc<RefCell<Vec<(HttpRequest, oneshot::Sender<Result<HttpResponse, RequestError>>)>>>,
}

impl ManualTransport {
    fn take_pending(&self) -> Vec<(HttpRequest, oneshot::Sender<Result<HttpResponse, RequestError>>)> {
        self.pending.borrow_mut().drain(..).collect()
    }
}

impl Transport for ManualTransport {
    async fn send(&self, req: &HttpRequest) -> Result<HttpResponse, RequestError> {
        let (tx, rx) = oneshot::channel();
        self.pending.borrow_mut().push((req.clone(), tx));
        match rx.await {
            Ok(result) => result,
            Err(_) => Err(RequestError::Transport("mock response dropped".to_owned())),
        }
    }
}

fn ok(body: serde_json::Value) -> Result<HttpResponse, RequestError> {
    Ok(HttpResponse { status: 200, body })
}

fn status(code: u16) -> Result<HttpResponse, RequestError> {
    Ok(HttpResponse { status: code, body: serde_json::Value::Null })
}

// =============================================================
// Exempt path classification
// =============================================================

#[test]
fn auth_endpoints_are_exempt() {
    assert!(is_exempt(SIGNIN_PATH));
    assert!(is_exempt(SIGNUP_PATH));
    assert!(is_exempt(REFRESH_PATH));
}

#[test]
fn regular_endpoints_are_not_exempt() {
    assert!(!is_exempt(ME_PATH));
    assert!(!is_exempt(SIGNOUT_PATH));
    assert!(!is_exempt("/conversations"));
}

// =============================================================
// Plain request/response, no recovery involved
// =============================================================

#[test]
fn success_passes_through_with_bearer_attached() {
    let session = MockSession::with_token("T1");
    let transport = ScriptedTransport::new(|_, _| ok(json!({"hello": true})));
    let client = ApiClient::new(session, transport.clone());

    let resp = block_on(client.request(Method::Get, "/conversations", None)).expect("response");

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, json!({"hello": true}));
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].bearer.as_deref(), Some("T1"));
}

#[test]
fn missing_token_omits_bearer() {
    let session = MockSession::default();
    let transport = ScriptedTransport::new(|_, _| ok(json!({})));
    let client = ApiClient::new(session, transport.clone());

    block_on(client.request(Method::Get, "/conversations", None)).expect("response");

    assert!(transport.requests()[0].bearer.is_none());
}

#[test]
fn non_auth_errors_are_returned_as_is() {
    let session = MockSession::with_token("T1");
    let transport = ScriptedTransport::new(|_, _| status(500));
    let client = ApiClient::new(session, transport.clone());

    let resp = block_on(client.request(Method::Get, "/conversations", None)).expect("response");

    assert_eq!(resp.status, 500);
    assert_eq!(transport.sends(), 1);
}

#[test]
fn transport_failure_is_surfaced_without_refresh() {
    let session = MockSession::with_token("T1");
    let transport =
        ScriptedTransport::new(|_, _| Err(RequestError::Transport("offline".to_owned())));
    let client = ApiClient::new(session.clone(), transport.clone());

    let err = block_on(client.request(Method::Get, "/conversations", None)).unwrap_err();

    assert_eq!(err, RequestError::Transport("offline".to_owned()));
    assert_eq!(transport.sends(), 1);
    assert_eq!(session.token().as_deref(), Some("T1"));
}

// =============================================================
// Exempt endpoints never recurse into refresh
// =============================================================

#[test]
fn unauthorized_signin_is_returned_without_refresh() {
    let session = MockSession::default();
    let transport = ScriptedTransport::new(|_, _| status(401));
    let client = ApiClient::new(session, transport.clone());

    let resp = block_on(client.request(
        Method::Post,
        SIGNIN_PATH,
        Some(json!({"email": "a@b.com", "password": "bad"})),
    ))
    .expect("response");

    assert_eq!(resp.status, 401);
    assert_eq!(transport.sends(), 1);
    assert!(transport.requests().iter().all(|r| r.path != REFRESH_PATH));
}

#[test]
fn unauthorized_refresh_call_does_not_recurse() {
    let session = MockSession::with_token("stale");
    let transport = ScriptedTransport::new(|_, _| status(401));
    let client = ApiClient::new(session, transport.clone());

    let resp = block_on(client.request(Method::Post, REFRESH_PATH, None)).expect("response");

    assert_eq!(resp.status, 401);
    assert_eq!(transport.sends(), 1);
}

// =============================================================
// Recovery: 401 -> refresh -> resubmit
// =============================================================

#[test]
fn single_401_refreshes_and_resubmits_once() {
    let session = MockSession::with_token("T1");
    let transport = ScriptedTransport::new(|req, _| {
        if req.path == REFRESH_PATH {
            ok(json!({"access_token": "T2"}))
        } else if req.bearer.as_deref() == Some("T2") {
            ok(json!({"fresh": true}))
        } else {
            status(401)
        }
    });
    let client = ApiClient::new(session.clone(), transport.clone());

    let resp = block_on(client.request(Method::Get, ME_PATH, None)).expect("response");

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, json!({"fresh": true}));
    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].bearer.as_deref(), Some("T1"));
    assert_eq!(requests[1].path, REFRESH_PATH);
    assert!(requests[1].bearer.is_none());
    assert_eq!(requests[2].bearer.as_deref(), Some("T2"));
    assert_eq!(session.token().as_deref(), Some("T2"));
}

#[test]
fn retry_bound_fails_with_exhausted_retries() {
    let session = MockSession::with_token("T1");
    let transport = ScriptedTransport::new(|req, n| {
        if req.path == REFRESH_PATH {
            ok(json!({"access_token": format!("T{n}")}))
        } else {
            status(401)
        }
    });
    let client = ApiClient::new(session, transport.clone());

    let err = block_on(client.request(Method::Get, "/conversations", None)).unwrap_err();

    assert_eq!(err, RequestError::ExhaustedRetries { status: 401 });
    // MAX_ATTEMPTS sends of the original request, one refresh between each.
    let requests = transport.requests();
    let originals = requests.iter().filter(|r| r.path == "/conversations").count();
    let refreshes = requests.iter().filter(|r| r.path == REFRESH_PATH).count();
    assert_eq!(originals as u32, MAX_ATTEMPTS);
    assert_eq!(refreshes as u32, MAX_ATTEMPTS - 1);
}

#[test]
fn failed_refresh_clears_session_and_reports_expiry() {
    let session = MockSession::with_token("T1");
    // Both the original request and the refresh are rejected.
    let transport = ScriptedTransport::new(|_, _| status(401));
    let client = ApiClient::new(session.clone(), transport.clone());

    let err = block_on(client.request(Method::Get, ME_PATH, None)).unwrap_err();

    assert_eq!(err, RequestError::SessionExpired);
    assert_eq!(session.token(), None);
    assert_eq!(session.clears(), 1);
    assert!(session.chat_reset(), "clear must cascade to chat state");
    assert_eq!(transport.sends(), 2);
}

#[test]
fn transport_failure_during_refresh_leaves_session_intact() {
    let session = MockSession::with_token("T1");
    let transport = ScriptedTransport::new(|req, _| {
        if req.path == REFRESH_PATH {
            Err(RequestError::Transport("offline".to_owned()))
        } else {
            status(401)
        }
    });
    let client = ApiClient::new(session.clone(), transport);

    let err = block_on(client.request(Method::Get, ME_PATH, None)).unwrap_err();

    assert_eq!(err, RequestError::Transport("offline".to_owned()));
    assert_eq!(session.token().as_deref(), Some("T1"));
    assert_eq!(session.clears(), 0);
}

// =============================================================
// Single-flight refresh across concurrent requests
// =============================================================

#[test]
fn concurrent_401s_share_one_refresh() {
    let session = MockSession::with_token("T1");
    let transport = ManualTransport::default();
    let client = ApiClient::new(session.clone(), transport.clone());

    let mut pool = LocalPool::new();
    let spawner = pool.spawner();

    let first = {
        let client = client.clone();
        spawner
            .spawn_local_with_handle(async move { client.request(Method::Get, "/conversations", None).await })
            .expect("spawn")
    };
    let second = {
        let client = client.clone();
        spawner
            .spawn_local_with_handle(async move { client.request(Method::Get, ME_PATH, None).await })
            .expect("spawn")
    };

    // Both requests go out with the stale token.
    pool.run_until_stalled();
    let pending = transport.take_pending();
    assert_eq!(pending.len(), 2);
    for (req, _) in &pending {
        assert_eq!(req.bearer.as_deref(), Some("T1"));
    }
    for (_, tx) in pending {
        tx.send(status(401)).expect("deliver 401");
    }

    // Exactly one refresh call for both 401s.
    pool.run_until_stalled();
    let mut pending = transport.take_pending();
    assert_eq!(pending.len(), 1, "refresh must be single-flight");
    let (req, tx) = pending.remove(0);
    assert_eq!(req.path, REFRESH_PATH);
    assert!(req.bearer.is_none());
    tx.send(ok(json!({"access_token": "T2"}))).expect("deliver refresh");

    // Both requests resubmit with the shared new token.
    pool.run_until_stalled();
    let pending = transport.take_pending();
    assert_eq!(pending.len(), 2);
    for (req, _) in &pending {
        assert_eq!(req.bearer.as_deref(), Some("T2"));
    }
    for (_, tx) in pending {
        tx.send(ok(json!({"done": true}))).expect("deliver success");
    }

    let first = pool.run_until(first).expect("first request");
    let second = pool.run_until(second).expect("second request");
    assert_eq!(first.body, json!({"done": true}));
    assert_eq!(second.body, json!({"done": true}));
    assert_eq!(session.token().as_deref(), Some("T2"));
}

#[test]
fn failed_refresh_rejects_every_waiter() {
    let session = MockSession::with_token("T1");
    let transport = ManualTransport::default();
    let client = ApiClient::new(session.clone(), transport.clone());

    let mut pool = LocalPool::new();
    let spawner = pool.spawner();

    let first = {
        let client = client.clone();
        spawner
            .spawn_local_with_handle(async move { client.request(Method::Get, "/conversations", None).await })
            .expect("spawn")
    };
    let second = {
        let client = client.clone();
        spawner
            .spawn_local_with_handle(async move { client.request(Method::Get, ME_PATH, None).await })
            .expect("spawn")
    };

    pool.run_until_stalled();
    for (_, tx) in transport.take_pending() {
        tx.send(status(401)).expect("deliver 401");
    }

    pool.run_until_stalled();
    let mut pending = transport.take_pending();
    assert_eq!(pending.len(), 1);
    let (req, tx) = pending.remove(0);
    assert_eq!(req.path, REFRESH_PATH);
    tx.send(status(401)).expect("deliver refresh rejection");

    assert_eq!(pool.run_until(first).unwrap_err(), RequestError::SessionExpired);
    assert_eq!(pool.run_until(second).unwrap_err(), RequestError::SessionExpired);
    assert_eq!(session.token(), None);
    assert_eq!(session.clears(), 1, "session cleared exactly once for the shared refresh");
}

#[test]
fn late_request_after_settled_refresh_starts_a_new_one() {
    let session = MockSession::with_token("T1");
    // Refresh succeeds with a token derived from the send counter, so two
    // separate refreshes are distinguishable.
    let transport = ScriptedTransport::new(|req, n| {
        if req.path == REFRESH_PATH {
            ok(json!({"access_token": format!("R{n}")}))
        } else if req.bearer.as_deref().is_some_and(|b| b.starts_with('R')) {
            ok(json!({}))
        } else {
            status(401)
        }
    });
    let client = ApiClient::new(session.clone(), transport.clone());

    block_on(client.request(Method::Get, ME_PATH, None)).expect("first recovery");
    let first_token = session.token().expect("token after first refresh");

    // Invalidate again; a second, independent refresh must run.
    session.inner.borrow_mut().token = Some("stale".to_owned());
    block_on(client.request(Method::Get, ME_PATH, None)).expect("second recovery");
    let second_token = session.token().expect("token after second refresh");

    assert_ne!(first_token, second_token);
    let refreshes = transport.requests().iter().filter(|r| r.path == REFRESH_PATH).count();
    assert_eq!(refreshes, 2);
}

// =============================================================
// HttpResponse helpers
// =============================================================

#[test]
fn response_json_decodes_typed_bodies() {
    let resp = HttpResponse { status: 200, body: json!({"access_token": "T9"}) };
    let token: crate::net::types::TokenResponse = resp.json().expect("decode");
    assert_eq!(token.access_token, "T9");
}

#[test]
fn response_json_reports_decode_failure() {
    let resp = HttpResponse { status: 200, body: json!({"nope": 1}) };
    let err = resp.json::<crate::net::types::TokenResponse>().unwrap_err();
    assert!(matches!(err, RequestError::Decode(_)));
}
