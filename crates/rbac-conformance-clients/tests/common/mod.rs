// crates/rbac-conformance-clients/tests/common/mod.rs
// ============================================================================
// Module: Scripted HTTP Stub
// Description: In-process axum server replaying canned responses.
// Purpose: Capture outgoing requests and feed status-specific replies.
// Dependencies: axum, tokio
// ============================================================================

#![allow(
    dead_code,
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    reason = "Shared helpers are used by a subset of test binaries."
)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::response::IntoResponse;
use axum::response::Response;
use tokio::sync::oneshot;

/// One canned reply.
#[derive(Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl Reply {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

/// One request seen by the stub.
#[derive(Clone, Debug)]
pub struct Captured {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub token: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Default)]
struct StubState {
    replies: Mutex<VecDeque<Reply>>,
    captured: Mutex<Vec<Captured>>,
}

/// Running stub server.
pub struct Stub {
    pub base_url: String,
    state: Arc<StubState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Stub {
    pub fn captured(&self) -> Vec<Captured> {
        self.state.captured.lock().expect("captured lock").clone()
    }
}

impl Drop for Stub {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

async fn replay(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| headers.get(name).and_then(|value| value.to_str().ok()).map(str::to_string);
    state.captured.lock().expect("captured lock").push(Captured {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        token: header("x-auth-token"),
        content_type: header("content-type"),
        body: body.to_vec(),
    });
    let reply = state
        .replies
        .lock()
        .expect("replies lock")
        .pop_front()
        .unwrap_or_else(|| Reply::new(StatusCode::INTERNAL_SERVER_ERROR, "no scripted reply"));
    let mut response = (reply.status, reply.body).into_response();
    for (name, value) in reply.headers {
        response.headers_mut().insert(
            HeaderName::from_static(name),
            HeaderValue::from_str(&value).expect("header value"),
        );
    }
    response
}

/// Starts a stub that answers requests with `replies` in order.
pub async fn spawn_stub(replies: Vec<Reply>) -> Stub {
    let state = Arc::new(StubState {
        replies: Mutex::new(replies.into()),
        captured: Mutex::new(Vec::new()),
    });
    let app = Router::new().fallback(replay).with_state(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await;
    });
    Stub {
        base_url: format!("http://{addr}"),
        state,
        shutdown: Some(shutdown_tx),
    }
}
