//! Scripted HTTP server for exercising clients over real sockets.
//!
//! Responses are enqueued up front and served in order, one per request,
//! whatever the method or path. Every request is recorded for later
//! inspection.

use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{self, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;

/// What happens to the connection while a response is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SocketPolicy {
    #[default]
    KeepOpen,
    /// Send the first half of the body, then abort the connection.
    DisconnectDuringBody,
}

/// A canned response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Bytes,
    policy: SocketPolicy,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: Bytes::new(),
            policy: SocketPolicy::KeepOpen,
        }
    }
}

impl MockResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Body bytes. No `Content-Type` is added.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn policy(mut self, policy: SocketPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl IntoResponse for MockResponse {
    fn into_response(self) -> Response {
        let Ok(status) = StatusCode::from_u16(self.status) else {
            return (StatusCode::INTERNAL_SERVER_ERROR, "invalid mock status").into_response();
        };

        let mut builder = http::Response::builder().status(status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let body = match self.policy {
            SocketPolicy::KeepOpen => Body::from(self.body),
            SocketPolicy::DisconnectDuringBody => {
                // Announce the full length so the client sees a short read.
                builder = builder.header(http::header::CONTENT_LENGTH, self.body.len().to_string());
                let head = self.body.slice(..self.body.len() / 2);
                let chunks: Vec<Result<Bytes, io::Error>> = vec![
                    Ok(head),
                    Err(io::Error::new(
                        io::ErrorKind::ConnectionReset,
                        "disconnect during response body",
                    )),
                ];
                Body::from_stream(futures::stream::iter(chunks))
            }
        };

        builder
            .body(body)
            .unwrap_or_else(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response())
    }
}

/// A request as the server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Bytes,
}

/// Queue of responses to serve plus the log of requests received.
#[derive(Debug, Default)]
pub struct Script {
    queue: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<VecDeque<RecordedRequest>>,
    fallback: Option<MockResponse>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Script {
    /// A script that serves `fallback` whenever the queue is empty.
    pub fn with_fallback(fallback: MockResponse) -> Self {
        Self {
            fallback: Some(fallback),
            ..Self::default()
        }
    }

    pub fn enqueue(&self, response: MockResponse) {
        lock(&self.queue).push_back(response);
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Oldest recorded request not yet taken.
    pub fn take_request(&self) -> Option<RecordedRequest> {
        lock(&self.requests).pop_front()
    }

    fn next_response(&self) -> Option<MockResponse> {
        lock(&self.queue).pop_front().or_else(|| self.fallback.clone())
    }

    fn record(&self, request: RecordedRequest) {
        lock(&self.requests).push_back(request);
    }
}

pub fn app(script: Arc<Script>) -> Router {
    Router::new().fallback(respond).with_state(script)
}

pub async fn run(listener: TcpListener, script: Arc<Script>) -> Result<(), io::Error> {
    axum::serve(listener, app(script)).await
}

async fn respond(State(script): State<Arc<Script>>, method: Method, uri: Uri, body: Bytes) -> Response {
    let path = uri.path().to_string();
    script.record(RecordedRequest {
        method,
        path: path.clone(),
        body,
    });
    match script.next_response() {
        Some(response) => response.into_response(),
        None => {
            tracing::warn!(%path, "no response enqueued");
            (StatusCode::INTERNAL_SERVER_ERROR, "no response enqueued").into_response()
        }
    }
}

/// A `Script` served on a random local port from a background thread.
#[derive(Debug, Clone)]
pub struct MockServer {
    addr: SocketAddr,
    script: Arc<Script>,
}

impl MockServer {
    pub fn start() -> Result<Self, io::Error> {
        Self::start_with(Script::default())
    }

    pub fn start_with(script: Script) -> Result<Self, io::Error> {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = std_listener.local_addr()?;
        std_listener.set_nonblocking(true)?;

        let script = Arc::new(script);
        let router = app(Arc::clone(&script));
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        std::thread::spawn(move || {
            let served = runtime.block_on(async {
                match TcpListener::from_std(std_listener) {
                    Ok(listener) => axum::serve(listener, router).await,
                    Err(err) => Err(err),
                }
            });
            if let Err(err) = served {
                tracing::error!(%err, "mock server stopped");
            }
        });

        Ok(Self { addr, script })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `http://` URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{}", self.addr, path.trim_start_matches('/'))
    }

    pub fn enqueue(&self, response: MockResponse) {
        self.script.enqueue(response);
    }

    pub fn request_count(&self) -> usize {
        self.script.request_count()
    }

    pub fn take_request(&self) -> Option<RecordedRequest> {
        self.script.take_request()
    }
}
