//! Mock model backend for integration tests
//!
//! Serves the OpenAI-compatible chat completions path, records every request
//! it receives and answers with a scripted reply.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Router, routing};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

/// What the mock answers to every chat completion request
#[derive(Clone)]
pub enum Reply {
    /// Event stream made of exactly these chunks
    Stream(Vec<&'static str>),
    /// Endless event stream, one chunk per interval
    Endless(Duration),
    /// Error status with a JSON body
    Reject(StatusCode, &'static str),
}

/// A request as the backend saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub authorization: Option<String>,
    pub body: serde_json::Value,
}

struct MockState {
    reply: Reply,
    requests: Mutex<Vec<Recorded>>,
    stream_dropped: Arc<AtomicBool>,
}

/// Mock backend bound to a random local port
pub struct MockBackend {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

impl MockBackend {
    /// Start a mock answering with `reply`
    pub async fn start(reply: Reply) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            reply,
            requests: Mutex::new(Vec::new()),
            stream_dropped: Arc::new(AtomicBool::new(false)),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat_completions))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL to configure as the backend endpoint override
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    /// The single request received, panicking if there were zero or several
    pub fn only_request(&self) -> Recorded {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one backend request");
        requests.into_iter().next().unwrap()
    }

    /// Whether an endless stream has been abandoned by the proxy
    pub fn stream_dropped(&self) -> bool {
        self.state.stream_dropped.load(Ordering::SeqCst)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Flags the mock when the response body it is serving gets dropped
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

async fn handle_chat_completions(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    let recorded = Recorded {
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
        body: serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null),
    };
    state.requests.lock().unwrap().push(recorded);

    match &state.reply {
        Reply::Reject(status, body) => (*status, [(header::CONTENT_TYPE, "application/json")], *body).into_response(),
        Reply::Stream(chunks) => {
            let chunks = chunks.clone();
            let stream = futures_util::stream::iter(chunks).then(|chunk| async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok::<_, std::convert::Infallible>(Bytes::from_static(chunk.as_bytes()))
            });
            event_stream(Body::from_stream(stream))
        }
        Reply::Endless(interval) => {
            let interval = *interval;
            let flag = DropFlag(Arc::clone(&state.stream_dropped));
            let stream = futures_util::stream::unfold((0_u64, flag), move |(n, flag)| async move {
                tokio::time::sleep(interval).await;
                let chunk = Bytes::from(format!("data: {{\"n\":{n}}}\n\n"));
                Some((Ok::<_, std::convert::Infallible>(chunk), (n + 1, flag)))
            });
            event_stream(Body::from_stream(stream))
        }
    }
}

fn event_stream(body: Body) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}
