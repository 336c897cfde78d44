//! Fake Elasticsearch server for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Every request, whatever its path, is recorded and answered
//! with the currently scripted status and body (by default an empty
//! `_search` result). Point an `ElasticBackend` at [`FakeElasticsearch::base_url`].
//!
//! # Example
//!
//! ```rust,no_run
//! let es = FakeElasticsearch::start().await.unwrap();
//! es.reply_with(StatusCode::OK, search_response(&[], json!(0), None)).await;
//!
//! let backend = ElasticBackend::new(&es.base_url()).unwrap();
//! // ... run a search ...
//! assert_eq!(es.requests().await[0].path, "/datahub/dataset/_search");
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use super::fixtures::search_response;

/// One request as the fake server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub content_type: Option<String>,
    /// Parsed JSON body, or `Value::Null` if the body was not JSON.
    pub body: Value,
}

struct ServerState {
    status: StatusCode,
    body: String,
    requests: Vec<RecordedRequest>,
}

/// Handle to the running fake server.
pub struct FakeElasticsearch {
    addr: SocketAddr,
    state: Arc<Mutex<ServerState>>,
}

impl FakeElasticsearch {
    /// Start the server on a random port. Returns once it is listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ServerState {
            status: StatusCode::OK,
            body: search_response(&[], serde_json::json!(0), None).to_string(),
            requests: Vec::new(),
        }));

        let app = Router::new().fallback(record).with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, state })
    }

    /// Base URL of the server (e.g. `http://127.0.0.1:PORT`).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Answer every following request with `status` and a JSON `body`.
    pub async fn reply_with(&self, status: StatusCode, body: Value) {
        self.reply_raw(status, &body.to_string()).await;
    }

    /// Answer every following request with `status` and a verbatim body.
    pub async fn reply_raw(&self, status: StatusCode, body: &str) {
        let mut state = self.state.lock().await;
        state.status = status;
        state.body = body.to_string();
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().await.requests.clone()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

async fn record(
    State(state): State<Arc<Mutex<ServerState>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let mut state = state.lock().await;
    state.requests.push(RecordedRequest {
        method,
        path: uri.path().to_string(),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
}
