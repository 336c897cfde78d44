//! HTTP surface.
//!
//! - `GET /search/{kind}`: query-string filters (repeat a key for several
//!   values); the caller's identity comes from the trusted identity header.
//!   Answers `200` with a `SearchResult`, or `502 {"error": ...}` when the
//!   backend itself failed.
//! - `GET /health`: liveness probe, answers `ok`.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use metastore_core::{FilterSet, SearchBackend, SearchService};

/// Shared handler state.
struct AppState<B> {
    service: Arc<SearchService<B>>,
    identity_header: HeaderName,
}

impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            identity_header: self.identity_header.clone(),
        }
    }
}

/// Build the router around an already-configured service.
pub fn router<B>(service: Arc<SearchService<B>>, identity_header: HeaderName) -> Router
where
    B: SearchBackend + 'static,
{
    Router::new()
        .route("/search/{kind}", get(search::<B>))
        .route("/health", get(health))
        .with_state(AppState {
            service,
            identity_header,
        })
}

/// Identity named by `header`, if present and non-blank.
fn identity(headers: &HeaderMap, header: &HeaderName) -> Option<String> {
    headers
        .get(header)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

async fn search<B: SearchBackend + 'static>(
    State(state): State<AppState<B>>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let identity = identity(&headers, &state.identity_header);
    let filters: FilterSet = params.into_iter().collect();

    match state.service.search(&kind, identity.as_deref(), filters).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

async fn health() -> &'static str {
    "ok"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
