//! Search orchestrator: pagination, query building, the backend call and reshaping.
//!
//! [`SearchService::search`] never fails because of what the caller sent: an
//! unknown kind, unparsable pagination, a malformed filter value or a query
//! the backend rejects all come back as a [`SearchResult`] with empty
//! results, zero totals and `error` set. A missing index is an empty result
//! *without* an error. Only backend failures (unavailable, timeout, garbage
//! response) are returned as `Err`.

use std::sync::Arc;
use std::time::Duration;

use crate::backend::{BackendRequest, BackendResponse, SearchBackend};
use crate::config::PaginationConfig;
use crate::error::{BackendError, SearchError};
use crate::query::build_query;
use crate::types::{FilterSet, KindRegistry, PageWindow, SearchResult, Summary};

/// Reserved filter key for the page offset.
pub const FROM_KEY: &str = "from";

/// Reserved filter key for the page size.
pub const SIZE_KEY: &str = "size";

// ---------------------------------------------------------------------------
// Page window
// ---------------------------------------------------------------------------

impl PageWindow {
    /// Remove `from` and `size` from `filters` and resolve the window.
    ///
    /// Only the first value of each list is read. `size` defaults to
    /// `default_page_size` and is clamped to `max_page_size`; `from` defaults
    /// to 0 and is not clamped.
    pub fn take_from(
        filters: &mut FilterSet,
        limits: &PaginationConfig,
    ) -> Result<Self, SearchError> {
        let size = first(filters.take(SIZE_KEY));
        let from = first(filters.take(FROM_KEY));

        let size = match size {
            Some(raw) => parse_count(SIZE_KEY, raw)?,
            None => limits.default_page_size,
        };
        let from = match from {
            Some(raw) => parse_count(FROM_KEY, raw)?,
            None => 0,
        };

        Ok(Self {
            from,
            size: size.min(limits.max_page_size),
        })
    }
}

fn first(values: Option<Vec<String>>) -> Option<String> {
    values.and_then(|v| v.into_iter().next())
}

fn parse_count(param: &'static str, raw: String) -> Result<usize, SearchError> {
    raw.trim()
        .parse()
        .map_err(|_| SearchError::Pagination { param, raw })
}

// ---------------------------------------------------------------------------
// SearchService
// ---------------------------------------------------------------------------

/// The search entry point. Holds the injected backend and the registered
/// kinds; cheap to share behind an `Arc`.
pub struct SearchService<B> {
    backend: Arc<B>,
    kinds: KindRegistry,
    pagination: PaginationConfig,
    timeout: Option<Duration>,
}

impl<B: SearchBackend> SearchService<B> {
    pub fn new(backend: Arc<B>, kinds: KindRegistry, pagination: PaginationConfig) -> Self {
        Self {
            backend,
            kinds,
            pagination,
            timeout: None,
        }
    }

    /// Bound the backend call; expiry is reported as
    /// [`BackendError::Unavailable`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn kinds(&self) -> &KindRegistry {
        &self.kinds
    }

    /// Search documents of `kind` visible to `identity` (`None` = anonymous).
    pub async fn search(
        &self,
        kind: &str,
        identity: Option<&str>,
        filters: FilterSet,
    ) -> Result<SearchResult, BackendError> {
        let request = match self.prepare(kind, identity, filters) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(kind, error = %e, "rejecting search request");
                return Ok(SearchResult::failed(e.to_string()));
            }
        };

        tracing::info!(
            kind,
            index = %request.index,
            authenticated = identity.is_some(),
            from = request.window.from,
            size = request.window.size,
            "performing search"
        );

        match self.execute(&request).await {
            Ok(response) => Ok(reshape(response)),
            Err(BackendError::IndexNotFound(index)) => {
                tracing::info!(kind, index = %index, "index not found, returning no results");
                Ok(SearchResult::empty())
            }
            Err(BackendError::Rejected { status, reason }) => {
                tracing::warn!(kind, status, reason = %reason, "backend rejected query");
                Ok(SearchResult::failed(SearchError::Rejected(reason).to_string()))
            }
            Err(e) => {
                tracing::error!(kind, error = %e, "search backend failure");
                Err(e)
            }
        }
    }

    /// Resolve the kind, the page window and the query tree for one request
    /// without touching the backend.
    pub fn prepare(
        &self,
        kind: &str,
        identity: Option<&str>,
        mut filters: FilterSet,
    ) -> Result<BackendRequest, SearchError> {
        let params = self.kinds.get(kind)?;
        let window = PageWindow::take_from(&mut filters, &self.pagination)?;
        let query = build_query(params, identity, filters)?;

        if tracing::enabled!(tracing::Level::DEBUG) {
            let body = serde_json::to_string(&query).unwrap_or_default();
            tracing::debug!(kind, query = %body, "built query");
        }

        Ok(BackendRequest {
            index: params.index.clone(),
            doc_type: params.doc_type.clone(),
            query,
            window,
            bytes_field: params.bytes_field.clone(),
        })
    }

    async fn execute(&self, request: &BackendRequest) -> Result<BackendResponse, BackendError> {
        let call = self.backend.execute(request);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                BackendError::Unavailable(format!("no response within {}ms", limit.as_millis()))
            })?,
            None => call.await,
        }
    }
}

fn reshape(response: BackendResponse) -> SearchResult {
    SearchResult {
        results: response.hits,
        summary: Summary {
            total: response.total,
            total_bytes: response.total_bytes.unwrap_or(0.0),
        },
        error: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
