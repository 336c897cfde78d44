//! Search backend contract.
//!
//! The orchestrator talks to the document store only through
//! [`SearchBackend`]. A backend receives one [`BackendRequest`] per search and
//! must answer with the windowed hits plus two aggregates computed over the
//! *unwindowed* match set: the total count and the sum of `bytes_field`.

use std::future::Future;

use crate::error::BackendError;
use crate::query::QueryTree;
use crate::types::PageWindow;

/// Everything a backend needs to run one search.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    pub index: String,
    pub doc_type: Option<String>,
    pub query: QueryTree,
    pub window: PageWindow,
    /// Numeric field to sum over all matches.
    pub bytes_field: String,
}

/// A backend's answer to a [`BackendRequest`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendResponse {
    /// Document sources inside the requested window, in backend order.
    pub hits: Vec<serde_json::Value>,
    /// Number of matches ignoring the window.
    pub total: u64,
    /// Sum of `bytes_field` over all matches; `None` if the aggregation
    /// produced no value.
    pub total_bytes: Option<f64>,
}

/// A document store that can execute [`QueryTree`]s.
///
/// Implementations must be safe to share between concurrent requests; the
/// service holds one instance behind an `Arc` for the life of the process.
pub trait SearchBackend: Send + Sync {
    /// Run one search. Must return [`BackendError::IndexNotFound`] when the
    /// index does not exist.
    fn execute(
        &self,
        request: &BackendRequest,
    ) -> impl Future<Output = Result<BackendResponse, BackendError>> + Send;
}
