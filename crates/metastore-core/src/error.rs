//! Error types for metastore-core.
//!
//! Errors split along one line: anything caused by caller input
//! ([`QueryError`], [`SearchError`]) is turned into an error *result* by the
//! orchestrator, while [`BackendError`]s other than "index not found" and
//! "rejected" propagate to the transport layer.

use thiserror::Error;

/// A raw filter value that could not be decoded into a [`Scalar`](crate::Scalar).
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The value is not valid JSON (e.g. an unquoted string).
    #[error("not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
    /// The value is valid JSON but not a string, number or boolean.
    #[error("expected a string, number or boolean, found {0}")]
    NotScalar(&'static str),
}

/// Failures while building a [`QueryTree`](crate::QueryTree).
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid query text {raw:?}: {source}")]
    InvalidQueryText { raw: String, source: DecodeError },

    #[error("invalid value {raw:?} for filter {field:?}: {source}")]
    MalformedValue {
        field: String,
        raw: String,
        source: DecodeError,
    },
}

/// Caller-input failures for a whole search request.
///
/// Every variant is reported back to the caller inside a
/// [`SearchResult`](crate::SearchResult) rather than as an `Err`.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search kind not found: {0:?}")]
    KindNotFound(String),

    #[error("invalid {param} parameter {raw:?}: expected a non-negative integer")]
    Pagination { param: &'static str, raw: String },

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("query rejected by search backend: {0}")]
    Rejected(String),
}

/// Failures reported by a [`SearchBackend`](crate::SearchBackend).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The index (or document type) does not exist. Treated as zero matches.
    #[error("index not found: {0}")]
    IndexNotFound(String),
    /// The backend refused the query document, e.g. a field it cannot query.
    #[error("search backend rejected the request ({status}): {reason}")]
    Rejected { status: u16, reason: String },
    /// Connection failure, timeout or server-side error.
    #[error("search backend unavailable: {0}")]
    Unavailable(String),
    /// The request could not be encoded for the wire.
    #[error("failed to encode search request: {0}")]
    Encode(String),
    /// The backend answered with a body that could not be decoded.
    #[error("invalid response from search backend: {0}")]
    InvalidResponse(String),
}
