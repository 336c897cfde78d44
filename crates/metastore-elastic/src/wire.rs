//! Elasticsearch `_search` request and response bodies.

use hyper::StatusCode;
use serde::{Deserialize, Serialize};

use metastore_core::{BackendError, BackendRequest, BackendResponse, QueryTree};

/// Name of the sum aggregation carrying the byte total.
const TOTAL_BYTES_AGG: &str = "total_bytes";

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct SearchBody<'a> {
    query: &'a QueryTree,
    from: usize,
    size: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    track_total_hits: bool,
    aggs: Aggregations<'a>,
}

#[derive(Debug, Serialize)]
struct Aggregations<'a> {
    total_bytes: SumAggregation<'a>,
}

#[derive(Debug, Serialize)]
struct SumAggregation<'a> {
    sum: FieldRef<'a>,
}

#[derive(Debug, Serialize)]
struct FieldRef<'a> {
    field: &'a str,
}

impl<'a> SearchBody<'a> {
    pub(crate) fn new(request: &'a BackendRequest, track_total_hits: bool) -> Self {
        Self {
            query: &request.query,
            from: request.window.from,
            size: request.window.size,
            track_total_hits,
            aggs: Aggregations {
                total_bytes: SumAggregation {
                    sum: FieldRef {
                        field: &request.bytes_field,
                    },
                },
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// A success body without `hits` reads as an empty page with total 0.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Hits,
    #[serde(default)]
    aggregations: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct Hits {
    #[serde(default)]
    total: TotalHits,
    #[serde(default)]
    hits: Vec<Hit>,
}

/// `hits.total` is a bare number before 7.x and an object from 7.x on.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TotalHits {
    Count(u64),
    Tracked { value: u64 },
}

impl Default for TotalHits {
    fn default() -> Self {
        TotalHits::Count(0)
    }
}

impl TotalHits {
    fn value(&self) -> u64 {
        match self {
            TotalHits::Count(n) | TotalHits::Tracked { value: n } => *n,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source", default)]
    source: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Structured {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        reason: Option<String>,
    },
    Text(String),
}

impl ErrorDetail {
    fn describe(self) -> String {
        match self {
            ErrorDetail::Structured { kind, reason: Some(reason) } => format!("{kind}: {reason}"),
            ErrorDetail::Structured { kind, reason: None } => kind,
            ErrorDetail::Text(text) => text,
        }
    }
}

/// Map a raw HTTP answer from `_search` onto the backend contract.
pub(crate) fn decode_response(
    status: StatusCode,
    body: &[u8],
    index: &str,
) -> Result<BackendResponse, BackendError> {
    if status.is_success() {
        let parsed: SearchResponse = serde_json::from_slice(body)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        let total_bytes = parsed
            .aggregations
            .as_ref()
            .and_then(|aggs| aggs.get(TOTAL_BYTES_AGG))
            .and_then(|agg| agg.get("value"))
            .and_then(serde_json::Value::as_f64);
        return Ok(BackendResponse {
            total: parsed.hits.total.value(),
            hits: parsed.hits.hits.into_iter().map(|hit| hit.source).collect(),
            total_bytes,
        });
    }

    let reason = serde_json::from_slice::<ErrorResponse>(body)
        .map(|e| e.error.describe())
        .unwrap_or_else(|_| String::from_utf8_lossy(body).trim().to_string());

    if status == StatusCode::NOT_FOUND {
        Err(BackendError::IndexNotFound(index.to_string()))
    } else if status.is_client_error() {
        Err(BackendError::Rejected {
            status: status.as_u16(),
            reason,
        })
    } else {
        Err(BackendError::Unavailable(format!("{status}: {reason}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
