//! metastore-elastic: Elasticsearch adapter for metastore.
//!
//! [`ElasticBackend`] implements [`metastore_core::SearchBackend`] on top of
//! the `_search` REST endpoint. One pooled `hyper` client is built at
//! construction and shared by every request; the service bootstrap owns the
//! backend's lifetime and injects it into the orchestrator.
//!
//! ```text
//! SearchService ──► ElasticBackend ──POST /{index}[/{type}]/_search──► Elasticsearch
//! ```

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{ACCEPT, CONTENT_TYPE};
use hyper::{Method, Request, Uri};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use thiserror::Error;

use metastore_core::{BackendError, BackendRequest, BackendResponse, SearchBackend};

mod wire;

use wire::{decode_response, SearchBody};

/// Problems with the configured backend address.
#[derive(Debug, Error)]
pub enum ElasticError {
    #[error("unsupported scheme in Elasticsearch address {0:?}: expected http:// or https://")]
    UnsupportedScheme(String),

    #[error("invalid Elasticsearch address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        source: hyper::http::uri::InvalidUri,
    },
}

/// [`SearchBackend`] speaking the Elasticsearch REST API over HTTP or HTTPS.
///
/// TLS uses rustls with the webpki root store.
#[derive(Debug, Clone)]
pub struct ElasticBackend {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    base_url: String,
    track_total_hits: bool,
}

impl ElasticBackend {
    /// Build a backend for `address`, e.g. `http://localhost:9200`. A bare
    /// `host:port` is treated as `http://host:port`.
    pub fn new(address: &str) -> Result<Self, ElasticError> {
        let address = address.trim().trim_end_matches('/');
        let base_url = if address.contains("://") {
            address.to_string()
        } else {
            format!("http://{address}")
        };

        let uri: Uri = base_url
            .parse()
            .map_err(|source| ElasticError::InvalidAddress {
                address: address.to_string(),
                source,
            })?;
        if !matches!(uri.scheme_str(), Some("http" | "https")) {
            return Err(ElasticError::UnsupportedScheme(address.to_string()));
        }

        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(connector);
        Ok(Self {
            client,
            base_url,
            track_total_hits: true,
        })
    }

    /// Whether to send `track_total_hits`; clusters older than 7.x reject it.
    pub fn with_track_total_hits(mut self, enabled: bool) -> Self {
        self.track_total_hits = enabled;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self, request: &BackendRequest) -> String {
        match &request.doc_type {
            Some(doc_type) => format!("{}/{}/{}/_search", self.base_url, request.index, doc_type),
            None => format!("{}/{}/_search", self.base_url, request.index),
        }
    }
}

impl SearchBackend for ElasticBackend {
    async fn execute(&self, request: &BackendRequest) -> Result<BackendResponse, BackendError> {
        let url = self.search_url(request);
        let body = serde_json::to_vec(&SearchBody::new(request, self.track_total_hits))
            .map_err(|e| BackendError::Encode(e.to_string()))?;

        let http_request = Request::builder()
            .method(Method::POST)
            .uri(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| BackendError::Encode(e.to_string()))?;

        tracing::debug!(url = %url, "sending search request");

        let response = self
            .client
            .request(http_request)
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?
            .to_bytes();

        tracing::debug!(url = %url, %status, bytes = bytes.len(), "search response received");

        decode_response(status, &bytes, &request.index)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
