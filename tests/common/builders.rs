//! Test builders for services, filters and routers.
//!
//! These are designed for readability in harnesses, not for production use.
//! They panic on invalid input rather than returning `Result`.

use std::sync::Arc;

use axum::http::HeaderName;
use axum::Router;
use serde_json::Value;

use metastore_core::config::{Config, PaginationConfig};
use metastore_core::{FilterSet, MemoryBackend, SearchBackend, SearchService};

use super::fixtures::DATAHUB_INDEX;

/// Page size ceiling used by every harness.
pub const TEST_MAX_PAGE_SIZE: usize = 100;

/// Identity header the test routers read.
pub const IDENTITY_HEADER: &str = "x-datahub-userid";

/// Pagination limits with the default page size and a ceiling of 100.
pub fn test_pagination() -> PaginationConfig {
    PaginationConfig {
        default_page_size: 50,
        max_page_size: TEST_MAX_PAGE_SIZE,
    }
}

/// A memory backend whose `datahub.owner` field is matched on its whole
/// value, holding `documents` in the datahub index.
pub async fn memory_backend(documents: Vec<Value>) -> Arc<MemoryBackend> {
    let backend = MemoryBackend::new().with_keyword_field("datahub.owner");
    backend.create_index(DATAHUB_INDEX).await;
    for document in documents {
        backend.index_document(DATAHUB_INDEX, document).await;
    }
    Arc::new(backend)
}

/// Service over `backend` with the default kinds and test pagination.
pub fn service_over<B: SearchBackend>(backend: Arc<B>) -> SearchService<B> {
    SearchService::new(backend, Config::defaults().kind_registry(), test_pagination())
}

/// Service over a memory backend holding `documents`.
pub async fn memory_service(documents: Vec<Value>) -> SearchService<MemoryBackend> {
    service_over(memory_backend(documents).await)
}

/// Router over `backend` reading identity from [`IDENTITY_HEADER`].
pub fn router_over<B: SearchBackend + 'static>(backend: Arc<B>) -> Router {
    metastore::server::router(
        Arc::new(service_over(backend)),
        HeaderName::from_static(IDENTITY_HEADER),
    )
}

/// Build a [`FilterSet`] from `(key, raw value)` pairs; repeated keys
/// accumulate values.
///
/// ```rust
/// let filters = filters(&[("license", r#""str6""#), ("license", r#""str7""#)]);
/// ```
pub fn filters(pairs: &[(&str, &str)]) -> FilterSet {
    pairs.iter().copied().collect()
}
