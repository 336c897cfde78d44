//! metastore: authorization-aware search front end for the datahub metastore.
//!
//! The binary wires three pieces together and this crate exposes them so
//! integration harnesses can drive each one directly:
//!
//! ```text
//! HTTP / CLI ──► SearchService ──► ElasticBackend ──► Elasticsearch
//!   (server)     (metastore-core)   (metastore-elastic)
//! ```

pub mod server;

use std::sync::Arc;
use std::time::Duration;

use metastore_core::config::Config;
use metastore_core::SearchService;
use metastore_elastic::ElasticBackend;

/// Build the production service from `config`: one Elasticsearch backend
/// shared by every request, all configured kinds, and the optional timeout.
pub fn elastic_service(config: &Config) -> anyhow::Result<SearchService<ElasticBackend>> {
    let backend = ElasticBackend::new(&config.elasticsearch.address)?
        .with_track_total_hits(config.elasticsearch.track_total_hits);

    tracing::info!(
        address = backend.base_url(),
        kinds = config.kinds.len(),
        "search backend configured"
    );

    let service = SearchService::new(Arc::new(backend), config.kind_registry(), config.pagination);
    Ok(match config.elasticsearch.timeout_ms {
        Some(ms) => service.with_timeout(Duration::from_millis(ms)),
        None => service,
    })
}
