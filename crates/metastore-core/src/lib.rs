//! metastore-core: search query translation with visibility enforcement.
//!
//! This crate turns `(kind, identity, filters, pagination)` into a
//! [`QueryTree`] that only matches documents the caller may see, runs it on a
//! [`SearchBackend`], and reshapes the answer into a [`SearchResult`].
//!
//! # Architecture
//!
//! ```text
//! caller ──► SearchService ──► build_query ──► QueryTree
//!                 │                               │
//!                 ◄──── BackendResponse ◄──── SearchBackend
//! ```
//!
//! The backend is injected into [`SearchService`] at construction. The
//! service itself holds no per-request state.

pub mod backend;
pub mod config;
pub mod error;
pub mod memory;
pub mod query;
pub mod search;
pub mod types;

pub use backend::{BackendRequest, BackendResponse, SearchBackend};
pub use error::{BackendError, DecodeError, QueryError, SearchError};
pub use memory::MemoryBackend;
pub use query::{build_query, QueryTree};
pub use search::SearchService;
pub use types::{FilterSet, KindRegistry, PageWindow, Scalar, SearchResult, SearchableKind, Summary};
