//! Shared test utilities for metastore integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Everything here runs in-process: searches go either to
//! a [`MemoryBackend`](metastore_core::MemoryBackend) or to the fake
//! Elasticsearch server in [`fake_elasticsearch`].

#![allow(dead_code, unused_imports)]

pub mod assertions;
pub mod builders;
pub mod fake_elasticsearch;
pub mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
