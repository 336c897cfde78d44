//! Domain-specific assertions for metastore harnesses.
//!
//! These wrap `pretty_assertions` and add failure messages that make it clear
//! which search invariant was violated.

use std::collections::BTreeSet;

use metastore_core::SearchResult;

/// Names (`name` field) of every returned document, as a sorted set.
pub fn names(result: &SearchResult) -> BTreeSet<String> {
    result
        .results
        .iter()
        .map(|doc| match &doc["name"] {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

/// Assert the invariants every successful search must satisfy: no error,
/// and never more documents than the reported total.
pub fn assert_well_formed(result: &SearchResult) {
    assert!(
        result.error.is_none(),
        "search unexpectedly failed: {:?}",
        result.error
    );
    assert!(
        result.results.len() as u64 <= result.summary.total,
        "window holds {} documents but summary.total is {}",
        result.results.len(),
        result.summary.total
    );
}

/// Assert a search failed for a caller-side reason: no documents, zero
/// totals and an error message.
pub fn assert_failed(result: &SearchResult) {
    assert!(result.error.is_some(), "expected an error result, got {result:?}");
    assert!(result.results.is_empty(), "error result carries documents");
    assert_eq!(result.summary.total, 0, "error result carries a total");
    assert_eq!(result.summary.total_bytes, 0.0, "error result carries bytes");
}

/// Assert the returned window size and both summary aggregates.
///
/// ```rust
/// assert_page!(result, len = 4, total = 10, bytes = 100.0);
/// ```
#[macro_export]
macro_rules! assert_page {
    ($result:expr, len = $len:expr, total = $total:expr, bytes = $bytes:expr) => {{
        let result: &metastore_core::SearchResult = &$result;
        $crate::common::assert_well_formed(result);
        pretty_assertions::assert_eq!(result.results.len(), $len, "window length");
        pretty_assertions::assert_eq!(result.summary.total, $total, "summary.total");
        pretty_assertions::assert_eq!(result.summary.total_bytes, $bytes, "summary.totalBytes");
    }};
}

/// Assert the exact set of returned document names.
///
/// ```rust
/// assert_names!(result, ["owner1-published-cat", "owner2-published-cat"]);
/// ```
#[macro_export]
macro_rules! assert_names {
    ($result:expr, [$($name:expr),* $(,)?]) => {{
        let result: &metastore_core::SearchResult = &$result;
        $crate::common::assert_well_formed(result);
        let expected: std::collections::BTreeSet<String> =
            [$($name),*].iter().map(|n: &&str| n.to_string()).collect();
        pretty_assertions::assert_eq!($crate::common::names(result), expected);
        pretty_assertions::assert_eq!(result.results.len(), expected.len(), "duplicate hits");
    }};
}
