//! In-memory search backend.
//!
//! Holds named indexes of JSON documents and evaluates [`QueryTree`]s against
//! them directly. Used by the integration harnesses and anywhere the service
//! runs without a live search engine.
//!
//! Matching rules:
//!
//! - Text is tokenized by lowercasing and splitting on non-alphanumerics.
//! - `Match` requires the value's tokens to appear as a contiguous run in the
//!   field's tokens.
//! - `MultiMatch` requires any query token to appear in any listed field.
//! - Fields registered with [`MemoryBackend::with_keyword_field`] are never
//!   tokenized; they match only on the exact whole value, like a
//!   not-analyzed mapping.
//!
//! Arrays match if any element matches. Hits come back in insertion order.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tokio::sync::RwLock;

use crate::backend::{BackendRequest, BackendResponse, SearchBackend};
use crate::error::BackendError;
use crate::query::QueryTree;
use crate::types::Scalar;

#[derive(Debug, Default)]
pub struct MemoryBackend {
    indexes: RwLock<HashMap<String, Vec<Value>>>,
    keyword_fields: HashSet<String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match `field` on its whole value instead of by tokens.
    pub fn with_keyword_field(mut self, field: impl Into<String>) -> Self {
        self.keyword_fields.insert(field.into());
        self
    }

    /// Create `index` if it does not exist yet.
    pub async fn create_index(&self, index: &str) {
        self.indexes
            .write()
            .await
            .entry(index.to_string())
            .or_default();
    }

    /// Drop `index` and its documents. Returns whether it existed.
    pub async fn delete_index(&self, index: &str) -> bool {
        self.indexes.write().await.remove(index).is_some()
    }

    /// Append a document, creating the index on first use.
    pub async fn index_document(&self, index: &str, document: Value) {
        self.indexes
            .write()
            .await
            .entry(index.to_string())
            .or_default()
            .push(document);
    }

    /// Number of documents in `index`, or `None` if it does not exist.
    pub async fn document_count(&self, index: &str) -> Option<usize> {
        self.indexes.read().await.get(index).map(Vec::len)
    }

    fn evaluate(&self, tree: &QueryTree, document: &Value) -> bool {
        match tree {
            QueryTree::Match { field, value } => resolve(document, field)
                .is_some_and(|found| self.field_matches(field, found, value)),
            QueryTree::MultiMatch { query, fields } => {
                let text = query.as_text();
                let wanted = tokens(&text);
                fields.iter().any(|field| {
                    resolve(document, field).is_some_and(|found| {
                        if self.keyword_fields.contains(field) {
                            any_leaf(found, &|leaf| leaf == text)
                        } else {
                            any_leaf(found, &|leaf| {
                                tokens(&leaf).iter().any(|t| wanted.contains(t))
                            })
                        }
                    })
                })
            }
            QueryTree::AnyOf(children) => children.iter().any(|c| self.evaluate(c, document)),
            QueryTree::AllOf(children) => children.iter().all(|c| self.evaluate(c, document)),
        }
    }

    fn field_matches(&self, field: &str, found: &Value, value: &Scalar) -> bool {
        let text = value.as_text();
        if self.keyword_fields.contains(field) {
            return any_leaf(found, &|leaf| leaf == text);
        }
        let phrase = tokens(&text);
        if phrase.is_empty() {
            return false;
        }
        any_leaf(found, &|leaf| {
            tokens(&leaf)
                .windows(phrase.len())
                .any(|window| window == phrase.as_slice())
        })
    }
}

impl SearchBackend for MemoryBackend {
    async fn execute(&self, request: &BackendRequest) -> Result<BackendResponse, BackendError> {
        let indexes = self.indexes.read().await;
        let documents = indexes
            .get(&request.index)
            .ok_or_else(|| BackendError::IndexNotFound(request.index.clone()))?;

        let matched: Vec<&Value> = documents
            .iter()
            .filter(|doc| self.evaluate(&request.query, doc))
            .collect();

        let total_bytes = matched
            .iter()
            .filter_map(|doc| resolve(doc, &request.bytes_field))
            .filter_map(Value::as_f64)
            .fold(None, |sum: Option<f64>, bytes| Some(sum.unwrap_or(0.0) + bytes));

        let hits = matched
            .iter()
            .skip(request.window.from)
            .take(request.window.size)
            .map(|doc| (*doc).clone())
            .collect();

        Ok(BackendResponse {
            hits,
            total: matched.len() as u64,
            total_bytes,
        })
    }
}

// ---------------------------------------------------------------------------
// Document helpers
// ---------------------------------------------------------------------------

/// Follow a dot-delimited path through nested objects.
fn resolve<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |node, segment| node.as_object()?.get(segment))
}

/// Apply `pred` to the text of a scalar, or of any scalar inside an array.
fn any_leaf(value: &Value, pred: &dyn Fn(Cow<'_, str>) -> bool) -> bool {
    match value {
        Value::String(s) => pred(Cow::Borrowed(s)),
        Value::Number(n) => pred(Cow::Owned(n.to_string())),
        Value::Bool(b) => pred(Cow::Borrowed(if *b { "true" } else { "false" })),
        Value::Array(items) => items.iter().any(|item| any_leaf(item, pred)),
        Value::Null | Value::Object(_) => false,
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
