//! Core types for metastore-core.
//!
//! This module defines the request-scoped data shared across the query
//! builder, the orchestrator and the backends: decoded [`Scalar`] filter
//! values, the caller's [`FilterSet`], the registered [`SearchableKind`]s, the
//! [`PageWindow`] and the reshaped [`SearchResult`].

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, SearchError};

// ---------------------------------------------------------------------------
// Scalar
// ---------------------------------------------------------------------------

/// A decoded filter value. Raw values arrive JSON-encoded: `"7"` is the
/// string `7`, `7` is the number `7`, `true` is a boolean.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl Scalar {
    /// Decode one raw, JSON-encoded value.
    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        match serde_json::from_str(raw)? {
            serde_json::Value::String(s) => Ok(Scalar::String(s)),
            serde_json::Value::Number(n) => Ok(Scalar::Number(n)),
            serde_json::Value::Bool(b) => Ok(Scalar::Bool(b)),
            serde_json::Value::Null => Err(DecodeError::NotScalar("null")),
            serde_json::Value::Array(_) => Err(DecodeError::NotScalar("an array")),
            serde_json::Value::Object(_) => Err(DecodeError::NotScalar("an object")),
        }
    }

    /// Text form used for matching: strings as-is, numbers and booleans in
    /// their JSON spelling.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Scalar::String(s) => Cow::Borrowed(s),
            Scalar::Number(n) => Cow::Owned(n.to_string()),
            Scalar::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n.into())
    }
}

// ---------------------------------------------------------------------------
// FilterSet
// ---------------------------------------------------------------------------

/// Caller-supplied filters: field path → raw encoded values, in arrival order.
///
/// Transports always deliver value lists, so even single-valued parameters
/// like `size` are stored as a list. Repeated keys append to the same list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    entries: Vec<(String, Vec<String>)>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one raw value under `key`.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Builder form of [`push`](Self::push) for several values at once.
    pub fn with<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let key = key.into();
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => existing.extend(values),
            None => self.entries.push((key, values)),
        }
        self
    }

    /// Remove `key` and return its values.
    pub fn take(&mut self, key: &str) -> Option<Vec<String>> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut filters = FilterSet::new();
        for (key, value) in iter {
            filters.push(key, value);
        }
        filters
    }
}

impl IntoIterator for FilterSet {
    type Item = (String, Vec<String>);
    type IntoIter = std::vec::IntoIter<(String, Vec<String>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// ---------------------------------------------------------------------------
// Searchable kinds
// ---------------------------------------------------------------------------

/// A document type the service knows how to search, loaded from
/// `[kinds.<name>]` in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchableKind {
    /// Backend index holding documents of this kind.
    pub index: String,
    /// Document type, for backends that still namespace by type.
    #[serde(default)]
    pub doc_type: Option<String>,
    /// Field holding the owner's identity.
    pub owner_field: String,
    /// Field whose value `"published"` makes a document public.
    pub visibility_field: String,
    /// Numeric field summed into `summary.totalBytes`.
    pub bytes_field: String,
    /// Fields searched by the free-text `q` parameter, and only these.
    #[serde(default)]
    pub text_fields: Vec<String>,
}

/// Lookup table from kind name to [`SearchableKind`].
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    kinds: HashMap<String, SearchableKind>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, kind: SearchableKind) {
        self.kinds.insert(name.into(), kind);
    }

    /// Resolve a kind; unknown names are an error, never a fallback.
    pub fn get(&self, name: &str) -> Result<&SearchableKind, SearchError> {
        self.kinds
            .get(name)
            .ok_or_else(|| SearchError::KindNotFound(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }
}

impl FromIterator<(String, SearchableKind)> for KindRegistry {
    fn from_iter<T: IntoIterator<Item = (String, SearchableKind)>>(iter: T) -> Self {
        Self {
            kinds: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pagination and results
// ---------------------------------------------------------------------------

/// Offset/limit slice of the full match set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub from: usize,
    pub size: usize,
}

/// Aggregates over the whole authorized match set, independent of the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: u64,
    pub total_bytes: f64,
}

/// What a search call hands back to its caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub results: Vec<serde_json::Value>,
    pub summary: Summary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResult {
    /// No matches, no error.
    pub fn empty() -> Self {
        Self::default()
    }

    /// No matches, with a diagnostic for the caller.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
