//! Query builder. Turns an identity plus caller filters into a [`QueryTree`].
//!
//! The visibility rule is part of every tree: a document matches only if it
//! is published or owned by the caller, *and* it satisfies every filter
//! clause. Authorization is never applied after retrieval, so totals and
//! aggregates only ever describe the authorized set.
//!
//! ```text
//! AllOf
//! ├── AnyOf                          visibility
//! │   ├── Match(visibility, "published")
//! │   └── Match(owner, identity)     only when authenticated
//! ├── MultiMatch(q, text_fields)     only when `q` is given
//! └── AnyOf(Match(k, v1), ...)       one per remaining filter key
//! ```

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::QueryError;
use crate::types::{FilterSet, Scalar, SearchableKind};

/// Value of the visibility field that makes a document public.
pub const PUBLISHED: &str = "published";

/// Reserved filter key carrying the free-text query.
pub const QUERY_TEXT_KEY: &str = "q";

// ---------------------------------------------------------------------------
// QueryTree
// ---------------------------------------------------------------------------

/// Boolean query expression handed to the search backend.
///
/// Serializes to the Elasticsearch query DSL: `Match` → `match`,
/// `MultiMatch` → `multi_match`, `AnyOf` → `bool.should` with
/// `minimum_should_match: 1`, `AllOf` → `bool.must`.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryTree {
    /// `field` matches `value`.
    Match { field: String, value: Scalar },
    /// `query` matches at least one of `fields`.
    MultiMatch { query: Scalar, fields: Vec<String> },
    /// At least one child matches.
    AnyOf(Vec<QueryTree>),
    /// Every child matches.
    AllOf(Vec<QueryTree>),
}

impl QueryTree {
    pub fn matching(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        QueryTree::Match {
            field: field.into(),
            value: value.into(),
        }
    }
}

#[derive(Serialize)]
struct MultiMatchBody<'a> {
    query: &'a Scalar,
    fields: &'a [String],
}

#[derive(Serialize)]
struct ShouldBody<'a> {
    should: &'a [QueryTree],
    minimum_should_match: u32,
}

#[derive(Serialize)]
struct MustBody<'a> {
    must: &'a [QueryTree],
}

impl Serialize for QueryTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            QueryTree::Match { field, value } => {
                map.serialize_entry("match", &BTreeMap::from([(field, value)]))?
            }
            QueryTree::MultiMatch { query, fields } => {
                map.serialize_entry("multi_match", &MultiMatchBody { query, fields })?
            }
            QueryTree::AnyOf(children) => map.serialize_entry(
                "bool",
                &ShouldBody {
                    should: children,
                    minimum_should_match: 1,
                },
            )?,
            QueryTree::AllOf(children) => {
                map.serialize_entry("bool", &MustBody { must: children })?
            }
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build the query for one request.
///
/// `filters` must already have `from`/`size` removed; `q` is taken here and
/// every other key is treated as a field path. Unknown field paths are passed
/// through for the backend to judge. Any value that fails to decode aborts
/// the whole build.
pub fn build_query(
    kind: &SearchableKind,
    identity: Option<&str>,
    mut filters: FilterSet,
) -> Result<QueryTree, QueryError> {
    let mut visible = vec![QueryTree::matching(&kind.visibility_field, PUBLISHED)];
    if let Some(owner) = identity {
        visible.push(QueryTree::matching(&kind.owner_field, owner));
    }
    let visibility = QueryTree::AnyOf(visible);

    let mut clauses = Vec::new();

    if let Some(raw) = filters
        .take(QUERY_TEXT_KEY)
        .and_then(|values| values.into_iter().next())
    {
        let query = Scalar::decode(&raw)
            .map_err(|source| QueryError::InvalidQueryText { raw, source })?;
        clauses.push(QueryTree::MultiMatch {
            query,
            fields: kind.text_fields.clone(),
        });
    }

    for (field, values) in filters {
        if values.is_empty() {
            continue;
        }
        let mut alternatives = Vec::with_capacity(values.len());
        for raw in values {
            let value = match Scalar::decode(&raw) {
                Ok(value) => value,
                Err(source) => {
                    return Err(QueryError::MalformedValue { field, raw, source });
                }
            };
            alternatives.push(QueryTree::Match {
                field: field.clone(),
                value,
            });
        }
        clauses.push(QueryTree::AnyOf(alternatives));
    }

    if clauses.is_empty() {
        return Ok(visibility);
    }
    clauses.insert(0, visibility);
    Ok(QueryTree::AllOf(clauses))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
