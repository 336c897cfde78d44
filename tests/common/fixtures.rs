//! Document corpora used across harnesses.
//!
//! Every corpus is shaped like a `dataset` document from the datahub index:
//! visibility at `datahub.findability`, owner id at `datahub.ownerid`, and a
//! byte count of 10 at `datahub.stats.bytes`.

use serde_json::{json, Value};

/// Index backing the default `dataset` kind.
pub const DATAHUB_INDEX: &str = "datahub";

/// Bytes carried by every fixture document.
pub const BYTES_PER_DOC: f64 = 10.0;

/// `amount` published records with a numeric title, a `str{i}` license and a
/// boolean `name`.
pub fn some_records(amount: usize) -> Vec<Value> {
    (0..amount)
        .map(|i| {
            json!({
                "name": true,
                "title": i,
                "license": format!("str{i}"),
                "datahub": {
                    "name": "innername",
                    "findability": "published",
                    "stats": {"bytes": 10}
                }
            })
        })
        .collect()
}

/// `amount` published records with prose titles and owners.
pub fn real_looking_records(amount: usize) -> Vec<Value> {
    (0..amount)
        .map(|i| {
            json!({
                "name": format!("package-id-{i}"),
                "title": format!("This dataset is number{i}"),
                "datahub": {
                    "owner": format!("The one and only owner number{}", i + 1),
                    "findability": "published",
                    "stats": {"bytes": 10}
                },
                "loaded": true
            })
        })
        .collect()
}

/// Three records whose owner emails share a domain token with a title.
pub fn owner_email_records() -> Vec<Value> {
    (0..3)
        .map(|i| {
            json!({
                "name": format!("package-id-{i}"),
                "title": format!("This dataset is number test{i}"),
                "datahub": {
                    "owner": format!("BlaBla{i}@test2.com"),
                    "findability": "published",
                    "stats": {"bytes": 10}
                }
            })
        })
        .collect()
}

/// Eight records: owner1/owner2 × published/else × cat/dog, named
/// `{owner}-{findability}-{content}`.
pub fn private_records() -> Vec<Value> {
    let mut records = Vec::new();
    let mut i = 0;
    for owner in ["owner1", "owner2"] {
        for findability in ["published", "else"] {
            for content in ["cat", "dog"] {
                records.push(json!({
                    "name": format!("{owner}-{findability}-{content}"),
                    "title": format!("This dataset is number{i}, content is {content}"),
                    "datahub": {
                        "owner": format!("The one and only owner number{}", i + 1),
                        "ownerid": owner,
                        "findability": findability,
                        "stats": {"bytes": 10}
                    }
                }));
                i += 1;
            }
        }
    }
    records
}

/// One record with free text in a listed field and in an unlisted one.
pub fn readme_record() -> Value {
    json!({
        "name": true,
        "title": "testing",
        "license": "str",
        "datahub": {
            "name": "innername",
            "findability": "published",
            "stats": {"bytes": 10}
        },
        "readme": "text only in README",
        "not_readme": "NOTREADME"
    })
}

/// Body of a successful `_search` answer.
pub fn search_response(hits: &[Value], total: Value, total_bytes: Option<f64>) -> Value {
    json!({
        "took": 1,
        "timed_out": false,
        "hits": {
            "total": total,
            "hits": hits
                .iter()
                .enumerate()
                .map(|(i, source)| json!({"_id": i.to_string(), "_source": source}))
                .collect::<Vec<_>>()
        },
        "aggregations": {"total_bytes": {"value": total_bytes}}
    })
}
