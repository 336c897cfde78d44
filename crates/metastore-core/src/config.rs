//! Configuration types for metastore.
//!
//! [`Config::load`] layers, in order of increasing precedence: the embedded
//! defaults, an optional TOML file, `METASTORE__SECTION__KEY` environment
//! variables, and the legacy `DATAHUB_ELASTICSEARCH_ADDRESS` variable.
//! [`Config::defaults`] returns the embedded defaults without touching the
//! filesystem or the environment (useful in tests).

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::types::{KindRegistry, SearchableKind};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[server]
bind            = "127.0.0.1:5000"
identity_header = "x-datahub-userid"

[elasticsearch]
address          = "http://localhost:9200"
track_total_hits = true
# timeout_ms     = 10000

[pagination]
default_page_size = 50
max_page_size     = 50

[kinds.dataset]
index            = "datahub"
doc_type         = "dataset"
owner_field      = "datahub.ownerid"
visibility_field = "datahub.findability"
bytes_field      = "datahub.stats.bytes"
text_fields      = ["title", "datahub.owner", "datahub.ownerid", "readme"]
"#;

/// Environment variable older deployments use for the backend address.
pub const LEGACY_ADDRESS_ENV: &str = "DATAHUB_ELASTICSEARCH_ADDRESS";

const ENV_PREFIX: &str = "METASTORE";

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub elasticsearch: ElasticConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub kinds: HashMap<String, SearchableKind>,
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Trusted header carrying the caller's identity, set by the auth proxy.
    #[serde(default = "default_identity_header")]
    pub identity_header: String,
}

fn default_bind() -> String { "127.0.0.1:5000".to_string() }
fn default_identity_header() -> String { "x-datahub-userid".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            identity_header: default_identity_header(),
        }
    }
}

/// `[elasticsearch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ElasticConfig {
    #[serde(default = "default_address")]
    pub address: String,
    /// Upper bound on the single backend call per request. Unset means no
    /// limit beyond the HTTP client's own.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Send `track_total_hits` so 7.x+ clusters report exact totals past 10k.
    #[serde(default = "default_track_total_hits")]
    pub track_total_hits: bool,
}

fn default_address() -> String { "http://localhost:9200".to_string() }
fn default_track_total_hits() -> bool { true }

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            timeout_ms: None,
            track_total_hits: default_track_total_hits(),
        }
    }
}

/// `[pagination]` section.
///
/// `max_page_size` bounds the *requested* page size only; totals always
/// describe the full match set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

fn default_page_size() -> usize { 50 }
fn default_max_page_size() -> usize { 50 }

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load the layered configuration, reading `path` if given. A given path
    /// that does not exist is an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        Self::build(path, std::env::var(LEGACY_ADDRESS_ENV).ok())
    }

    fn build(path: Option<&Path>, legacy_address: Option<String>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml));

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("elasticsearch.address", legacy_address)?
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    /// Registry of every `[kinds.<name>]` section.
    pub fn kind_registry(&self) -> KindRegistry {
        self.kinds
            .iter()
            .map(|(name, kind)| (name.clone(), kind.clone()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
