use std::path::PathBuf;
use std::sync::Arc;

use axum::http::HeaderName;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use metastore_core::config::Config;
use metastore_core::FilterSet;

#[derive(Parser)]
#[command(name = "metastore", about = "Authorization-aware search over the datahub metastore")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// TOML config file layered over the built-in defaults.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the search API over HTTP
    Serve {
        /// Listen address, overriding `server.bind`
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Run one search and print the result as JSON
    Search {
        /// Kind of document to search, e.g. `dataset`
        kind: String,

        /// Search as this identity instead of anonymously
        #[arg(short, long)]
        user: Option<String>,

        /// Filter as KEY=VALUE; values are JSON literals, repeat for several
        #[arg(short = 'f', long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let service = metastore::elastic_service(&config)?;

    match cli.command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let identity_header = HeaderName::try_from(config.server.identity_header.as_str())?;
            let app = metastore::server::router(Arc::new(service), identity_header);

            let listener = tokio::net::TcpListener::bind(&bind).await?;
            tracing::info!(addr = %listener.local_addr()?, "metastore listening");
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await?;
        }
        Command::Search {
            kind,
            user,
            filters,
        } => {
            let filters: FilterSet = filters.into_iter().collect();
            let result = service.search(&kind, user.as_deref(), filters).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
