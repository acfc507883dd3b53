//! Re-index custom node packages into the node catalogue.
//!
//! Usage:
//!   refresh-custom-nodes                              # paths from CUSTOM_NODE_PATHS
//!   refresh-custom-nodes /opt/nodes/n8n-nodes-acme /opt/more-nodes/*
//!   refresh-custom-nodes --db ./data/nodes.json --json
//!   refresh-custom-nodes --init                       # create ./data/nodes.json first

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use node_catalog::Error;
use node_catalog::config::{ConfigBuilder, RefreshSettings};
use node_catalog::refresh::{CustomNodeRefresher, JsonFileNodeStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "refresh-custom-nodes")]
#[command(about = "Reload custom node packages and update the node catalogue")]
struct Cli {
    /// Package directories or parent directories ending in `/*`.
    /// Overrides CUSTOM_NODE_PATHS when given.
    paths: Vec<String>,
    /// Node catalogue location. Overrides NODE_DB_PATH.
    #[arg(long)]
    db: Option<PathBuf>,
    /// Create an empty catalogue at the --db path (or ./data/nodes.json)
    /// when none exists yet.
    #[arg(long)]
    init: bool,
    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> node_catalog::Result<()> {
    let config = ConfigBuilder::new().env().build();
    let mut settings = RefreshSettings::load(&config).await?;
    if let Some(db) = cli.db {
        settings = settings.with_database_path(db);
    }

    let store = JsonFileNodeStore::from_settings(&settings);
    if cli.init {
        store.initialize().await.map_err(Error::StoreUnavailable)?;
    }
    let refresher = CustomNodeRefresher::new(store).with_settings(settings);

    let override_paths = (!cli.paths.is_empty()).then_some(cli.paths);
    let result = refresher.refresh(override_paths).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.message());
        for error in &result.errors {
            println!("  - {}", error);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
