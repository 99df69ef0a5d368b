//! Vyuh preview server
//!
//! Renders routes from a fixture file through the full extension runtime so
//! content authors can check how documents resolve without a client app.
//!
//! Usage:
//!   vyuh-preview --fixtures fixtures/chakra.json --port 4100
//!   curl 'http://localhost:4100/api/v1/render?path=/chakra'

use std::{path::PathBuf, sync::Arc};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use vyuh_preview::{build_router, build_runtime, load_fixtures};
use vyuh_runtime::RuntimeConfig;

#[derive(Parser, Debug)]
#[command(name = "vyuh-preview")]
#[command(about = "Serve rendered Vyuh routes from fixture documents")]
struct Args {
    /// JSON file with the fixture documents (array or single document)
    #[arg(short, long)]
    fixtures: PathBuf,

    /// Runtime config file
    #[arg(short, long, default_value = "vyuh.toml")]
    config: PathBuf,

    /// HTTP port
    #[arg(short, long, default_value = "4100")]
    port: u16,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("Vyuh preview starting...");
    let config = RuntimeConfig::load_from(&args.config);
    let documents = load_fixtures(&args.fixtures)
        .with_context(|| format!("failed to load fixtures from {:?}", args.fixtures))?;
    let document_count = documents.len();

    let runtime = build_runtime(config, documents)
        .await
        .context("failed to build runtime")?;
    let content_types = runtime.catalog().len();
    let app = build_router(Arc::new(runtime));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", args.port))
        .await
        .with_context(|| format!("failed to bind HTTP port {}", args.port))?;

    println!("\n========================================");
    println!("  Vyuh Preview Running");
    println!("========================================");
    println!("  Fixtures:      {} documents", document_count);
    println!("  Content types: {}", content_types);
    println!("  HTTP Port:     {}", args.port);
    println!("\n  Try:");
    println!("  http://localhost:{}/api/v1/render?path=/", args.port);
    println!("========================================\n");

    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
