// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Inventory server.
//!
//! Builds the primary store, the Redis backup buffer and the laboratory
//! document store, then serves the HTTP API until Ctrl-C. Stores connect in
//! the background; one that is down at startup is retried on demand, so the
//! fallback path works from the first request.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use hybrid_inventory::http::{create_router, AppState};
use hybrid_inventory::storage::documents::SqlDocumentStore;
use hybrid_inventory::storage::redis::RedisBackupBuffer;
use hybrid_inventory::storage::sql::SqlItemStore;
use hybrid_inventory::{InventoryConfig, InventoryService, LabService, StorageError};

/// Inventory REST API with Redis failover for item writes and reads
#[derive(Parser, Debug)]
#[command(name = "hybrid-inventory")]
#[command(version)]
struct Args {
    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:8000
    #[arg(long)]
    bind: Option<String>,

    /// Primary store connection string
    #[arg(long)]
    sql_url: Option<String>,

    /// Backup buffer connection string
    #[arg(long)]
    redis_url: Option<String>,

    /// Laboratory document store connection string
    #[arg(long)]
    document_url: Option<String>,
}

fn load_config(args: Args) -> anyhow::Result<InventoryConfig> {
    let mut config = match &args.config {
        Some(path) => InventoryConfig::from_yaml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => InventoryConfig::default(),
    };
    config.apply_env()?;

    if let Some(bind) = args.bind { config.bind_address = bind; }
    if let Some(url) = args.sql_url { config.sql_url = url; }
    if let Some(url) = args.redis_url { config.redis_url = url; }
    if let Some(url) = args.document_url { config.document_url = url; }
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}

fn warm_up_in_background<F>(store: &'static str, warm_up: F)
where
    F: Future<Output = Result<(), StorageError>> + Send + 'static,
{
    tokio::spawn(async move {
        match warm_up.await {
            Ok(()) => info!(store, "Store connected"),
            Err(e) => warn!(store, error = %e, "Store unreachable at startup, connecting on demand"),
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config(Args::parse())?;
    let pool_config = config.sql_pool_config();

    let primary = Arc::new(
        SqlItemStore::connect_lazy(&config.sql_url, &pool_config).context("primary store")?,
    );
    let backup = Arc::new(
        RedisBackupBuffer::connect_lazy(&config.redis_url, config.redis_prefix(), &config.backup_key)
            .context("backup buffer")?,
    );
    let documents = Arc::new(
        SqlDocumentStore::connect_lazy(&config.document_url, &pool_config).context("document store")?,
    );

    info!(sql_url = %config.sql_url, redis_url = %config.redis_url, document_url = %config.document_url, "Connecting stores");
    let store = primary.clone();
    warm_up_in_background("primary", async move { store.warm_up().await });
    let store = backup.clone();
    warm_up_in_background("backup", async move { store.warm_up().await });
    let store = documents.clone();
    warm_up_in_background("documents", async move { store.warm_up().await });

    let state = AppState::new(
        InventoryService::new(primary, backup),
        LabService::new(documents),
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("binding {}", config.bind_address))?;
    info!(address = %config.bind_address, "Inventory server listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Inventory server stopped");
    Ok(())
}
