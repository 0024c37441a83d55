//! JSON API server for managed tables.
//!
//! Loads the last snapshot, serves the API, flushes changes periodically
//! and once more on shutdown.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use table_manager_api::{router::Router, server::Server};
use table_manager_core::error::DbError;
use table_manager_core::store::MemoryStore;
use table_manager_core::{config::ManagerConfig, persistence::PersistenceManager, TableManager};
use tokio::signal;
use tokio::sync::watch;

/// Command-line arguments for the table server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Data directory for snapshots
    #[arg(long, default_value = "./data")]
    data_dir: String,

    /// Request body read timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    request_timeout_ms: u64,

    /// Interval between snapshot flushes in milliseconds
    #[arg(long, default_value_t = 1000)]
    persistence_interval_ms: u64,

    /// Rows returned by a listing when no limit is given
    #[arg(long)]
    default_page_limit: Option<usize>,
}

impl Args {
    fn into_config(self) -> ManagerConfig {
        ManagerConfig {
            host: self.host,
            port: self.port,
            data_dir: PathBuf::from(self.data_dir),
            request_timeout_ms: self.request_timeout_ms,
            persistence_interval_ms: self.persistence_interval_ms,
            default_page_limit: self.default_page_limit,
            ..Default::default()
        }
    }
}

/// Runs `flush_if_dirty` on the blocking pool; file writes, fsync and retry
/// sleeps must not stall the async workers.
async fn flush_blocking(
    persistence: &Arc<PersistenceManager>,
    store: &Arc<MemoryStore>,
) -> anyhow::Result<bool> {
    let persistence = Arc::clone(persistence);
    let store = Arc::clone(store);
    let flushed = tokio::task::spawn_blocking(move || persistence.flush_if_dirty(&store))
        .await
        .context("Flush task panicked")??;
    Ok(flushed)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt::init();

    let config = Arc::new(args.into_config());
    let persistence = Arc::new(PersistenceManager::new(&config));

    let store = match persistence.load() {
        Ok(store) => Arc::new(store),
        Err(DbError::DataCorruption(msg)) => {
            tracing::error!("Snapshot corruption detected: {}", msg);
            tracing::error!("Server cannot start. Please restore the snapshot from backup.");
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to load snapshot"),
    };

    let (stop_tx, mut stop_rx) = watch::channel(false);

    let flusher = (config.persistence_interval_ms > 0).then(|| {
        let store = Arc::clone(&store);
        let persistence = Arc::clone(&persistence);
        let interval = Duration::from_millis(config.persistence_interval_ms);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = flush_blocking(&persistence, &store).await {
                            tracing::error!("Periodic flush failed: {}", e);
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }
        })
    });

    let router = Router::new(TableManager::new(store.clone()), config.clone());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    tracing::info!(
        "Starting table server on {} (data directory: {})",
        addr,
        config.data_dir.display()
    );

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl_c: {}", e);
        }
        tracing::info!("Shutting down server...");
    };
    let served = Server::new(addr, router).serve(shutdown).await;

    let _ = stop_tx.send(true);
    if let Some(flusher) = flusher {
        if let Err(e) = flusher.await {
            tracing::warn!("Flush task ended abnormally: {}", e);
        }
    }
    let final_persistence = Arc::clone(&persistence);
    let final_store = Arc::clone(&store);
    tokio::task::spawn_blocking(move || final_persistence.save(&final_store))
        .await
        .context("Final snapshot flush panicked")?
        .context("Final snapshot flush failed")?;
    tracing::info!("Snapshot saved to {}", persistence.snapshot_path().display());

    served
}

#[cfg(test)]
mod tests {
    use super::*;
    use table_manager_core::persistence::SNAPSHOT_FILE;
    use table_manager_core::store::{CreateTable, SchemaStore};

    #[tokio::test]
    async fn test_flush_blocking_writes_dirty_store_once() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = ManagerConfig {
            data_dir: temp_dir.path().to_path_buf(),
            ..Default::default()
        };
        let persistence = Arc::new(PersistenceManager::new(&config));
        let store = Arc::new(MemoryStore::new());

        assert!(!flush_blocking(&persistence, &store).await.unwrap());

        store.create_table("_cars", CreateTable::default()).unwrap();
        assert!(flush_blocking(&persistence, &store).await.unwrap());
        assert!(temp_dir.path().join(SNAPSHOT_FILE).exists());
        assert!(!flush_blocking(&persistence, &store).await.unwrap());
    }
}
