use anyhow::Result;
use axum::Router;
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;
mod store;

use services::catalog_service::CatalogService;
use store::{MemoryStore, S3Store, StorageBackend};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting document-locker with config: {:?}", cfg);

    // --- Availability gate: fixed for the process lifetime ---
    let backend: Option<Arc<dyn StorageBackend>> = if cfg.memory_store {
        tracing::info!("Using in-memory store backend (demo mode, nothing persists)");
        Some(Arc::new(MemoryStore::new()))
    } else {
        match cfg.s3_config() {
            Some(s3_cfg) => match S3Store::new(s3_cfg) {
                Ok(store) => Some(Arc::new(store)),
                Err(err) => {
                    tracing::warn!(
                        "Failed to initialize store client: {}. Catalog operations disabled.",
                        err
                    );
                    None
                }
            },
            None => {
                tracing::warn!(
                    "Store credentials not found (AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY). \
                     Catalog operations disabled."
                );
                None
            }
        }
    };

    // --- Initialize core service ---
    let catalog = CatalogService::new(backend);

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(catalog);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
