use anyhow::{Context, Result};
use std::{io::ErrorKind, path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod render;
mod routes;
mod services;
mod state;
#[cfg(test)]
mod test_support;

use config::{AppConfig, StorageBackend};
use services::{
    object_store::{LocalObjectStore, ObjectStore, S3ObjectStore},
    record_store::RecordStore,
    submission_service::SubmissionService,
};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + ensure-schema flag ---
    let (cfg, ensure_schema) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting travel-memories with config: {:?}", cfg);

    // --- Initialize record store ---
    ensure_sqlite_parent_dir(&cfg.database_url)?;
    let records = RecordStore::connect(&cfg.database_url, &cfg.db_table)
        .await
        .with_context(|| format!("connecting to {}", cfg.redacted_database_url()))?;

    // --- Handle ensure-schema mode ---
    if ensure_schema {
        records.ensure_table().await?;
        tracing::info!("Table `{}` is in place.", records.table());
        return Ok(());
    }

    // --- Initialize object store ---
    let (object_store, local_objects): (Arc<dyn ObjectStore>, Option<LocalObjectStore>) =
        match cfg.storage.backend {
            StorageBackend::S3 => {
                let s3: Arc<dyn ObjectStore> =
                    Arc::new(S3ObjectStore::from_settings(&cfg.storage).await);
                (s3, None)
            }
            StorageBackend::Local => {
                let local =
                    LocalObjectStore::open(&cfg.storage.local_dir, cfg.local_public_base_url())
                        .await
                        .with_context(|| {
                            format!("opening local storage at {}", cfg.storage.local_dir)
                        })?;
                tracing::info!(
                    "Local object store at {}",
                    local.base_path().display()
                );
                let store: Arc<dyn ObjectStore> = Arc::new(local.clone());
                (store, Some(local))
            }
        };

    // --- Build router ---
    let state = AppState {
        submissions: SubmissionService::new(object_store, records),
        local_objects,
    };
    let app = routes::routes::app(state, cfg.max_body_bytes);

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

/// SQLite will not create missing parent directories for a file database.
fn ensure_sqlite_parent_dir(database_url: &str) -> Result<()> {
    let Some(rest) = database_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    let path = rest.trim_start_matches("//");
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating database directory {:?}", parent))?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }
    Ok(())
}
