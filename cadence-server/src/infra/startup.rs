use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use cadence_config::StorageConfig;
use cadence_core::storage::{BlobStore, LocalBlobStore};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

const MAX_DB_CONNECTIONS: u32 = 10;

/// Construct the single blob backend for this process.
pub async fn build_blob_store(
    storage: &StorageConfig,
) -> anyhow::Result<Arc<dyn BlobStore>> {
    match storage {
        StorageConfig::Local {
            upload_dir,
            base_url,
        } => {
            let store =
                LocalBlobStore::new(upload_dir.clone(), base_url.as_str())
                    .await
                    .with_context(|| {
                        format!(
                            "failed to prepare upload directory {}",
                            upload_dir.display()
                        )
                    })?;
            info!(
                backend = "local",
                upload_dir = %upload_dir.display(),
                base_url = %base_url,
                "blob storage ready"
            );
            Ok(Arc::new(store))
        }
        #[cfg(feature = "s3")]
        StorageConfig::S3 {
            bucket,
            region,
            endpoint_url,
        } => {
            use cadence_core::storage::{S3BlobStore, S3Settings};

            let store = S3BlobStore::connect(S3Settings {
                bucket: bucket.clone(),
                region: region.clone(),
                endpoint_url: endpoint_url.clone(),
            })
            .await
            .context("failed to configure S3 client")?;
            info!(
                backend = "s3",
                bucket = %bucket,
                region = %region,
                "blob storage ready"
            );
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "s3"))]
        StorageConfig::S3 { .. } => anyhow::bail!(
            "STORAGE_TYPE=s3 requires cadence-server to be built with the \
             `s3` feature"
        ),
    }
}

pub async fn connect_database(url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_DB_CONNECTIONS)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .connect(url)
        .await
        .context("failed to connect to PostgreSQL")?;
    info!(max_connections = MAX_DB_CONNECTIONS, "database pool initialized");
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    cadence_core::MIGRATOR
        .run(pool)
        .await
        .context("database migration failed")?;
    info!("database migrations applied");
    Ok(())
}
