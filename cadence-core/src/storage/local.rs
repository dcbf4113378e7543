use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::naming::{generate_blob_name, is_plain_blob_name};
use super::{BlobStore, BlobUpload, StorageError, StorageKind};

/// Stores blobs as files in a single directory served under `base_url`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    /// Create the upload directory if needed and bind it to `base_url`.
    pub async fn new(
        root: impl Into<PathBuf>,
        base_url: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { root, base_url })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Map a locator back to a file inside the upload directory.
    fn resolve(&self, locator: &str) -> Result<PathBuf, StorageError> {
        let name = locator
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .unwrap_or_default();

        if !is_plain_blob_name(name) {
            return Err(StorageError::UnresolvableLocator(locator.to_string()));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn kind(&self) -> StorageKind {
        StorageKind::Local
    }

    async fn upload(
        &self,
        mut upload: BlobUpload,
    ) -> Result<String, StorageError> {
        let name = generate_blob_name(&upload.file_name, Utc::now());
        let final_path = self.root.join(&name);
        let partial_path = self.root.join(format!(".{name}.partial"));

        let written = async {
            let mut file = tokio::fs::File::create(&partial_path).await?;
            let bytes = tokio::io::copy(&mut upload.reader, &mut file).await?;
            file.flush().await?;
            file.sync_all().await?;
            Ok::<u64, std::io::Error>(bytes)
        }
        .await;

        let bytes = match written {
            Ok(bytes) => bytes,
            Err(err) => {
                let _ = tokio::fs::remove_file(&partial_path).await;
                warn!(file = %name, error = %err, "local upload failed");
                return Err(err.into());
            }
        };

        if let Err(err) = tokio::fs::rename(&partial_path, &final_path).await {
            let _ = tokio::fs::remove_file(&partial_path).await;
            return Err(err.into());
        }

        debug!(file = %name, bytes, "stored blob on local disk");
        Ok(format!("{}/{}", self.base_url, name))
    }

    async fn delete(&self, locator: &str) -> Result<(), StorageError> {
        let path = self.resolve(locator)?;
        tokio::fs::remove_file(&path).await?;
        debug!(locator, "removed local blob");
        Ok(())
    }
}
