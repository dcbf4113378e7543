use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::io::AsyncReadExt;

use super::naming::generate_blob_name;
use super::{BlobStore, BlobUpload, StorageError, StorageKind};

const LOCATOR_PREFIX: &str = "mem://blobs/";

/// In-process blob store used by tests and local experiments.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<String, Vec<u8>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, locator: &str) -> bool {
        self.blobs.contains_key(locator)
    }

    pub fn get(&self, locator: &str) -> Option<Vec<u8>> {
        self.blobs.get(locator).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn kind(&self) -> StorageKind {
        StorageKind::Memory
    }

    async fn upload(
        &self,
        mut upload: BlobUpload,
    ) -> Result<String, StorageError> {
        let mut bytes = Vec::new();
        upload.reader.read_to_end(&mut bytes).await?;

        let locator = format!(
            "{LOCATOR_PREFIX}{}",
            generate_blob_name(&upload.file_name, Utc::now())
        );
        self.blobs.insert(locator.clone(), bytes);
        Ok(locator)
    }

    async fn delete(&self, locator: &str) -> Result<(), StorageError> {
        self.blobs
            .remove(locator)
            .map(|_| ())
            .ok_or_else(|| {
                StorageError::UnresolvableLocator(locator.to_string())
            })
    }
}
