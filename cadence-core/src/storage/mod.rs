//! Pluggable blob storage for uploaded media.
//!
//! A [`BlobStore`] accepts a stream of bytes, stores it under a generated
//! collision-resistant name and hands back an opaque locator string. The
//! locator is the only handle the rest of the system keeps; deleting a blob
//! goes through the same backend that produced it.

pub mod local;
pub mod memory;
pub mod naming;
#[cfg(feature = "s3")]
pub mod s3;

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncRead;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;
#[cfg(feature = "s3")]
pub use s3::{S3BlobStore, S3Settings};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("locator `{0}` does not resolve to a stored blob")]
    UnresolvableLocator(String),

    #[error("object store request failed: {0}")]
    Remote(String),

    #[error("storage backend misconfigured: {0}")]
    Config(String),
}

/// Which backend is active. Chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Local,
    S3,
    Memory,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageKind::Local => "local",
            StorageKind::S3 => "s3",
            StorageKind::Memory => "memory",
        })
    }
}

/// A single file handed to a backend.
pub struct BlobUpload {
    /// Client-supplied file name; only its extension survives.
    pub file_name: String,
    pub content_type: Option<String>,
    pub reader: Pin<Box<dyn AsyncRead + Send>>,
}

impl fmt::Debug for BlobUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

impl BlobUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<String>,
        reader: impl AsyncRead + Send + 'static,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            reader: Box::pin(reader),
        }
    }

    /// Wrap an in-memory buffer, e.g. a fully received multipart field.
    pub fn from_bytes<T>(file_name: impl Into<String>, bytes: T) -> Self
    where
        T: AsRef<[u8]> + Send + Unpin + 'static,
    {
        Self::new(file_name, None, std::io::Cursor::new(bytes))
    }

    pub fn with_content_type(
        mut self,
        content_type: impl Into<String>,
    ) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Capability shared by every storage backend.
#[async_trait]
pub trait BlobStore: Send + Sync + fmt::Debug {
    fn kind(&self) -> StorageKind;

    /// Store the upload under a freshly generated name and return its locator.
    async fn upload(&self, upload: BlobUpload) -> Result<String, StorageError>;

    /// Remove the blob referenced by `locator`. Missing blobs are an error.
    async fn delete(&self, locator: &str) -> Result<(), StorageError>;
}
