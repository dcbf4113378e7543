use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use chrono::Utc;
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info, warn};

use super::naming::{generate_blob_name, is_plain_blob_name};
use super::{BlobStore, BlobUpload, StorageError, StorageKind};

/// Connection settings for an S3 or S3-compatible bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible stores (MinIO, R2, ...). Switches
    /// the client to path-style addressing.
    pub endpoint_url: Option<String>,
}

impl S3Settings {
    /// Prefix every locator produced for this bucket starts with.
    pub fn locator_prefix(&self) -> String {
        match &self.endpoint_url {
            Some(endpoint) => {
                format!("{}/{}/", endpoint.trim_end_matches('/'), self.bucket)
            }
            None => format!(
                "https://{}.s3.{}.amazonaws.com/",
                self.bucket, self.region
            ),
        }
    }

    pub fn locator_for(&self, key: &str) -> String {
        format!("{}{}", self.locator_prefix(), key)
    }

    /// Recover the object key from a locator this bucket produced.
    pub fn key_for(&self, locator: &str) -> Result<String, StorageError> {
        locator
            .strip_prefix(&self.locator_prefix())
            .filter(|key| is_plain_blob_name(key))
            .map(str::to_string)
            .ok_or_else(|| {
                StorageError::UnresolvableLocator(locator.to_string())
            })
    }
}

/// Blob store backed by an S3 bucket. Credentials come from the ambient AWS
/// provider chain (env, profile, IMDS, ...).
#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: Client,
    settings: S3Settings,
}

impl S3BlobStore {
    pub async fn connect(settings: S3Settings) -> Result<Self, StorageError> {
        if settings.bucket.trim().is_empty() {
            return Err(StorageError::Config("bucket name is empty".into()));
        }
        if settings.region.trim().is_empty() {
            return Err(StorageError::Config("region is empty".into()));
        }

        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &settings.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        info!(
            bucket = %settings.bucket,
            region = %settings.region,
            endpoint = settings.endpoint_url.as_deref().unwrap_or("aws"),
            "initialised S3 blob store"
        );

        Ok(Self {
            client: Client::from_conf(builder.build()),
            settings,
        })
    }

    pub fn settings(&self) -> &S3Settings {
        &self.settings
    }

    async fn put_single(
        &self,
        key: &str,
        content_type: Option<String>,
        body: Vec<u8>,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.settings.bucket)
            .key(key)
            .set_content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(remote)?;
        Ok(())
    }

    /// Multipart upload for bodies of at least one full part. Aborted on any
    /// failure.
    async fn put_multipart(
        &self,
        key: &str,
        content_type: Option<String>,
        first: Vec<u8>,
        reader: &mut BlobReader,
    ) -> Result<u64, StorageError> {
        let created = self
            .client
            .create_multipart_upload()
            .bucket(&self.settings.bucket)
            .key(key)
            .set_content_type(content_type)
            .send()
            .await
            .map_err(remote)?;
        let upload_id = created
            .upload_id()
            .ok_or_else(|| {
                StorageError::Remote("multipart upload id missing".into())
            })?
            .to_string();

        let result = async {
            let (parts, bytes) =
                self.upload_parts(key, &upload_id, first, reader).await?;
            self.client
                .complete_multipart_upload()
                .bucket(&self.settings.bucket)
                .key(key)
                .upload_id(&upload_id)
                .multipart_upload(
                    CompletedMultipartUpload::builder()
                        .set_parts(Some(parts))
                        .build(),
                )
                .send()
                .await
                .map_err(remote)?;
            Ok::<u64, StorageError>(bytes)
        }
        .await;

        if result.is_err() {
            let aborted = self
                .client
                .abort_multipart_upload()
                .bucket(&self.settings.bucket)
                .key(key)
                .upload_id(&upload_id)
                .send()
                .await;
            if let Err(err) = aborted {
                warn!(
                    key,
                    error = %DisplayErrorContext(err),
                    "failed to abort multipart upload"
                );
            }
        }
        result
    }

    async fn upload_parts(
        &self,
        key: &str,
        upload_id: &str,
        first: Vec<u8>,
        reader: &mut BlobReader,
    ) -> Result<(Vec<CompletedPart>, u64), StorageError> {
        let mut parts = Vec::new();
        let mut bytes = 0u64;
        let mut chunk = first;
        let mut part_number = 1;

        while !chunk.is_empty() {
            bytes += chunk.len() as u64;
            let output = self
                .client
                .upload_part()
                .bucket(&self.settings.bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(ByteStream::from(chunk))
                .send()
                .await
                .map_err(remote)?;

            let mut part = CompletedPart::builder().part_number(part_number);
            if let Some(e_tag) = output.e_tag() {
                part = part.e_tag(e_tag);
            }
            parts.push(part.build());

            part_number += 1;
            chunk = read_chunk(reader, PART_SIZE).await?;
        }
        Ok((parts, bytes))
    }
}

type BlobReader = Pin<Box<dyn AsyncRead + Send>>;

/// Size of each streamed part. Bodies smaller than one part go out as a
/// single `PutObject`.
const PART_SIZE: usize = 8 * 1024 * 1024;

/// Read up to `limit` bytes. A short chunk means the reader is exhausted.
async fn read_chunk<R>(reader: &mut R, limit: usize) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut chunk = Vec::with_capacity(limit.min(64 * 1024));
    reader.take(limit as u64).read_to_end(&mut chunk).await?;
    Ok(chunk)
}

fn remote<E: std::error::Error>(err: E) -> StorageError {
    StorageError::Remote(DisplayErrorContext(err).to_string())
}

#[async_trait]
impl BlobStore for S3BlobStore {
    fn kind(&self) -> StorageKind {
        StorageKind::S3
    }

    /// Streams the body in `PART_SIZE` chunks; at most one part is held in
    /// memory at a time.
    async fn upload(
        &self,
        mut upload: BlobUpload,
    ) -> Result<String, StorageError> {
        let key = generate_blob_name(&upload.file_name, Utc::now());

        let first = read_chunk(&mut upload.reader, PART_SIZE).await?;
        let bytes = if first.len() < PART_SIZE {
            let size = first.len() as u64;
            self.put_single(&key, upload.content_type, first).await?;
            size
        } else {
            self.put_multipart(
                &key,
                upload.content_type,
                first,
                &mut upload.reader,
            )
            .await?
        };

        debug!(key = %key, bytes, "uploaded object");
        Ok(self.settings.locator_for(&key))
    }

    async fn delete(&self, locator: &str) -> Result<(), StorageError> {
        let key = self.settings.key_for(locator)?;

        self.client
            .delete_object()
            .bucket(&self.settings.bucket)
            .key(&key)
            .send()
            .await
            .map_err(remote)?;

        debug!(key = %key, "deleted object");
        Ok(())
    }
}
