//! Credentialed object-storage facade.
//!
//! Thin wrapper over `object_store` that addresses objects by bucket and key,
//! keeps content types alongside bodies, and issues presigned upload and
//! download URLs. Every backend failure is reported as
//! [`StorageError::OperationFailed`].
//!
//! ```rust,ignore
//! let storage = ObjectStorage::from_config(StorageConfig::from_env()?);
//! storage.put("uploads", "report.pdf", bytes, "application/pdf").await?;
//! let url = storage.signed_url_for_get("uploads", "report.pdf", Duration::from_secs(600)).await?;
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod buckets;
pub mod config;
pub mod error;

pub use buckets::{BucketStores, InMemoryBuckets, S3Buckets};
pub use config::StorageConfig;
pub use error::StorageError;

use bytes::Bytes;
use futures::TryStreamExt;
use object_store::path::Path;
use object_store::{Attribute, AttributeValue, Attributes, PutOptions, PutPayload};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Longest lifetime S3 accepts for a presigned URL.
pub const MAX_SIGNED_URL_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// An object read back from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: Option<String>,
}

impl StoredObject {
    /// Body decoded as UTF-8.
    pub fn body_as_text(&self) -> Result<&str, StorageError> {
        std::str::from_utf8(&self.body).map_err(|e| StorageError::OperationFailed(e.to_string()))
    }
}

/// Bucket/key addressed object storage.
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    buckets: Arc<dyn BucketStores>,
}

impl ObjectStorage {
    pub fn new(buckets: Arc<dyn BucketStores>) -> Self {
        Self { buckets }
    }

    /// Storage backed by S3-compatible buckets.
    pub fn from_config(config: StorageConfig) -> Self {
        Self::new(Arc::new(S3Buckets::new(config)))
    }

    /// Storage backed by process-local buckets.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryBuckets::new()))
    }

    /// Write `body` under `key`, replacing any existing object.
    #[instrument(skip_all, fields(bucket = %bucket, key = %key))]
    pub async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: impl Into<Bytes>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let store = self.buckets.store(bucket)?;
        let path = object_path(key)?;
        let body: Bytes = body.into();
        let size = body.len();

        let attributes = Attributes::from_iter([(
            Attribute::ContentType,
            AttributeValue::from(content_type.to_string()),
        )]);
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        store.put_opts(&path, PutPayload::from(body), opts).await?;

        debug!(target: "ziqx.storage", size, content_type, "Object stored");
        Ok(())
    }

    #[instrument(skip_all, fields(bucket = %bucket, key = %key))]
    pub async fn get(&self, bucket: &str, key: &str) -> Result<StoredObject, StorageError> {
        let store = self.buckets.store(bucket)?;
        let path = object_path(key)?;

        let result = store.get(&path).await?;
        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| value.to_string());
        let body = result.bytes().await?;

        debug!(target: "ziqx.storage", size = body.len(), "Object read");
        Ok(StoredObject { body, content_type })
    }

    /// Remove `key`. Deleting a missing object is not an error.
    #[instrument(skip_all, fields(bucket = %bucket, key = %key))]
    pub async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let store = self.buckets.store(bucket)?;
        let path = object_path(key)?;

        store.delete(&path).await?;

        debug!(target: "ziqx.storage", "Object deleted");
        Ok(())
    }

    /// Keys of every object in `bucket`.
    #[instrument(skip_all, fields(bucket = %bucket))]
    pub async fn list(&self, bucket: &str) -> Result<Vec<String>, StorageError> {
        let store = self.buckets.store(bucket)?;

        let keys: Vec<String> = store
            .list(None)
            .map_ok(|meta| meta.location.to_string())
            .try_collect()
            .await?;

        debug!(target: "ziqx.storage", count = keys.len(), "Objects listed");
        Ok(keys)
    }

    /// Presigned URL allowing an HTTP PUT of `key` for `ttl`.
    pub async fn signed_url_for_put(
        &self,
        bucket: &str,
        key: &str,
        ttl: Duration,
    ) -> Result<Url, StorageError> {
        self.signed_url(reqwest::Method::PUT, bucket, key, ttl).await
    }

    /// Presigned URL allowing an HTTP GET of `key` for `ttl`.
    pub async fn signed_url_for_get(
        &self,
        bucket: &str,
        key: &str,
        ttl: Duration,
    ) -> Result<Url, StorageError> {
        self.signed_url(reqwest::Method::GET, bucket, key, ttl).await
    }

    #[instrument(skip_all, fields(method = %method, bucket = %bucket, key = %key))]
    async fn signed_url(
        &self,
        method: reqwest::Method,
        bucket: &str,
        key: &str,
        ttl: Duration,
    ) -> Result<Url, StorageError> {
        if ttl.is_zero() || ttl > MAX_SIGNED_URL_TTL {
            return Err(StorageError::InvalidTtl(ttl));
        }

        let signer = self.buckets.signer(bucket)?;
        let path = object_path(key)?;

        let url = signer.signed_url(method, &path, ttl).await?;

        // The URL itself is a bearer credential; only the lifetime is logged.
        debug!(target: "ziqx.storage", ttl_secs = ttl.as_secs(), "Signed URL issued");
        Ok(url)
    }
}

fn object_path(key: &str) -> Result<Path, StorageError> {
    if key.is_empty() {
        return Err(StorageError::OperationFailed(
            "object key must not be empty".to_string(),
        ));
    }
    Ok(Path::parse(key)?)
}
