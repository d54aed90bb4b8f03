//! Bucket resolution.
//!
//! `ObjectStorage` never builds stores itself; it asks a [`BucketStores`]
//! implementation for the store (and signer) of a named bucket.

use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::memory::InMemory;
use object_store::signer::Signer;
use object_store::ObjectStore;
use secrecy::ExposeSecret;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::config::StorageConfig;
use crate::error::StorageError;

/// Resolves bucket names to object stores.
pub trait BucketStores: Send + Sync + fmt::Debug {
    /// Store for reading and writing objects in `bucket`.
    fn store(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, StorageError>;

    /// Signer for presigned URLs on `bucket`.
    fn signer(&self, bucket: &str) -> Result<Arc<dyn Signer>, StorageError>;
}

/// S3-compatible buckets sharing one set of credentials.
#[derive(Debug, Clone)]
pub struct S3Buckets {
    config: StorageConfig,
}

impl S3Buckets {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    fn build(&self, bucket: &str) -> Result<AmazonS3, StorageError> {
        if bucket.is_empty() {
            return Err(StorageError::OperationFailed(
                "bucket name must not be empty".to_string(),
            ));
        }

        let mut builder = AmazonS3Builder::new()
            .with_region(&self.config.region)
            .with_bucket_name(bucket)
            .with_access_key_id(&self.config.access_key_id)
            .with_secret_access_key(self.config.secret_access_key.expose_secret());

        if let Some(endpoint) = &self.config.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }

        debug!(target: "ziqx.storage", bucket = %bucket, "Building S3 client");

        Ok(builder.build()?)
    }
}

impl BucketStores for S3Buckets {
    fn store(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, StorageError> {
        Ok(Arc::new(self.build(bucket)?))
    }

    fn signer(&self, bucket: &str) -> Result<Arc<dyn Signer>, StorageError> {
        Ok(Arc::new(self.build(bucket)?))
    }
}

/// Process-local buckets, created on first use. Used by tests.
#[derive(Debug, Default)]
pub struct InMemoryBuckets {
    buckets: Mutex<HashMap<String, Arc<InMemory>>>,
}

impl InMemoryBuckets {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BucketStores for InMemoryBuckets {
    fn store(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, StorageError> {
        let mut buckets = self
            .buckets
            .lock()
            .map_err(|_| StorageError::OperationFailed("bucket registry poisoned".to_string()))?;

        let store = buckets
            .entry(bucket.to_string())
            .or_insert_with(|| Arc::new(InMemory::new()))
            .clone();

        Ok(store)
    }

    fn signer(&self, _bucket: &str) -> Result<Arc<dyn Signer>, StorageError> {
        Err(StorageError::OperationFailed(
            "presigned URLs are not supported by the in-memory backend".to_string(),
        ))
    }
}
