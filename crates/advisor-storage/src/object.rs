use std::path::Path as FsPath;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{ClientOptions, ObjectStore, PutPayload};

use crate::provider::{BlobStore, Result, StorageError};

/// Connection settings for the S3 backend.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub timeout: Duration,
}

/// [`BlobStore`] over any `object_store` backend.
#[derive(Clone)]
pub struct ObjectBlobStore {
    store: Arc<dyn ObjectStore>,
    label: String,
}

impl ObjectBlobStore {
    pub fn new(store: Arc<dyn ObjectStore>, label: impl Into<String>) -> Self {
        Self {
            store,
            label: label.into(),
        }
    }

    pub fn s3(config: &S3Config) -> Result<Self> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region)
            .with_client_options(ClientOptions::new().with_timeout(config.timeout));

        if let Some(key_id) = &config.access_key_id {
            builder = builder.with_access_key_id(key_id);
        }
        if let Some(secret) = &config.secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }

        let store = builder.build()?;
        Ok(Self::new(Arc::new(store), format!("s3://{}", config.bucket)))
    }

    /// Files under `root`, which is created when missing.
    pub fn local(root: impl AsRef<FsPath>) -> Result<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root).map_err(|e| {
            StorageError::Store(object_store::Error::Generic {
                store: "LocalFileSystem",
                source: Box::new(e),
            })
        })?;
        let store = LocalFileSystem::new_with_prefix(root)?;
        Ok(Self::new(Arc::new(store), format!("file://{}", root.display())))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()), "memory")
    }

    /// Human-readable backend description for logs.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Keys map to object paths verbatim, without percent-encoding.
fn location(key: &str) -> Result<Path> {
    Path::parse(key).map_err(|e| StorageError::InvalidKey {
        segment: key.to_string(),
        reason: e.to_string(),
    })
}

fn map_error(key: &str, error: object_store::Error) -> StorageError {
    match error {
        object_store::Error::NotFound { .. } => StorageError::NotFound(key.to_string()),
        other => StorageError::Store(other),
    }
}

#[async_trait]
impl BlobStore for ObjectBlobStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        let size = data.len();
        self.store
            .put(&location(key)?, PutPayload::from(data))
            .await
            .map_err(|e| map_error(key, e))?;
        log::debug!("Stored {} ({} bytes) in {}", key, size, self.label);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = location(prefix)?;
        let prefix = (!prefix.as_ref().is_empty()).then_some(prefix);

        let objects: Vec<_> = self.store.list(prefix.as_ref()).try_collect().await?;
        let mut keys: Vec<String> = objects
            .into_iter()
            .map(|meta| meta.location.to_string())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let result = self
            .store
            .get(&location(key)?)
            .await
            .map_err(|e| map_error(key, e))?;
        result.bytes().await.map_err(|e| map_error(key, e))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = location(key)?;
        // backends treat deleting a missing object as success
        self.store
            .head(&path)
            .await
            .map_err(|e| map_error(key, e))?;
        self.store
            .delete(&path)
            .await
            .map_err(|e| map_error(key, e))?;
        log::debug!("Deleted {} from {}", key, self.label);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        match self.store.head(&location(key)?).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::Store(e)),
        }
    }
}
