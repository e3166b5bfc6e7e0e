use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key segment '{segment}': {reason}")]
    InvalidKey { segment: String, reason: String },

    #[error("Storage error: {0}")]
    Store(#[from] object_store::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Flat key/value blob storage. Keys are `/`-separated relative paths.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes) -> Result<()>;

    /// Every key under `prefix`, recursively. An unknown prefix lists nothing.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Fails with [`StorageError::NotFound`] when the key does not exist.
    async fn delete(&self, key: &str) -> Result<()>;

    async fn exists(&self, key: &str) -> Result<bool>;
}
