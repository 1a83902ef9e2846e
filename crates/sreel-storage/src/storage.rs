//! The object storage contract.

use async_trait::async_trait;

use crate::error::StorageResult;

/// Durable object storage consumed by the video compiler.
///
/// `upload` must be an idempotent overwrite (upsert) at the given key, and
/// `public_url` must resolve for any key a successful upload returned.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload bytes to a key, overwriting any existing object.
    async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> StorageResult<()>;

    /// Download an object as bytes, `NotFound` if absent.
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Resolve the public locator for a key.
    fn public_url(&self, key: &str) -> String;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Delete an object.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Backend connectivity check for readiness probes.
    async fn check_connectivity(&self) -> StorageResult<()>;
}
