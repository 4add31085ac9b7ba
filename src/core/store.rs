//! Key-value store trait for hash records

use crate::core::error::StorageError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Hash-oriented key-value store
///
/// The operations mirror the Redis hash commands the repository needs. A
/// store handle is opened by its constructor and shared by every request;
/// after [`close`](HashStore::close) every call fails with
/// [`StorageError::Unavailable`].
#[async_trait]
pub trait HashStore: Send + Sync {
    /// Backend name used in logs and errors
    fn backend(&self) -> &'static str;

    /// Set the given fields of a hash, creating it if needed (HSET)
    async fn hset(&self, key: &str, fields: &[(String, String)]) -> Result<(), StorageError>;

    /// Get every field of a hash; an absent key yields an empty map (HGETALL)
    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, StorageError>;

    /// Remove fields from a hash (HDEL)
    async fn hdel(&self, key: &str, fields: &[String]) -> Result<(), StorageError>;

    /// List keys matching a glob pattern (KEYS)
    ///
    /// Order of the returned keys is unspecified.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StorageError>;

    /// Release the connection; later calls fail
    async fn close(&self) -> Result<(), StorageError>;

    fn is_open(&self) -> bool;
}
