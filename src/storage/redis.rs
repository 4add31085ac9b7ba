//! Redis storage backend using the `redis` crate's async connection manager.
//!
//! # Feature flag
//!
//! This module is gated behind the `redis` feature flag:
//! ```toml
//! [dependencies]
//! order-hash-api = { version = "0.1", features = ["redis"] }
//! ```
//!
//! # Storage model
//!
//! Every order is one Redis hash. The store issues plain HSET / HGETALL /
//! HDEL / KEYS commands; nothing is pipelined or wrapped in MULTI.

use crate::core::error::StorageError;
use crate::core::store::HashStore;
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use std::sync::RwLock;

const BACKEND: &str = "redis";

fn query_error(e: redis::RedisError) -> StorageError {
    StorageError::Query {
        backend: BACKEND.to_string(),
        message: e.to_string(),
    }
}

/// Hash store backed by a Redis server
pub struct RedisHashStore {
    manager: RwLock<Option<ConnectionManager>>,
}

impl RedisHashStore {
    /// Open a connection to `url` and check it answers PING.
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let connection_error = |e: redis::RedisError| StorageError::Connection {
            backend: BACKEND.to_string(),
            message: e.to_string(),
        };

        let client = redis::Client::open(url).map_err(connection_error)?;
        let mut manager = client
            .get_connection_manager()
            .await
            .map_err(connection_error)?;

        let pong: String = redis::cmd("PING")
            .query_async(&mut manager)
            .await
            .map_err(connection_error)?;
        tracing::info!(reply = %pong, "connected to redis");

        Ok(Self {
            manager: RwLock::new(Some(manager)),
        })
    }

    /// Clone of the live connection handle
    ///
    /// The manager multiplexes one connection, so clones are cheap and the
    /// lock is never held across an await.
    fn connection(&self) -> Result<ConnectionManager, StorageError> {
        let guard = self.manager.read().map_err(|e| StorageError::Query {
            backend: BACKEND.to_string(),
            message: format!("Failed to acquire lock: {}", e),
        })?;
        guard.clone().ok_or_else(|| StorageError::Unavailable {
            backend: BACKEND.to_string(),
        })
    }
}

#[async_trait]
impl HashStore for RedisHashStore {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn hset(&self, key: &str, fields: &[(String, String)]) -> Result<(), StorageError> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection()?;
        let _: () = conn
            .hset_multiple(key, fields)
            .await
            .map_err(query_error)?;
        Ok(())
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, StorageError> {
        let mut conn = self.connection()?;
        conn.hgetall(key).await.map_err(query_error)
    }

    async fn hdel(&self, key: &str, fields: &[String]) -> Result<(), StorageError> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection()?;
        let _: () = conn.hdel(key, fields).await.map_err(query_error)?;
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StorageError> {
        let mut conn = self.connection()?;
        conn.keys(pattern).await.map_err(query_error)
    }

    async fn close(&self) -> Result<(), StorageError> {
        let mut guard = self.manager.write().map_err(|e| StorageError::Query {
            backend: BACKEND.to_string(),
            message: format!("Failed to acquire lock: {}", e),
        })?;
        if guard.take().is_some() {
            tracing::info!("redis connection closed");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.manager.read().map(|m| m.is_some()).unwrap_or(false)
    }
}
