//! Storage implementations for different backends

pub mod in_memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use in_memory::InMemoryHashStore;
#[cfg(feature = "redis")]
pub use self::redis::RedisHashStore;

use crate::config::{StoreBackend, StoreConfig};
use crate::core::error::{ConfigError, OrderResult};
use crate::core::store::HashStore;
use std::sync::Arc;

/// Open the store selected by `config`.
///
/// Remote backends are contacted immediately, so an unreachable store fails
/// here rather than on the first request.
pub async fn open(config: &StoreConfig) -> OrderResult<Arc<dyn HashStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("using in-memory store");
            Ok(Arc::new(InMemoryHashStore::new()))
        }
        StoreBackend::Redis => open_redis(config).await,
    }
}

#[cfg(feature = "redis")]
async fn open_redis(config: &StoreConfig) -> OrderResult<Arc<dyn HashStore>> {
    let url = config.url.as_deref().ok_or_else(|| ConfigError::InvalidValue {
        field: "store.url".to_string(),
        value: String::new(),
        message: "redis backend needs a url".to_string(),
    })?;
    tracing::info!(%url, "connecting to redis");
    Ok(Arc::new(RedisHashStore::connect(url).await?))
}

#[cfg(not(feature = "redis"))]
async fn open_redis(_config: &StoreConfig) -> OrderResult<Arc<dyn HashStore>> {
    Err(ConfigError::InvalidValue {
        field: "store.backend".to_string(),
        value: "redis".to_string(),
        message: "built without the 'redis' feature".to_string(),
    }
    .into())
}
