//! # order-hash-api
//!
//! An HTTP API for storing, fetching, updating and listing e-commerce orders
//! in a hash-oriented key-value store (Redis, or an in-memory store for tests
//! and local runs).
//!
//! ## Layout
//!
//! - [`core`]: the `Order` model, the record codec that flattens an order into
//!   a string hash, the `HashStore` trait, the repository and listing filters
//! - [`storage`]: `HashStore` backends
//! - [`server`]: `ServerBuilder`, shared host state and the REST routes
//! - [`config`]: YAML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use order_hash_api::prelude::*;
//!
//! let store = Arc::new(InMemoryHashStore::new());
//! let repo = OrderRepository::new(store, OrdersConfig::default());
//!
//! let order = repo.create(Order::new("A-1", "new")).await?;
//! let order = repo.update_status(order, "packed").await?;
//! assert!(order.packed_date.is_some());
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    pub use crate::config::{AppConfig, Environment, OrdersConfig, StoreBackend, StoreConfig};

    pub use crate::core::{
        ApprovalStatus, HashStore, JsonBody, ListQuery, Order, OrderError, OrderFilters,
        OrderRepository, OrderResult, SortOrder, StatusChange, StatusTransition, StorageError,
        ValidationError,
    };

    pub use crate::server::{RestExposure, ServerBuilder, ServerHost};

    pub use crate::storage::InMemoryHashStore;
    #[cfg(feature = "redis")]
    pub use crate::storage::RedisHashStore;

    pub use std::sync::Arc;
}
