//! Server host shared by every request handler
//!
//! The host owns the application state: configuration, the store handle and
//! the order repository built on top of it. Exposures borrow it through an
//! `Arc` and never construct state of their own.

use crate::config::AppConfig;
use crate::core::service::OrderRepository;
use crate::core::store::HashStore;
use std::sync::Arc;

/// Host context containing all application state
///
/// # Example
///
/// ```rust,ignore
/// let host = Arc::new(ServerHost::new(config, store));
/// let app = RestExposure::build_router(host)?;
/// ```
pub struct ServerHost {
    pub config: Arc<AppConfig>,

    /// Open store handle, shared with the repository
    pub store: Arc<dyn HashStore>,

    pub repository: Arc<OrderRepository>,
}

impl ServerHost {
    pub fn new(config: AppConfig, store: Arc<dyn HashStore>) -> Self {
        let repository = OrderRepository::new(store.clone(), config.orders.clone());
        Self {
            config: Arc::new(config),
            store,
            repository: Arc::new(repository),
        }
    }

    /// Whether the store still accepts commands
    pub fn is_ready(&self) -> bool {
        self.store.is_open()
    }
}
