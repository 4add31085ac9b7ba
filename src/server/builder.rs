//! ServerBuilder for fluent API to build HTTP servers

use super::exposure::RestExposure;
use super::host::ServerHost;
use crate::config::AppConfig;
use crate::core::codec;
use crate::core::store::HashStore;
use anyhow::{Result, anyhow};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the order API server
///
/// # Example
///
/// ```ignore
/// let store = storage::open(&config.store).await?;
/// ServerBuilder::new()
///     .with_config(config)
///     .with_store(store)
///     .serve()
///     .await?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    store: Option<Arc<dyn HashStore>>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            store: None,
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the store (required)
    pub fn with_store(mut self, store: Arc<dyn HashStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the host holding all application state
    ///
    /// Fails when no store was given or when the record codec does not cover
    /// the order schema.
    pub fn build_host(self) -> Result<ServerHost> {
        codec::verify_schema().map_err(|e| anyhow!("Order codec is out of date: {}", e))?;

        let store = self
            .store
            .ok_or_else(|| anyhow!("HashStore is required. Call .with_store()"))?;

        Ok(ServerHost::new(self.config, store))
    }

    /// Build the REST router
    pub fn build(self) -> Result<Router> {
        let host = Arc::new(self.build_host()?);
        RestExposure::build_router(host)
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the configured host and port
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    /// - Close the store once the last request has finished
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.server.address();
        let host = Arc::new(self.build_host()?);
        let app = RestExposure::build_router(host.clone())?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!(
            environment = %host.config.environment,
            backend = host.store.backend(),
            "Server listening on {}",
            addr
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        host.store.close().await?;
        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
