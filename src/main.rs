use order_hash_api::config::AppConfig;
use order_hash_api::server::ServerBuilder;
use order_hash_api::storage;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the filter reads RUST_LOG
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,order_hash_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Panics are fatal: log and exit with status 1
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("Uncaught panic: {}", info);
        std::process::exit(1);
    }));

    let config = AppConfig::load()?;
    tracing::info!(environment = %config.environment, "configuration loaded");

    let store = storage::open(&config.store).await?;

    ServerBuilder::new()
        .with_config(config)
        .with_store(store)
        .serve()
        .await
}
