//! Game catalog HTTP server
//!
//! Usage: `catalog [config.yaml]`. Without a file every setting takes its
//! default; `CATALOG_*` variables override either.

use anyhow::Result;
use catalog::catalog::Catalog;
use catalog::config::AppConfig;
use catalog::server::ServerBuilder;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let path = std::env::args().nth(1);
    let config = AppConfig::load(path.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(
        purge_after_months = config.lifecycle.purge_after_months,
        discount_after_months = config.lifecycle.discount_after_months,
        discount = %config.lifecycle.discount_name,
        "starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let catalog = Catalog::in_memory(config.lifecycle.clone());
    catalog.seed().await?;

    let registry = catalog.registry();
    tracing::info!(resources = ?registry.plurals(), "entity routes registered");

    ServerBuilder::new(env!("CARGO_PKG_NAME"))
        .with_registry(registry)
        .serve(config.server.addr()?)
        .await
}
