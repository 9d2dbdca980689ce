mod aggregator;
mod api;
mod cache;
mod config;
mod error;
mod matcher;
mod models;
mod sources;

use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::aggregator::Aggregator;
use crate::cache::TokenCache;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // RUST_LOG wins; plain info otherwise
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stdout)
        .with_target(false)
        .init();

    info!("402 Token Scanner starting...");

    let cfg = config::load()?;
    info!("  Listen: {}:{}", cfg.bind_addr, cfg.port);
    info!("  Search terms: {:?}", cfg.search_terms.as_slice());
    info!("  Cache TTL: {:?}", cfg.cache_ttl);
    info!("  Birdeye enabled: {}", cfg.birdeye_api_key.is_some());

    let sources = sources::build_sources(&cfg)?;
    let aggregator = Arc::new(Aggregator::new(
        sources,
        cfg.search_terms.clone(),
        TokenCache::new(cfg.cache_ttl),
    ));

    let api_handle = tokio::spawn({
        let cfg = cfg.clone();
        let aggregator = Arc::clone(&aggregator);
        async move { api::serve(cfg, aggregator).await }
    });

    tokio::select! {
        res = api_handle => match res {
            Ok(Ok(_)) => info!("API exited cleanly"),
            Ok(Err(e)) => error!("API error: {:?}", e),
            Err(e) => error!("API task panicked: {:?}", e),
        },
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received, stopping...");
        }
    }

    info!("402 Token Scanner stopped.");
    Ok(())
}
