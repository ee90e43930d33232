use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use roster::users::MemoryStore;
use roster::{Config, Server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("roster=info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    // State lives for the life of the process; every start begins from the seed.
    let store = Arc::new(MemoryStore::seeded());

    Server::bind(config.addr)
        .body_limit(config.max_body_bytes)
        .serve(roster::app(&config, store))
        .await?;
    Ok(())
}
