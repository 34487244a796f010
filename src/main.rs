use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use players_api::Server;
use players_api::app;
use players_api::cache::{MemoryStore, ResponseCache, spawn_sweeper};
use players_api::config::Config;
use players_api::database::MemoryRepository;
use players_api::players::PlayerService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let repository = load_repository(&config)?;
    let service = PlayerService::new(Arc::new(repository));

    let store = Arc::new(MemoryStore::new());
    let cache = ResponseCache::new(store.clone(), config.cache_ttl());
    let sweeper = spawn_sweeper(store, config.sweep_interval());

    let router = app::router(&service, &cache);
    let server = Server::bind(&config.addr).await?;
    info!(
        address = %server.local_addr(),
        ttl_secs = config.cache_ttl_secs,
        "players api ready"
    );

    server
        .serve(router, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    sweeper.abort();
    info!("stopped");
    Ok(())
}

fn load_repository(config: &Config) -> anyhow::Result<MemoryRepository> {
    match &config.seed {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading seed file {}", path.display()))?;
            MemoryRepository::from_json(&json)
                .with_context(|| format!("parsing seed file {}", path.display()))
        }
        None => MemoryRepository::seeded().context("parsing bundled seed data"),
    }
}
